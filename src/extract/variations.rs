//! Variation layer

use std::collections::HashSet;

use tracing::debug;

use super::document::{element_attr, image_source, select_within, DocumentView};
use super::{PartialRecord, VariationRecord};

const CONTAINER: &str = ".km-product-variations";
const ITEM: &str = "[data-variation-code]";

/// Collects variations that carry both a code and a resolvable image
///
/// A repeated code keeps its first occurrence.
pub(super) fn extract(doc: &DocumentView) -> PartialRecord {
    let Some(container) = doc.first(CONTAINER) else {
        return PartialRecord::default();
    };

    let mut seen = HashSet::new();
    let mut variations = Vec::new();

    for item in select_within(container, ITEM) {
        let Some(code) = element_attr(item, "data-variation-code") else {
            continue;
        };

        let image_url = select_within(item, "img")
            .into_iter()
            .find_map(image_source)
            .or_else(|| element_attr(item, "data-image"))
            .and_then(|href| doc.resolve(&href));

        let Some(image_url) = image_url else {
            debug!("Dropping variation {} without an image", code);
            continue;
        };

        if !seen.insert(code.clone()) {
            continue;
        }

        variations.push(VariationRecord {
            code,
            image_url,
            external_id: element_attr(item, "data-variation-id"),
        });
    }

    PartialRecord {
        variations,
        ..Default::default()
    }
}
