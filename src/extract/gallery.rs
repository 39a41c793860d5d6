//! Gallery layer

use super::document::{image_source, DocumentView};
use super::PartialRecord;

const GALLERY_IMAGES: &str = ".km-product-gallery img";

/// Ordered gallery image URLs, de-duplicated on the resolved URL string
pub(super) fn extract(doc: &DocumentView) -> PartialRecord {
    let mut gallery: Vec<String> = Vec::new();

    for img in doc.select_all(GALLERY_IMAGES) {
        let Some(url) = image_source(img).and_then(|href| doc.resolve(&href)) else {
            continue;
        };
        if !gallery.contains(&url) {
            gallery.push(url);
        }
    }

    PartialRecord {
        gallery,
        ..Default::default()
    }
}
