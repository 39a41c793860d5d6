//! Fixed-selector layers for shop markup

use super::document::{element_attr, element_text, select_within, DocumentView};
use super::{PartialRecord, CATEGORY_SEPARATOR};

const BREADCRUMB_ITEMS: &str =
    r#"ul[itemtype="http://schema.org/BreadcrumbList"] li[itemprop="itemListElement"]"#;

/// Name, external id, prices, brand and main image from fixed selectors
pub(super) fn extract(doc: &DocumentView) -> PartialRecord {
    let price = doc
        .first_attr(r#"meta[name="product_price"]"#, "content")
        .or_else(|| doc.first_text(r#"span[itemprop="price"]"#));
    // An old-price meta repeating the current price carries no discount
    let comparison_price = doc
        .first_attr(r#"meta[name="product_old_price"]"#, "content")
        .filter(|old| price.as_deref() != Some(old.as_str()))
        .or_else(|| doc.first_text("div.km-price.km-discounted span.km-value"));

    PartialRecord {
        name: doc.first_text(r#"h1[itemprop="name"]"#),
        external_id: doc
            .first_attr(r#"meta[name="product_id"]"#, "content")
            .or_else(|| doc.first_attr(r#"input[name="product_id"]"#, "value")),
        price,
        comparison_price,
        brand: doc.first_attr(r#"meta[name="product_brand"]"#, "content"),
        main_image: doc
            .first_attr(r#"img[itemprop="image"]"#, "src")
            .and_then(|href| doc.resolve(&href)),
        ..Default::default()
    }
}

pub(super) fn extract_description(doc: &DocumentView) -> PartialRecord {
    PartialRecord {
        description: doc.first_text("div.km-product-description"),
        ..Default::default()
    }
}

/// Breadcrumb labels in document order; items without a label are skipped
pub(super) fn extract_category(doc: &DocumentView) -> PartialRecord {
    let labels: Vec<String> = doc
        .select_all(BREADCRUMB_ITEMS)
        .into_iter()
        .filter_map(|item| {
            select_within(item, r#"[itemprop="name"]"#)
                .into_iter()
                .find_map(|label| element_text(label).or_else(|| element_attr(label, "content")))
        })
        .collect();

    PartialRecord {
        category: (!labels.is_empty()).then(|| labels.join(CATEGORY_SEPARATOR)),
        ..Default::default()
    }
}
