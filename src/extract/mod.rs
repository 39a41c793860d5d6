//! Product page extraction for Shelf-Scout
//!
//! A fetched page is first classified as a product page or not. Product
//! pages are then run through an ordered list of layers, each a pure
//! function from the document to a [`PartialRecord`]. The partial records
//! are merged left to right; the first layer to supply a field wins.
//!
//! Layer order:
//! 1. structured data (JSON-LD)
//! 2. fixed DOM selectors
//! 3. variations
//! 4. gallery
//! 5. description
//! 6. breadcrumb category

mod document;
mod dom;
mod gallery;
mod price;
mod structured;
mod variations;

use serde::Serialize;
use tracing::debug;
use url::Url;

pub use document::DocumentView;
pub use price::{format_price, resolve_prices, PriceMode, PriceRoles, NOT_AVAILABLE};

/// Separator used when joining breadcrumb labels into a category path
pub const CATEGORY_SEPARATOR: &str = " > ";

/// One purchasable option of a product
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariationRecord {
    pub code: String,
    pub image_url: String,
    pub external_id: Option<String>,
}

/// Normalized product data extracted from a single page
///
/// Prices are kept as the raw text found on the page; normalization and
/// role resolution happen when the record is persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRecord {
    pub source_url: Option<String>,
    pub external_id: Option<String>,
    pub sku: Option<String>,
    pub name: String,
    pub price: Option<String>,
    pub comparison_price: Option<String>,
    pub brand: Option<String>,
    pub main_image: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub has_variations: bool,
    pub variations: Vec<VariationRecord>,
    pub gallery: Vec<String>,
}

impl ProductRecord {
    /// Images to persist for the product itself: the gallery when present,
    /// otherwise the single main image
    pub fn product_images(&self) -> Vec<&str> {
        if self.gallery.is_empty() {
            self.main_image.iter().map(String::as_str).collect()
        } else {
            self.gallery.iter().map(String::as_str).collect()
        }
    }
}

/// Fields contributed by a single extraction layer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialRecord {
    pub external_id: Option<String>,
    pub sku: Option<String>,
    pub name: Option<String>,
    pub price: Option<String>,
    pub comparison_price: Option<String>,
    pub brand: Option<String>,
    pub main_image: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub variations: Vec<VariationRecord>,
    pub gallery: Vec<String>,
}

impl PartialRecord {
    /// Merges a later layer into this one; fields already set are kept
    pub fn merge(self, later: PartialRecord) -> PartialRecord {
        PartialRecord {
            external_id: self.external_id.or(later.external_id),
            sku: self.sku.or(later.sku),
            name: self.name.or(later.name),
            price: self.price.or(later.price),
            comparison_price: self.comparison_price.or(later.comparison_price),
            brand: self.brand.or(later.brand),
            main_image: self.main_image.or(later.main_image),
            description: self.description.or(later.description),
            category: self.category.or(later.category),
            variations: if self.variations.is_empty() {
                later.variations
            } else {
                self.variations
            },
            gallery: if self.gallery.is_empty() {
                later.gallery
            } else {
                self.gallery
            },
        }
    }

    /// Finishes the record; a product without a name cannot be stored
    fn finish(self) -> Option<ProductRecord> {
        let name = self.name?;
        let sku = self.sku.or_else(|| self.external_id.clone());
        Some(ProductRecord {
            source_url: None,
            external_id: self.external_id,
            sku,
            name,
            price: self.price,
            comparison_price: self.comparison_price,
            brand: self.brand,
            main_image: self.main_image,
            description: self.description,
            category: self.category,
            has_variations: !self.variations.is_empty(),
            variations: self.variations,
            gallery: self.gallery,
        })
    }
}

/// Result of running a page through classification and extraction
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionOutcome {
    Product(ProductRecord),
    NotProduct,
    ParseFailed(String),
}

type Layer = fn(&DocumentView) -> PartialRecord;

const LAYERS: [Layer; 6] = [
    structured::extract,
    dom::extract,
    variations::extract,
    gallery::extract,
    dom::extract_description,
    dom::extract_category,
];

/// Decides whether a page describes a single product
///
/// Either an `og:type` of `product` or a JSON-LD block declaring a
/// `Product` is enough.
pub fn is_product_page(doc: &DocumentView) -> bool {
    let og_type = doc.first_attr(r#"meta[property="og:type"]"#, "content");
    if og_type.is_some_and(|t| t.eq_ignore_ascii_case("product")) {
        return true;
    }
    structured::declares_product(doc)
}

/// Runs every extraction layer over a product page
pub fn extract(doc: &DocumentView) -> Option<ProductRecord> {
    let mut merged = LAYERS
        .iter()
        .map(|layer| layer(doc))
        .fold(PartialRecord::default(), PartialRecord::merge);

    // Gallery's first image only stands in when no earlier layer found one
    if merged.main_image.is_none() {
        merged.main_image = merged.gallery.first().cloned();
    }

    merged.finish()
}

/// Parses raw HTML, classifies it and extracts a product record
///
/// # Arguments
///
/// * `html` - The page body as returned by the fetcher
/// * `page_url` - The URL the page was fetched from
///
/// # Returns
///
/// The extraction outcome; the record carries `page_url` as its source
pub fn analyze(html: &str, page_url: &Url) -> ExtractionOutcome {
    let doc = DocumentView::parse(html, page_url);

    if !is_product_page(&doc) {
        debug!("Not a product page: {}", page_url);
        return ExtractionOutcome::NotProduct;
    }

    match extract(&doc) {
        Some(mut record) => {
            record.source_url = Some(page_url.to_string());
            ExtractionOutcome::Product(record)
        }
        None => ExtractionOutcome::ParseFailed("product page has no name".to_string()),
    }
}
