//! Storage module for persisting the product graph
//!
//! This module handles all database operations for the crawler, including:
//! - SQLite schema management
//! - A single shared connection handle per database file
//! - One repository per entity (products, variations, images,
//!   failed crawls, non-crawlable URLs)
//! - Existence checks used to skip URLs crawled before

mod database;
mod error;
mod failed_crawls;
mod images;
mod non_crawlable;
mod products;
mod schema;
mod store;
mod variations;

pub use database::Database;
pub use error::{StorageError, StorageResult};
pub use failed_crawls::FailedCrawlRepository;
pub use images::ImageRepository;
pub use non_crawlable::NonCrawlableUrlRepository;
pub use products::ProductRepository;
pub use schema::{initialize_schema, SCHEMA_SQL};
pub use store::Store;
pub use variations::VariationRepository;

use serde::Serialize;
use std::str::FromStr;

/// A stored product row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRow {
    pub id: i64,
    pub title: String,
    pub price: String,
    pub sales_price: Option<String>,
    pub category: Option<String>,
    pub short_desc: Option<String>,
    pub brand: Option<String>,
    pub url: String,
    pub has_variations: bool,
    pub parent_id: Option<i64>,
}

/// Values for inserting a product
#[derive(Debug, Clone, Default)]
pub struct NewProduct {
    pub title: String,
    pub price: String,
    pub sales_price: Option<String>,
    pub category: Option<String>,
    pub short_desc: Option<String>,
    pub brand: Option<String>,
    pub url: String,
    pub has_variations: bool,
    pub parent_id: Option<i64>,
}

/// Partial update of a product. `None` leaves the column untouched;
/// `Some(None)` on a nullable column writes NULL.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub title: Option<String>,
    pub price: Option<String>,
    pub sales_price: Option<Option<String>>,
    pub category: Option<Option<String>>,
    pub short_desc: Option<Option<String>>,
    pub brand: Option<Option<String>>,
    pub has_variations: Option<bool>,
    pub parent_id: Option<Option<i64>>,
}

/// A stored variation row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariationRow {
    pub id: i64,
    pub product_id: i64,
    pub variation_code: String,
    pub image_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct NewVariation {
    pub product_id: i64,
    pub variation_code: String,
    pub image_id: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct VariationPatch {
    pub variation_code: Option<String>,
    pub image_id: Option<Option<i64>>,
}

/// Role of an image within a product graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageType {
    Product,
    Variation,
}

impl ImageType {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Variation => "variation",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "product" => Some(Self::Product),
            "variation" => Some(Self::Variation),
            _ => None,
        }
    }
}

/// A stored image row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageRow {
    pub id: i64,
    pub product_id: i64,
    pub image_url: String,
    pub image_type: ImageType,
    pub variation_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct NewImage {
    pub product_id: i64,
    pub image_url: String,
    pub image_type: ImageType,
    pub variation_id: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct ImagePatch {
    pub image_url: Option<String>,
    pub image_type: Option<ImageType>,
    pub variation_id: Option<Option<i64>>,
}

/// Which part of a crawl failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Fetching or extracting the page itself
    Product,
    /// Saving a gallery or main image row
    Image,
    /// Saving a variation or its image row
    VariationImage,
    /// Saving the product row
    DbSave,
    /// Downloading image bytes to disk
    ImageDownload,
}

impl FailureKind {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Image => "image",
            Self::VariationImage => "variation_image",
            Self::DbSave => "db_save",
            Self::ImageDownload => "image_download",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "product" => Some(Self::Product),
            "image" => Some(Self::Image),
            "variation_image" => Some(Self::VariationImage),
            "db_save" => Some(Self::DbSave),
            "image_download" => Some(Self::ImageDownload),
            _ => None,
        }
    }
}

/// Review status of a failed-crawl ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStatus {
    Pending,
    Resolved,
    Ignored,
}

impl FailureStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Resolved => "resolved",
            Self::Ignored => "ignored",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "resolved" => Some(Self::Resolved),
            "ignored" => Some(Self::Ignored),
            _ => None,
        }
    }
}

/// A failed-crawl ledger entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedCrawlRow {
    pub id: i64,
    pub url: String,
    /// Raw type column; known values map onto [`FailureKind`]
    pub kind: String,
    pub error: Option<String>,
    pub foreign_id: Option<i64>,
    pub status: FailureStatus,
}

#[derive(Debug, Clone)]
pub struct NewFailedCrawl {
    pub url: String,
    pub kind: FailureKind,
    pub error: String,
    pub foreign_id: Option<i64>,
}

impl NewFailedCrawl {
    pub fn new(url: &str, kind: FailureKind, error: impl ToString) -> Self {
        Self {
            url: url.to_string(),
            kind,
            error: error.to_string(),
            foreign_id: None,
        }
    }

    pub fn with_foreign_id(mut self, foreign_id: i64) -> Self {
        self.foreign_id = Some(foreign_id);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct FailedCrawlPatch {
    pub error: Option<Option<String>>,
    pub status: Option<FailureStatus>,
}

/// An entry of the negative cache of URLs that are not product pages
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NonCrawlableUrlRow {
    pub id: i64,
    pub url: String,
    pub url_type: String,
    pub reason: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Default)]
pub struct NonCrawlableUrlPatch {
    pub url_type: Option<String>,
    pub reason: Option<Option<String>>,
}

/// Resource kinds that can be checked for a previous crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlKind {
    Product,
    Image,
}

impl FromStr for UrlKind {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "product" => Ok(Self::Product),
            "image" => Ok(Self::Image),
            other => Err(StorageError::InvalidArgument(format!(
                "unrecognized url kind '{}'",
                other
            ))),
        }
    }
}
