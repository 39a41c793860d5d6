//! Aggregate of all repositories over one shared connection

use crate::storage::{
    Database, FailedCrawlRepository, ImageRepository, NonCrawlableUrlRepository,
    ProductRepository, StorageResult, UrlKind, VariationRepository,
};
use std::path::Path;

/// Every repository, built over a single [`Database`] handle
#[derive(Clone)]
pub struct Store {
    db: Database,
    pub products: ProductRepository,
    pub variations: VariationRepository,
    pub images: ImageRepository,
    pub failed_crawls: FailedCrawlRepository,
    pub non_crawlable: NonCrawlableUrlRepository,
}

impl Store {
    pub fn new(db: Database) -> Self {
        Self {
            products: ProductRepository::new(db.clone()),
            variations: VariationRepository::new(db.clone()),
            images: ImageRepository::new(db.clone()),
            failed_crawls: FailedCrawlRepository::new(db.clone()),
            non_crawlable: NonCrawlableUrlRepository::new(db.clone()),
            db,
        }
    }

    /// Opens the database at `path` and builds the repositories over it
    pub fn open(path: &Path) -> StorageResult<Self> {
        Ok(Self::new(Database::open(path)?))
    }

    pub fn open_in_memory() -> StorageResult<Self> {
        Ok(Self::new(Database::open_in_memory()?))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Whether a resource of `kind` is already stored under `url`
    pub fn exists_by_url(&self, kind: UrlKind, url: &str) -> StorageResult<bool> {
        match kind {
            UrlKind::Product => self.products.exists_by_url(url),
            UrlKind::Image => self.images.exists_by_url(url),
        }
    }
}
