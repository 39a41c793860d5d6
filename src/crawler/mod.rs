//! Crawling for Shelf-Scout
//!
//! This module contains the crawl core:
//! - Page fetching behind the [`PageFetcher`] capability
//! - The per-URL product service ([`ProductCrawler`])
//! - The run orchestrator with its phase machine and statistics

mod fetcher;
mod orchestrator;
mod phase;
mod service;
mod stats;

pub use fetcher::{build_http_client, FetchError, HttpFetcher, PageFetcher};
pub use orchestrator::{CrawlOrchestrator, RunOptions};
pub use phase::RunPhase;
pub use service::ProductCrawler;
pub use stats::RunStatistics;

use async_trait::async_trait;

use crate::Result;

/// What happened to a single URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlOutcome {
    /// The product graph was stored under this product id
    Saved(i64),
    /// The page was fetched but is not a product page
    NotProduct,
    FetchFailed(String),
    ParseFailed(String),
    /// The product row itself could not be stored
    SaveFailed(String),
}

impl CrawlOutcome {
    pub fn product_id(&self) -> Option<i64> {
        match self {
            CrawlOutcome::Saved(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CrawlOutcome::Saved(_))
    }
}

/// A per-URL crawler driven by [`CrawlOrchestrator`]
///
/// Failures while processing one URL are recorded by the implementation and
/// reported through [`CrawlOutcome`]. An `Err` means the crawler itself is
/// unusable (for example the failure ledger cannot be written).
#[async_trait]
pub trait Crawler: Send {
    async fn initialize(&mut self) -> Result<()>;

    async fn close(&mut self);

    /// `false` when the URL was stored or ruled out by an earlier run
    fn not_crawled_before(&self, url: &str) -> Result<bool>;

    async fn crawl(&mut self, url: &str) -> Result<CrawlOutcome>;
}
