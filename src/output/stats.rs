//! Statistics over a Shelf-Scout store
//!
//! This module provides functionality for extracting and displaying
//! totals from the storage layer, and for printing a run summary.

use crate::crawler::RunStatistics;
use crate::storage::Store;
use crate::Result;

/// Totals over everything a store holds
#[derive(Debug, Clone, PartialEq)]
pub struct StoreStatistics {
    pub total_products: u64,

    /// Products carrying a sale price
    pub discounted_products: u64,

    pub total_variations: u64,

    pub total_images: u64,

    /// URLs ruled out as non-product pages
    pub non_crawlable_urls: u64,

    /// Failed-crawl ledger entries by type, most frequent first
    pub failures_by_kind: Vec<(String, u64)>,
}

impl StoreStatistics {
    pub fn total_failures(&self) -> u64 {
        self.failures_by_kind.iter().map(|(_, count)| count).sum()
    }
}

/// Loads statistics from a store
///
/// # Arguments
///
/// * `store` - The store to query
///
/// # Returns
///
/// * `Ok(StoreStatistics)` - Successfully loaded statistics
/// * `Err(ScoutError)` - Failed to query statistics
pub fn load_statistics(store: &Store) -> Result<StoreStatistics> {
    let total_products = store.products.count()?;
    let discounted_products = store
        .products
        .list_all()?
        .iter()
        .filter(|p| p.sales_price.is_some())
        .count() as u64;

    Ok(StoreStatistics {
        total_products,
        discounted_products,
        total_variations: store.variations.count()?,
        total_images: store.images.count()?,
        non_crawlable_urls: store.non_crawlable.count()?,
        failures_by_kind: store.failed_crawls.count_by_kind()?,
    })
}

/// Prints store statistics to stdout
pub fn print_statistics(stats: &StoreStatistics) {
    println!("=== Store Statistics ===\n");

    println!("Products:");
    println!("  Total products: {}", stats.total_products);
    println!("  With sale price: {}", stats.discounted_products);
    println!("  Variations: {}", stats.total_variations);
    println!("  Images: {}", stats.total_images);
    println!();

    println!("Non-product URLs: {}", stats.non_crawlable_urls);
    println!();

    if stats.failures_by_kind.is_empty() {
        println!("No recorded failures");
    } else {
        println!("Failures ({}):", stats.total_failures());
        for (kind, count) in &stats.failures_by_kind {
            println!("  {}: {}", kind, count);
        }
    }
}

/// Prints the outcome of one orchestrator run to stdout
pub fn print_run_summary(stats: &RunStatistics) {
    println!("=== Crawl Summary ===\n");
    println!("  Total URLs: {}", stats.total_urls);
    println!("  Successful: {}", stats.successful);
    println!("  Failed: {}", stats.failed);
    println!("  Skipped: {}", stats.skipped);
    println!("  Runtime: {}", stats.runtime_display());

    if !stats.failed_urls.is_empty() {
        println!();
        println!("Failed URLs:");
        for url in &stats.failed_urls {
            println!("  - {}", url);
        }
    }
}
