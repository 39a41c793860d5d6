//! Output module for reporting on a store
//!
//! This module handles:
//! - Statistics over the stored product graph and failure ledger
//! - The end-of-run summary printed by the binary
//! - Exporting stored products as JSON

mod export;
pub mod stats;

pub use export::{collect_products, export_products, ProductExport};
pub use stats::{load_statistics, print_run_summary, print_statistics, StoreStatistics};
