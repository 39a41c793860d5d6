use crate::extract::PriceMode;
use serde::Deserialize;

/// Main configuration structure for Shelf-Scout
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    pub output: OutputConfig,
}

/// Run-level crawl behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Pause between two consecutive URLs (seconds)
    #[serde(rename = "delay-seconds", default = "default_delay_seconds")]
    pub delay_seconds: f64,

    /// Hard cap on URLs processed in one run
    #[serde(rename = "max-urls", default = "default_max_urls")]
    pub max_urls: usize,

    /// Abort the remaining URLs after the first failure
    #[serde(rename = "stop-on-error", default)]
    pub stop_on_error: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            delay_seconds: default_delay_seconds(),
            max_urls: default_max_urls(),
            stop_on_error: false,
        }
    }
}

/// Page fetcher configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetcherConfig {
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Whole-request timeout (seconds)
    #[serde(rename = "timeout-seconds", default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractionConfig {
    #[serde(rename = "price-mode", default)]
    pub price_mode: PriceMode,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Directory downloaded images are written to
    #[serde(rename = "image-directory")]
    pub image_directory: String,

    /// Whether stored images are also downloaded to `image_directory`
    #[serde(rename = "download-images", default)]
    pub download_images: bool,
}

fn default_delay_seconds() -> f64 {
    0.5
}

fn default_max_urls() -> usize {
    100
}

fn default_user_agent() -> String {
    format!("shelf-scout/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout_seconds() -> u64 {
    30
}
