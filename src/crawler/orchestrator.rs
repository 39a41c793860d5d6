//! Run orchestration
//!
//! Drives a [`Crawler`] over a URL list one URL at a time, with a fixed
//! delay between URLs, a cap on how many are processed and an optional
//! stop on the first failure. The crawler is always closed before the run
//! returns.

use std::time::Duration;

use tracing::{error, info, warn};

use super::phase::RunPhase;
use super::stats::RunStatistics;
use super::Crawler;
use crate::config::CrawlerConfig;
use crate::{Result, ScoutError};

/// Per-run limits
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub delay_seconds: f64,
    pub max_urls: usize,
    pub stop_on_error: bool,
}

impl RunOptions {
    fn delay(&self) -> Duration {
        if self.delay_seconds.is_finite() && self.delay_seconds > 0.0 {
            Duration::from_secs_f64(self.delay_seconds)
        } else {
            Duration::ZERO
        }
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        Self::from(&CrawlerConfig::default())
    }
}

impl From<&CrawlerConfig> for RunOptions {
    fn from(config: &CrawlerConfig) -> Self {
        Self {
            delay_seconds: config.delay_seconds,
            max_urls: config.max_urls,
            stop_on_error: config.stop_on_error,
        }
    }
}

/// Runs a crawler over a list of URLs
pub struct CrawlOrchestrator<C: Crawler> {
    crawler: C,
    options: RunOptions,
    phase: RunPhase,
}

impl<C: Crawler> CrawlOrchestrator<C> {
    pub fn new(crawler: C, options: RunOptions) -> Self {
        Self {
            crawler,
            options,
            phase: RunPhase::Idle,
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    pub fn crawler(&self) -> &C {
        &self.crawler
    }

    pub fn into_crawler(self) -> C {
        self.crawler
    }

    /// Processes `urls` and returns the run statistics
    ///
    /// Only the first `max_urls` entries are considered; `total_urls` still
    /// reports the full input length.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::Initialization`] when the crawler cannot be
    /// initialized. The crawler is closed before the error is returned.
    pub async fn run(&mut self, urls: &[String]) -> Result<RunStatistics> {
        if self.phase == RunPhase::Done {
            self.phase = RunPhase::Idle;
        }
        self.phase.advance(RunPhase::Initializing)?;

        let mut stats = RunStatistics::new(urls.len());

        if let Err(e) = self.crawler.initialize().await {
            error!("Crawler initialization failed: {}", e);
            self.shut_down().await?;
            return Err(match e {
                ScoutError::Initialization(_) => e,
                other => ScoutError::Initialization(other.to_string()),
            });
        }
        info!(
            "Crawler initialized: delay={}s, max_urls={}, stop_on_error={}",
            self.options.delay_seconds, self.options.max_urls, self.options.stop_on_error
        );
        self.phase.advance(RunPhase::Running)?;

        if let Err(e) = self.process(urls, &mut stats).await {
            error!("Error during crawl: {}", e);
            stats.failed += 1;
        }

        self.shut_down().await?;
        stats.finish();
        log_summary(&stats);

        Ok(stats)
    }

    async fn process(&mut self, urls: &[String], stats: &mut RunStatistics) -> Result<()> {
        if urls.len() > self.options.max_urls {
            info!(
                "Limiting crawl to first {} URLs out of {}",
                self.options.max_urls,
                urls.len()
            );
        }

        let delay = self.options.delay();

        for url in urls.iter().take(self.options.max_urls) {
            if self.crawler.not_crawled_before(url)? {
                let outcome = self.crawler.crawl(url).await?;

                if outcome.is_success() {
                    stats.record_success(url);
                    info!("Successfully crawled URL: {}", url);
                } else {
                    stats.record_failure(url);
                    warn!("Failed to crawl URL: {} ({:?})", url, outcome);

                    if self.options.stop_on_error {
                        warn!("Stopping crawl after first failure");
                        break;
                    }
                }
            } else {
                stats.record_skip();
                info!("Skipping already crawled URL: {}", url);
            }

            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        Ok(())
    }

    /// Closing and Done; the crawler is released exactly once per run
    async fn shut_down(&mut self) -> Result<()> {
        self.phase.advance(RunPhase::Closing)?;
        self.crawler.close().await;
        info!("Crawler closed");
        self.phase.advance(RunPhase::Done)
    }
}

fn log_summary(stats: &RunStatistics) {
    info!("=== Crawling Summary ===");
    info!("Total URLs: {}", stats.total_urls);
    info!("Successful crawls: {}", stats.successful);
    info!("Failed crawls: {}", stats.failed);
    info!("Skipped URLs: {}", stats.skipped);
    info!("Total runtime: {}", stats.runtime_display());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::CrawlOutcome;
    use async_trait::async_trait;
    use std::collections::HashSet;

    /// Scripted crawler: URLs containing "fail" fail, URLs in `known` are
    /// skipped, URLs containing "boom" make the existence check error out
    #[derive(Default)]
    struct ScriptedCrawler {
        known: HashSet<String>,
        fail_init: bool,
        attempted: Vec<String>,
        initialized: usize,
        closed: usize,
        next_id: i64,
    }

    #[async_trait]
    impl Crawler for ScriptedCrawler {
        async fn initialize(&mut self) -> Result<()> {
            self.initialized += 1;
            if self.fail_init {
                return Err(ScoutError::Initialization("no browser".to_string()));
            }
            Ok(())
        }

        async fn close(&mut self) {
            self.closed += 1;
        }

        fn not_crawled_before(&self, url: &str) -> Result<bool> {
            if url.contains("boom") {
                return Err(ScoutError::InvalidArgument("store unavailable".to_string()));
            }
            Ok(!self.known.contains(url))
        }

        async fn crawl(&mut self, url: &str) -> Result<CrawlOutcome> {
            self.attempted.push(url.to_string());
            if url.contains("fail") {
                return Ok(CrawlOutcome::FetchFailed("scripted".to_string()));
            }
            self.next_id += 1;
            self.known.insert(url.to_string());
            Ok(CrawlOutcome::Saved(self.next_id))
        }
    }

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|u| u.to_string()).collect()
    }

    fn options(max_urls: usize, stop_on_error: bool) -> RunOptions {
        RunOptions {
            delay_seconds: 0.0,
            max_urls,
            stop_on_error,
        }
    }

    #[tokio::test]
    async fn test_max_urls_limits_attempts() {
        let mut orchestrator = CrawlOrchestrator::new(ScriptedCrawler::default(), options(3, false));
        let input = urls(&["https://s/1", "https://s/2", "https://s/3", "https://s/4", "https://s/5"]);

        let stats = orchestrator.run(&input).await.unwrap();

        assert_eq!(stats.total_urls, 5);
        assert_eq!(stats.successful, 3);
        assert!(stats.crawled_urls.len() + stats.failed_urls.len() <= 3);
        assert_eq!(orchestrator.crawler().attempted, &input[..3]);
        assert_eq!(orchestrator.phase(), RunPhase::Done);
    }

    #[tokio::test]
    async fn test_stop_on_error_halts_after_first_failure() {
        let mut orchestrator = CrawlOrchestrator::new(ScriptedCrawler::default(), options(10, true));
        let input = urls(&["https://s/fail", "https://s/2", "https://s/3"]);

        let stats = orchestrator.run(&input).await.unwrap();

        assert_eq!(stats.failed, 1);
        assert_eq!(stats.successful, 0);
        assert_eq!(stats.skipped, 0);
        assert_eq!(stats.failed_urls, vec!["https://s/fail".to_string()]);
        assert_eq!(orchestrator.crawler().attempted.len(), 1);
        assert_eq!(orchestrator.crawler().closed, 1);
    }

    #[tokio::test]
    async fn test_failures_continue_without_stop_on_error() {
        let mut orchestrator = CrawlOrchestrator::new(ScriptedCrawler::default(), options(10, false));
        let input = urls(&["https://s/fail", "https://s/2"]);

        let stats = orchestrator.run(&input).await.unwrap();

        assert_eq!((stats.successful, stats.failed), (1, 1));
    }

    #[tokio::test]
    async fn test_repeated_url_is_skipped() {
        let mut orchestrator = CrawlOrchestrator::new(ScriptedCrawler::default(), options(10, false));
        let input = urls(&["https://s/1", "https://s/1"]);

        let stats = orchestrator.run(&input).await.unwrap();

        assert_eq!(stats.successful, 1);
        assert_eq!(stats.skipped, 1);
        assert_eq!(orchestrator.crawler().attempted.len(), 1);
    }

    #[tokio::test]
    async fn test_loop_error_counts_as_failure_and_still_closes() {
        let mut orchestrator = CrawlOrchestrator::new(ScriptedCrawler::default(), options(10, false));
        let input = urls(&["https://s/1", "https://s/boom", "https://s/3"]);

        let stats = orchestrator.run(&input).await.unwrap();

        assert_eq!(stats.successful, 1);
        assert_eq!(stats.failed, 1);
        assert!(stats.failed_urls.is_empty());
        assert_eq!(orchestrator.crawler().attempted.len(), 1);
        assert_eq!(orchestrator.crawler().closed, 1);
        assert!(stats.end_time.is_some());
    }

    #[tokio::test]
    async fn test_initialization_failure_still_closes() {
        let crawler = ScriptedCrawler {
            fail_init: true,
            ..Default::default()
        };
        let mut orchestrator = CrawlOrchestrator::new(crawler, options(10, false));

        let result = orchestrator.run(&urls(&["https://s/1"])).await;

        assert!(matches!(result, Err(ScoutError::Initialization(_))));
        assert_eq!(orchestrator.crawler().closed, 1);
        assert!(orchestrator.crawler().attempted.is_empty());
        assert_eq!(orchestrator.phase(), RunPhase::Done);
    }

    #[tokio::test]
    async fn test_orchestrator_can_run_twice() {
        let mut orchestrator = CrawlOrchestrator::new(ScriptedCrawler::default(), options(10, false));
        let input = urls(&["https://s/1"]);

        orchestrator.run(&input).await.unwrap();
        let second = orchestrator.run(&input).await.unwrap();

        assert_eq!(second.skipped, 1);
        assert_eq!(orchestrator.crawler().initialized, 2);
        assert_eq!(orchestrator.crawler().closed, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_follows_every_url_including_skips() {
        let mut opts = options(10, false);
        opts.delay_seconds = 1.0;
        let mut orchestrator = CrawlOrchestrator::new(ScriptedCrawler::default(), opts);
        let input = urls(&["https://s/1", "https://s/1", "https://s/2"]);

        let started = tokio::time::Instant::now();
        let stats = orchestrator.run(&input).await.unwrap();

        assert_eq!((stats.successful, stats.skipped), (2, 1));
        assert_eq!(started.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_delay_after_stop_on_error() {
        let mut opts = options(10, true);
        opts.delay_seconds = 1.0;
        let mut orchestrator = CrawlOrchestrator::new(ScriptedCrawler::default(), opts);
        let input = urls(&["https://s/1", "https://s/fail", "https://s/3"]);

        let started = tokio::time::Instant::now();
        let stats = orchestrator.run(&input).await.unwrap();

        assert_eq!((stats.successful, stats.failed), (1, 1));
        assert_eq!(started.elapsed(), Duration::from_secs(1));
    }

    #[test]
    fn test_options_from_config() {
        let config = CrawlerConfig {
            delay_seconds: 1.5,
            max_urls: 7,
            stop_on_error: true,
        };
        let options = RunOptions::from(&config);
        assert_eq!(options.max_urls, 7);
        assert!(options.stop_on_error);
        assert_eq!(options.delay(), Duration::from_millis(1500));
    }
}
