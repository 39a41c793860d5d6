use chrono::{DateTime, Utc};
use serde::Serialize;

/// Counters and URL lists for one orchestrator run
#[derive(Debug, Clone, Serialize)]
pub struct RunStatistics {
    /// Length of the input list, including URLs beyond the run limit
    pub total_urls: usize,
    pub successful: usize,
    pub failed: usize,
    pub skipped: usize,
    pub crawled_urls: Vec<String>,
    pub failed_urls: Vec<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub runtime_seconds: f64,
}

impl RunStatistics {
    pub fn new(total_urls: usize) -> Self {
        Self {
            total_urls,
            successful: 0,
            failed: 0,
            skipped: 0,
            crawled_urls: Vec::new(),
            failed_urls: Vec::new(),
            start_time: Utc::now(),
            end_time: None,
            runtime_seconds: 0.0,
        }
    }

    pub fn record_success(&mut self, url: &str) {
        self.successful += 1;
        self.crawled_urls.push(url.to_string());
    }

    pub fn record_failure(&mut self, url: &str) {
        self.failed += 1;
        self.failed_urls.push(url.to_string());
    }

    pub fn record_skip(&mut self) {
        self.skipped += 1;
    }

    /// Number of URLs that went through a crawl attempt
    pub fn attempted(&self) -> usize {
        self.crawled_urls.len() + self.failed_urls.len()
    }

    /// Stamps the end time and computes the runtime
    pub fn finish(&mut self) {
        let end = Utc::now();
        self.runtime_seconds = (end - self.start_time)
            .to_std()
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);
        self.end_time = Some(end);
    }

    /// Runtime formatted as `Xm Ys`
    pub fn runtime_display(&self) -> String {
        let total = self.runtime_seconds.max(0.0) as u64;
        format!("{}m {}s", total / 60, total % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let mut stats = RunStatistics::new(4);
        stats.record_success("https://a/1");
        stats.record_failure("https://a/2");
        stats.record_skip();

        assert_eq!(stats.total_urls, 4);
        assert_eq!((stats.successful, stats.failed, stats.skipped), (1, 1, 1));
        assert_eq!(stats.attempted(), 2);
    }

    #[test]
    fn test_finish_sets_end_time() {
        let mut stats = RunStatistics::new(0);
        stats.finish();
        assert!(stats.end_time.is_some());
        assert!(stats.runtime_seconds >= 0.0);
    }

    #[test]
    fn test_runtime_display() {
        let mut stats = RunStatistics::new(0);
        stats.runtime_seconds = 125.7;
        assert_eq!(stats.runtime_display(), "2m 5s");
    }
}
