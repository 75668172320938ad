use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Desktop Chrome user agent sent with every page.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Prompt handed to the ranking collaborator along with the gathered posts.
pub const DEFAULT_PROMPT: &str = "From these Facebook posts, extract the most recent US dollar to Libyan dinar (USD/LYD) parallel market exchange rate. Reply with the rate only.";

/// Tunables for one scrape batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    /// Bound on navigation including the idle-network wait.
    pub navigation_timeout: Duration,
    /// Bound on waiting for the first post container.
    pub content_timeout: Duration,
    /// Selector identifying one post.
    pub post_selector: String,
    /// Selector for the timestamp element inside a post.
    pub timestamp_selector: String,
    /// Attribute holding a Unix-epoch timestamp.
    pub epoch_attribute: String,
    pub user_agent: String,
    /// Targets scraped at the same time. 1 means strictly sequential.
    pub concurrency: usize,
    pub retry: RetryPolicy,
    pub prompt: String,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            navigation_timeout: Duration::from_secs(20),
            content_timeout: Duration::from_secs(10),
            post_selector: r#"div[role="article"]"#.to_string(),
            timestamp_selector: "abbr[data-utime], time".to_string(),
            epoch_attribute: "data-utime".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            concurrency: 1,
            retry: RetryPolicy::default(),
            prompt: DEFAULT_PROMPT.to_string(),
        }
    }
}

impl ScrapeConfig {
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout;
        self
    }

    pub fn with_content_timeout(mut self, timeout: Duration) -> Self {
        self.content_timeout = timeout;
        self
    }

    pub fn with_post_selector(mut self, selector: impl Into<String>) -> Self {
        self.post_selector = selector.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_site_layout() {
        let config = ScrapeConfig::default();

        assert_eq!(config.navigation_timeout, Duration::from_secs(20));
        assert_eq!(config.content_timeout, Duration::from_secs(10));
        assert_eq!(config.post_selector, r#"div[role="article"]"#);
        assert_eq!(config.epoch_attribute, "data-utime");
        assert_eq!(config.concurrency, 1);
        assert_eq!(config.retry.max_attempts, 3);
    }

    #[test]
    fn test_concurrency_never_zero() {
        let config = ScrapeConfig::default().with_concurrency(0);
        assert_eq!(config.concurrency, 1);
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let config: ScrapeConfig =
            serde_json::from_str(r#"{"post_selector": "article", "concurrency": 4}"#).unwrap();

        assert_eq!(config.post_selector, "article");
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.content_timeout, Duration::from_secs(10));
    }
}
