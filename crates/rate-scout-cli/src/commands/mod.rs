pub mod scrape;
pub mod watch;

use clap::Args;
use rate_scout_browser::{ChromeDriver, ChromeOptions};
use rate_scout_core::{PatternRanker, Pipeline, ScrapeConfig, ScrapeTarget};
use std::path::PathBuf;
use std::time::Duration;

/// Options shared by every command that runs a scrape batch
#[derive(Args, Debug, Clone)]
pub struct BatchArgs {
    /// Pages to scrape; results keep this order
    #[arg(value_name = "URL", required = true)]
    pub urls: Vec<ScrapeTarget>,

    /// Path to Chrome executable (auto-detected if not specified)
    #[arg(long, env = "RATE_SCOUT_CHROME_PATH")]
    pub chrome_path: Option<PathBuf>,

    /// Number of pages scraped at the same time
    #[arg(short, long, env = "RATE_SCOUT_CONCURRENCY", default_value_t = 1)]
    pub concurrency: usize,

    /// Seconds allowed for navigation, including the idle-network wait
    #[arg(long, env = "RATE_SCOUT_NAV_TIMEOUT", default_value_t = 20)]
    pub nav_timeout: u64,

    /// Seconds to wait for the first post to render
    #[arg(long, env = "RATE_SCOUT_CONTENT_TIMEOUT", default_value_t = 10)]
    pub content_timeout: u64,

    /// CSS selector identifying one post
    #[arg(long, env = "RATE_SCOUT_POST_SELECTOR")]
    pub post_selector: Option<String>,

    /// Disable the Chrome sandbox (needed as root or in containers)
    #[arg(long)]
    pub no_sandbox: bool,

    /// Show the browser window instead of running headless
    #[arg(long)]
    pub headful: bool,
}

impl BatchArgs {
    pub fn scrape_config(&self) -> ScrapeConfig {
        let mut config = ScrapeConfig::default()
            .with_concurrency(self.concurrency)
            .with_navigation_timeout(Duration::from_secs(self.nav_timeout))
            .with_content_timeout(Duration::from_secs(self.content_timeout));

        if let Some(selector) = &self.post_selector {
            config = config.with_post_selector(selector.clone());
        }

        config
    }

    pub fn chrome_options(&self) -> ChromeOptions {
        ChromeOptions {
            chrome_path: self.chrome_path.clone(),
            headless: !self.headful,
            no_sandbox: self.no_sandbox,
            ..ChromeOptions::default()
        }
    }

    pub fn pipeline(&self) -> Pipeline<ChromeDriver, PatternRanker> {
        let config = self.scrape_config();
        let driver = ChromeDriver::new(self.chrome_options(), config.user_agent.clone());
        Pipeline::new(driver, PatternRanker, config)
    }
}

pub(crate) fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        batch: BatchArgs,
    }

    #[test]
    fn test_flags_map_onto_config() {
        let cli = TestCli::parse_from([
            "rate-scout",
            "https://www.facebook.com/rates",
            "--concurrency",
            "0",
            "--nav-timeout",
            "5",
            "--post-selector",
            "article",
            "--headful",
        ]);

        let config = cli.batch.scrape_config();
        assert_eq!(config.concurrency, 1);
        assert_eq!(config.navigation_timeout, Duration::from_secs(5));
        assert_eq!(config.content_timeout, Duration::from_secs(10));
        assert_eq!(config.post_selector, "article");

        let options = cli.batch.chrome_options();
        assert!(!options.headless);
        assert!(!options.no_sandbox);
    }

    #[test]
    fn test_invalid_url_rejected_at_parse_time() {
        let parsed = TestCli::try_parse_from(["rate-scout", "ftp://example.com/feed"]);
        assert!(parsed.is_err());
    }
}
