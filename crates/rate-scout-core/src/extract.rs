use crate::config::ScrapeConfig;
use crate::driver::{ElementHandle, PageHandle};
use crate::result::{NO_POSTS_MESSAGE, ScrapeResult, TIMEOUT_MESSAGE};
use crate::PageError;
use chrono::{DateTime, Local};

/// Reasons extraction stopped early. Each one ends up in `ScrapeResult::error`.
#[derive(Debug)]
enum Stop {
    Page(PageError),
    NoPosts,
    BadEpoch { attribute: String, raw: String },
}

impl From<PageError> for Stop {
    fn from(err: PageError) -> Self {
        Stop::Page(err)
    }
}

impl Stop {
    fn message(&self) -> String {
        match self {
            Stop::Page(PageError::Timeout(_)) => TIMEOUT_MESSAGE.to_string(),
            Stop::Page(PageError::Driver(msg)) => format!("Error during scraping: {}", msg),
            Stop::NoPosts => NO_POSTS_MESSAGE.to_string(),
            Stop::BadEpoch { attribute, raw } => format!(
                "Error during scraping: invalid {} value '{}'",
                attribute, raw
            ),
        }
    }
}

/// Pulls the newest post out of a loaded page.
///
/// Expected site-shape failures (timeouts, missing posts, unreadable
/// timestamps) never escape: they are written into the returned result.
pub struct PageExtractor<'a> {
    config: &'a ScrapeConfig,
}

impl<'a> PageExtractor<'a> {
    pub fn new(config: &'a ScrapeConfig) -> Self {
        Self { config }
    }

    /// Extract everything the page offers. Never fails: every fault, expected
    /// or not, is reported through `error`.
    pub async fn extract<P: PageHandle>(&self, page: &P, url: &str) -> ScrapeResult {
        let (mut result, stop) = self.collect(page, url).await;
        if let Some(stop) = stop {
            result.error = Some(stop.message());
        }
        result
    }

    /// Like [`extract`](Self::extract), but browser faults that have nothing to
    /// do with the page's shape (crashes, disconnects) are raised instead of
    /// recorded so a caller can retry them.
    pub async fn try_extract<P: PageHandle>(
        &self,
        page: &P,
        url: &str,
    ) -> Result<ScrapeResult, PageError> {
        let (mut result, stop) = self.collect(page, url).await;
        match stop {
            Some(Stop::Page(err @ PageError::Driver(_))) => return Err(err),
            Some(stop) => result.error = Some(stop.message()),
            None => {}
        }
        Ok(result)
    }

    async fn collect<P: PageHandle>(&self, page: &P, url: &str) -> (ScrapeResult, Option<Stop>) {
        let mut result = ScrapeResult::new(url);
        let stop = self.fill(page, url, &mut result).await.err();
        if let Some(stop) = &stop {
            tracing::debug!("Extraction of {} stopped: {:?}", url, stop);
        }
        (result, stop)
    }

    async fn fill<P: PageHandle>(
        &self,
        page: &P,
        url: &str,
        result: &mut ScrapeResult,
    ) -> Result<(), Stop> {
        tracing::debug!("Navigating to {}", url);
        page.goto(url, self.config.navigation_timeout).await?;

        result.title = page.title().await?;
        tracing::debug!("Loaded {} (title: {:?})", url, result.title);

        // Posts render after the initial load, so querying straight away races the page.
        match page
            .wait_for_selector(&self.config.post_selector, self.config.content_timeout)
            .await
        {
            Ok(()) => {}
            Err(PageError::Timeout(msg)) => {
                tracing::debug!("No post container appeared on {}: {}", url, msg);
            }
            Err(e) => return Err(e.into()),
        }

        // Site renders newest first; DOM order is taken as recency order.
        let posts = page.query_all(&self.config.post_selector).await?;
        tracing::debug!("Found {} post containers on {}", posts.len(), url);
        let latest = posts.into_iter().next().ok_or(Stop::NoPosts)?;

        result.latest_post_text = Some(latest.inner_text().await?.unwrap_or_default());
        result.timestamp = self.read_timestamp(&latest).await?;

        Ok(())
    }

    /// Machine-readable epoch attribute first, visible text second.
    async fn read_timestamp<E: ElementHandle>(&self, post: &E) -> Result<Option<String>, Stop> {
        let Some(element) = post.query(&self.config.timestamp_selector).await? else {
            return Ok(None);
        };

        let raw = element
            .attribute(&self.config.epoch_attribute)
            .await?
            .filter(|value| !value.is_empty());

        if let Some(raw) = raw {
            return epoch_to_iso(&raw).map(Some).ok_or_else(|| Stop::BadEpoch {
                attribute: self.config.epoch_attribute.clone(),
                raw,
            });
        }

        Ok(Some(element.inner_text().await?.unwrap_or_default()))
    }
}

/// Convert a Unix-epoch seconds string to local ISO-8601 (`YYYY-MM-DDTHH:MM:SS`).
pub fn epoch_to_iso(raw: &str) -> Option<String> {
    let seconds: i64 = raw.trim().parse().ok()?;
    let utc = DateTime::from_timestamp(seconds, 0)?;
    Some(
        utc.with_timezone(&Local)
            .naive_local()
            .format("%Y-%m-%dT%H:%M:%S")
            .to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_to_iso_uses_local_time() {
        let expected = DateTime::from_timestamp(1_700_000_000, 0)
            .unwrap()
            .with_timezone(&Local)
            .format("%Y-%m-%dT%H:%M:%S")
            .to_string();

        assert_eq!(epoch_to_iso("1700000000").as_deref(), Some(expected.as_str()));
    }

    #[test]
    fn test_epoch_to_iso_shape() {
        let iso = epoch_to_iso("1700000000").unwrap();
        // 2023-11-14T22:13:20Z shifted by at most a day in any zone
        assert!(iso.starts_with("2023-11-14T") || iso.starts_with("2023-11-15T"));
        assert_eq!(iso.len(), "2023-11-14T22:13:20".len());
        assert!(iso.ends_with(":20"));
    }

    #[test]
    fn test_epoch_to_iso_tolerates_whitespace() {
        assert_eq!(epoch_to_iso(" 1700000000\n"), epoch_to_iso("1700000000"));
    }

    #[test]
    fn test_epoch_to_iso_rejects_non_numbers() {
        assert!(epoch_to_iso("2h").is_none());
        assert!(epoch_to_iso("17.5").is_none());
        assert!(epoch_to_iso("99999999999999999999").is_none());
    }

    #[test]
    fn test_stop_messages() {
        assert_eq!(
            Stop::Page(PageError::Timeout("navigation".into())).message(),
            TIMEOUT_MESSAGE
        );
        assert_eq!(
            Stop::Page(PageError::Driver("target closed".into())).message(),
            "Error during scraping: target closed"
        );
        assert_eq!(Stop::NoPosts.message(), NO_POSTS_MESSAGE);
        assert_eq!(
            Stop::BadEpoch {
                attribute: "data-utime".into(),
                raw: "soon".into()
            }
            .message(),
            "Error during scraping: invalid data-utime value 'soon'"
        );
    }
}
