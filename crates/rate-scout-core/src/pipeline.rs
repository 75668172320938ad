use crate::cache::{ExchangeCache, LatestExchangeInfo};
use crate::config::ScrapeConfig;
use crate::driver::{BrowserDriver, BrowserSession};
use crate::extract::PageExtractor;
use crate::rank::{PostData, PostsByUrl, Ranker};
use crate::result::{BatchReport, BatchResult, ScrapeResult};
use crate::target::ScrapeTarget;
use crate::Result;
use chrono::Local;
use futures::StreamExt;
use futures::stream;

/// Runs extraction over a batch of targets and keeps the exchange cache current.
pub struct Pipeline<D, R> {
    driver: D,
    ranker: R,
    config: ScrapeConfig,
}

impl<D, R> Pipeline<D, R>
where
    D: BrowserDriver,
    R: Ranker,
{
    pub fn new(driver: D, ranker: R, config: ScrapeConfig) -> Self {
        Self {
            driver,
            ranker,
            config,
        }
    }

    pub fn config(&self) -> &ScrapeConfig {
        &self.config
    }

    /// Scrape every target, rank the posts found and update `cache`.
    ///
    /// Only a browser launch failure is returned as an error. Per-target
    /// faults end up in that target's result and the batch carries on.
    pub async fn run(
        &self,
        targets: &[ScrapeTarget],
        cache: &mut ExchangeCache,
    ) -> Result<BatchReport> {
        let results = self.scrape(targets).await?;
        let selected_rate = self.rank_and_store(&results, cache).await;

        Ok(BatchReport {
            results,
            selected_rate,
        })
    }

    /// Scrape every target; one result per target, in input order.
    pub async fn scrape(&self, targets: &[ScrapeTarget]) -> Result<BatchResult> {
        if targets.is_empty() {
            return Ok(Vec::new());
        }

        tracing::info!(
            "Starting batch of {} targets (concurrency {})",
            targets.len(),
            self.config.concurrency.max(1)
        );
        let session = self.driver.launch().await?;

        let results: BatchResult = stream::iter(targets)
            .map(|target| self.scrape_target(&session, target))
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await;

        session.shutdown().await;

        tracing::info!(
            "Batch finished: {}/{} targets without errors",
            results.iter().filter(|r| r.is_success()).count(),
            results.len()
        );
        Ok(results)
    }

    async fn scrape_target(&self, session: &D::Session, target: &ScrapeTarget) -> ScrapeResult {
        let url = target.as_str();
        tracing::info!("Scraping {}", url);

        let label = format!("scrape {}", url);
        let outcome = self
            .config
            .retry
            .run(&label, |_| self.attempt(session, url))
            .await;

        match outcome {
            Ok(result) => {
                if let Some(error) = &result.error {
                    tracing::info!("{}: {}", url, error);
                }
                result
            }
            Err(e) => ScrapeResult::failed(url, format!("Error during scraping: {}", e)),
        }
    }

    /// One acquire/extract/release cycle on a fresh page.
    async fn attempt(&self, session: &D::Session, url: &str) -> Result<ScrapeResult> {
        let page = session.acquire().await?;
        let guard = AbandonOnDrop::new(session, page.clone());

        let outcome = PageExtractor::new(&self.config).try_extract(&page, url).await;

        session.release(page).await;
        guard.disarm();

        Ok(outcome?)
    }

    async fn rank_and_store(
        &self,
        results: &[ScrapeResult],
        cache: &mut ExchangeCache,
    ) -> Option<String> {
        // Only fully successful results feed the ranker and the cache.
        let posts: PostsByUrl = results
            .iter()
            .filter(|result| result.is_success())
            .filter_map(|result| {
                let text = result.latest_post_text.clone()?;
                Some((
                    result.url.clone(),
                    PostData {
                        post_text: text,
                        timestamp: result.timestamp.clone(),
                    },
                ))
            })
            .collect();

        // Input order decides which target is credited as the source.
        let source_url = posts.first_url()?.to_string();

        tracing::info!("Ranking {} posts", posts.len());
        match self.ranker.rank(&posts, &self.config.prompt).await {
            Ok(rate) => {
                cache.replace(LatestExchangeInfo {
                    rate: rate.clone(),
                    timestamp: Local::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
                    source_url,
                    error: String::new(),
                });
                Some(rate)
            }
            Err(e) => {
                tracing::warn!("Ranking failed, keeping previous exchange info: {}", e);
                None
            }
        }
    }
}

/// Hands a page back to the session if the scraping future is dropped mid-flight.
struct AbandonOnDrop<'s, S: BrowserSession> {
    session: &'s S,
    page: Option<S::Page>,
}

impl<'s, S: BrowserSession> AbandonOnDrop<'s, S> {
    fn new(session: &'s S, page: S::Page) -> Self {
        Self {
            session,
            page: Some(page),
        }
    }

    fn disarm(mut self) {
        self.page = None;
    }
}

impl<S: BrowserSession> Drop for AbandonOnDrop<'_, S> {
    fn drop(&mut self) {
        if let Some(page) = self.page.take() {
            tracing::debug!("Scrape cancelled, abandoning page");
            self.session.abandon(page);
        }
    }
}
