//! Browser capabilities the pipeline needs from its environment.
//!
//! The extractor and orchestrator only ever talk to these traits; the
//! `rate-scout-browser` crate implements them on top of Chrome, tests
//! implement them in memory.

use crate::{PageError, Result};
use async_trait::async_trait;
use std::time::Duration;

/// Starts a browser for the duration of one batch.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    type Session: BrowserSession;

    /// Launch the browser. Failure here is fatal for the whole batch and must
    /// be reported as [`crate::Error::Launch`].
    async fn launch(&self) -> Result<Self::Session>;
}

/// A running browser that hands out isolated pages.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    type Page: PageHandle;

    /// Open a fresh page in its own browsing context.
    async fn acquire(&self) -> Result<Self::Page>;

    /// Tear down a page and its context. Never fails; problems are logged.
    async fn release(&self, page: Self::Page);

    /// Schedule teardown without waiting for it. Used when the scraping
    /// future is dropped before it could call [`release`](Self::release).
    fn abandon(&self, page: Self::Page);

    /// Stop the browser process.
    async fn shutdown(self);
}

/// One open page. Clones refer to the same page.
#[async_trait]
pub trait PageHandle: Clone + Send + Sync {
    type Element: ElementHandle;

    /// Navigate and wait until network activity has gone idle.
    async fn goto(&self, url: &str, timeout: Duration) -> std::result::Result<(), PageError>;

    async fn title(&self) -> std::result::Result<Option<String>, PageError>;

    /// Wait until at least one element matches `selector`.
    async fn wait_for_selector(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> std::result::Result<(), PageError>;

    /// All matching elements in document order.
    async fn query_all(&self, selector: &str) -> std::result::Result<Vec<Self::Element>, PageError>;
}

#[async_trait]
pub trait ElementHandle: Send + Sync + Sized {
    /// Rendered text of the element, `None` when it has none.
    async fn inner_text(&self) -> std::result::Result<Option<String>, PageError>;

    async fn attribute(&self, name: &str) -> std::result::Result<Option<String>, PageError>;

    /// First descendant matching `selector`.
    async fn query(&self, selector: &str) -> std::result::Result<Option<Self>, PageError>;
}
