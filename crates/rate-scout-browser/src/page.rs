use crate::{Error, Result};
use async_trait::async_trait;
use chromiumoxide::Page;
use chromiumoxide::cdp::browser_protocol::browser::BrowserContextId;
use chromiumoxide::cdp::browser_protocol::page::EventLifecycleEvent;
use chromiumoxide::element::Element;
use futures::StreamExt;
use rate_scout_core::{ElementHandle, PageError, PageHandle};
use std::time::Duration;

/// Lifecycle event Chrome emits once a document has had no network
/// activity for 500ms.
const NETWORK_IDLE: &str = "networkIdle";
const DOCUMENT_INIT: &str = "init";

/// A tab living in its own browser context.
#[derive(Clone)]
pub struct ChromePage {
    page: Page,
    context_id: BrowserContextId,
    poll_interval: Duration,
}

impl ChromePage {
    pub(crate) fn new(page: Page, context_id: BrowserContextId, poll_interval: Duration) -> Self {
        Self {
            page,
            context_id,
            poll_interval,
        }
    }

    pub(crate) fn context_id(&self) -> &BrowserContextId {
        &self.context_id
    }

    pub(crate) fn into_inner(self) -> Page {
        self.page
    }

    /// Navigate the main frame and wait for its document to reach network idle.
    ///
    /// The listener is registered before navigating so the idle event of a
    /// fast page cannot slip past. Events from the previous document are
    /// skipped by matching on the loader of the new one.
    async fn navigate(&self, url: &str) -> Result<()> {
        let main_frame = self.page.mainframe().await?;
        let mut lifecycle = self.page.event_listener::<EventLifecycleEvent>().await?;

        self.page.goto(url).await?;

        let mut loader = None;
        while let Some(event) = lifecycle.next().await {
            if let Some(frame) = &main_frame
                && frame != &event.frame_id
            {
                continue;
            }

            match event.name.as_str() {
                DOCUMENT_INIT => loader = Some(event.loader_id.clone()),
                NETWORK_IDLE if loader.as_ref() == Some(&event.loader_id) => {
                    tracing::debug!("Network idle on {}", url);
                    return Ok(());
                }
                _ => {}
            }
        }

        Err(Error::Cdp(format!("Page closed while loading {}", url)))
    }
}

#[async_trait]
impl PageHandle for ChromePage {
    type Element = ChromeElement;

    async fn goto(&self, url: &str, timeout: Duration) -> std::result::Result<(), PageError> {
        match tokio::time::timeout(timeout, self.navigate(url)).await {
            Ok(outcome) => outcome.map_err(PageError::from),
            Err(_) => Err(PageError::Timeout(format!(
                "navigation to {} exceeded {}ms",
                url,
                timeout.as_millis()
            ))),
        }
    }

    async fn title(&self) -> std::result::Result<Option<String>, PageError> {
        self.page
            .get_title()
            .await
            .map_err(|e| PageError::from(Error::from(e)))
    }

    async fn wait_for_selector(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> std::result::Result<(), PageError> {
        let poll = async {
            loop {
                match self.page.find_elements(selector).await {
                    Ok(found) if !found.is_empty() => return,
                    Ok(_) => {}
                    // The document may be mid-replacement; try again next tick
                    Err(e) => tracing::trace!("Polling '{}' failed: {}", selector, e),
                }
                tokio::time::sleep(self.poll_interval).await;
            }
        };

        tokio::time::timeout(timeout, poll).await.map_err(|_| {
            PageError::Timeout(format!(
                "'{}' did not appear within {}ms",
                selector,
                timeout.as_millis()
            ))
        })
    }

    async fn query_all(&self, selector: &str) -> std::result::Result<Vec<ChromeElement>, PageError> {
        match self.page.find_elements(selector).await {
            Ok(elements) => Ok(elements.into_iter().map(ChromeElement).collect()),
            // CDP reports "no node found" as an error rather than an empty list
            Err(chromiumoxide::error::CdpError::NotFound) => Ok(Vec::new()),
            Err(e) => Err(Error::from(e).into()),
        }
    }
}

/// A DOM node resolved on a [`ChromePage`].
pub struct ChromeElement(Element);

#[async_trait]
impl ElementHandle for ChromeElement {
    async fn inner_text(&self) -> std::result::Result<Option<String>, PageError> {
        self.0
            .inner_text()
            .await
            .map_err(|e| Error::from(e).into())
    }

    async fn attribute(&self, name: &str) -> std::result::Result<Option<String>, PageError> {
        self.0
            .attribute(name)
            .await
            .map_err(|e| Error::from(e).into())
    }

    async fn query(&self, selector: &str) -> std::result::Result<Option<Self>, PageError> {
        match self.0.find_elements(selector).await {
            Ok(elements) => Ok(elements.into_iter().next().map(ChromeElement)),
            Err(chromiumoxide::error::CdpError::NotFound) => Ok(None),
            Err(e) => Err(Error::from(e).into()),
        }
    }
}
