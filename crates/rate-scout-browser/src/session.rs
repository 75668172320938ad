use crate::page::ChromePage;
use crate::{ChromeLauncher, ChromeOptions, Error, TempProfile};
use async_trait::async_trait;
use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::browser_protocol::browser::BrowserContextId;
use chromiumoxide::cdp::browser_protocol::emulation::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::SetLifecycleEventsEnabledParams;
use chromiumoxide::cdp::browser_protocol::target::{
    CreateBrowserContextParams, CreateTargetParams, DisposeBrowserContextParams,
};
use futures::StreamExt;
use rate_scout_core::{BrowserDriver, BrowserSession};
use std::sync::Mutex;
use tokio::task::JoinHandle;

/// Launches one headless Chrome per batch.
pub struct ChromeDriver {
    launcher: ChromeLauncher,
    user_agent: String,
}

impl ChromeDriver {
    pub fn new(options: ChromeOptions, user_agent: impl Into<String>) -> Self {
        Self {
            launcher: ChromeLauncher::new(options),
            user_agent: user_agent.into(),
        }
    }
}

#[async_trait]
impl BrowserDriver for ChromeDriver {
    type Session = ChromeSession;

    async fn launch(&self) -> rate_scout_core::Result<ChromeSession> {
        let (browser, mut handler, profile) = self
            .launcher
            .launch()
            .await
            .map_err(|e| rate_scout_core::Error::Launch(e.to_string()))?;

        // The handler drives the CDP websocket; nothing works unless it is polled
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("CDP handler event error (continuing): {}", e);
                }
            }
        });

        tracing::info!("Chrome started");

        Ok(ChromeSession {
            running: Some(Running {
                browser,
                handler,
                _profile: profile,
            }),
            user_agent: self.user_agent.clone(),
            poll_interval: self.launcher.options().selector_poll_interval,
            orphans: Mutex::new(Vec::new()),
        })
    }
}

struct Running {
    browser: Browser,
    handler: JoinHandle<()>,
    // Removed from disk once the browser is gone
    _profile: TempProfile,
}

/// A running Chrome. Each acquired page gets a fresh incognito-style context.
pub struct ChromeSession {
    running: Option<Running>,
    user_agent: String,
    poll_interval: std::time::Duration,
    /// Contexts of abandoned pages, disposed at the next release or shutdown.
    orphans: Mutex<Vec<BrowserContextId>>,
}

impl ChromeSession {
    fn browser(&self) -> crate::Result<&Browser> {
        self.running
            .as_ref()
            .map(|r| &r.browser)
            .ok_or_else(|| Error::Browser("Chrome has already been shut down".to_string()))
    }

    async fn open_page(&self) -> crate::Result<ChromePage> {
        let browser = self.browser()?;

        let context_id = browser
            .execute(CreateBrowserContextParams::default())
            .await?
            .result
            .browser_context_id;

        let params = CreateTargetParams::builder()
            .url("about:blank")
            .browser_context_id(context_id.clone())
            .build()
            .map_err(Error::Browser)?;

        let page = match browser.new_page(params).await {
            Ok(page) => page,
            Err(e) => {
                dispose_context(browser, context_id).await;
                return Err(e.into());
            }
        };

        let prepared = async {
            page.execute(SetUserAgentOverrideParams::new(self.user_agent.clone()))
                .await?;
            page.execute(SetLifecycleEventsEnabledParams::new(true))
                .await?;
            Ok::<_, Error>(())
        };
        if let Err(e) = prepared.await {
            let _ = page.close().await;
            dispose_context(browser, context_id).await;
            return Err(e);
        }

        Ok(ChromePage::new(page, context_id, self.poll_interval))
    }

    fn take_orphans(&self) -> Vec<BrowserContextId> {
        match self.orphans.lock() {
            Ok(mut orphans) => std::mem::take(&mut *orphans),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    async fn dispose_orphans(&self) {
        let orphans = self.take_orphans();
        if orphans.is_empty() {
            return;
        }
        if let Ok(browser) = self.browser() {
            for context_id in orphans {
                dispose_context(browser, context_id).await;
            }
        }
    }
}

async fn dispose_context(browser: &Browser, context_id: BrowserContextId) {
    if let Err(e) = browser
        .execute(DisposeBrowserContextParams::new(context_id))
        .await
    {
        tracing::debug!("Failed to dispose browser context: {}", e);
    }
}

#[async_trait]
impl BrowserSession for ChromeSession {
    type Page = ChromePage;

    async fn acquire(&self) -> rate_scout_core::Result<ChromePage> {
        self.dispose_orphans().await;
        Ok(self.open_page().await?)
    }

    async fn release(&self, page: ChromePage) {
        let context_id = page.context_id().clone();
        if let Err(e) = page.into_inner().close().await {
            tracing::debug!("Failed to close page: {}", e);
        }
        if let Ok(browser) = self.browser() {
            dispose_context(browser, context_id).await;
        }
    }

    fn abandon(&self, page: ChromePage) {
        let context_id = page.context_id().clone();
        match self.orphans.lock() {
            Ok(mut orphans) => orphans.push(context_id),
            Err(poisoned) => poisoned.into_inner().push(context_id),
        }

        // Closing needs the runtime; without one the context cleanup still happens
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(async move {
                if let Err(e) = page.into_inner().close().await {
                    tracing::debug!("Failed to close abandoned page: {}", e);
                }
            });
        }
    }

    async fn shutdown(mut self) {
        self.dispose_orphans().await;

        let Some(mut running) = self.running.take() else {
            return;
        };

        if let Err(e) = running.browser.close().await {
            tracing::debug!("Failed to close Chrome cleanly: {}", e);
        }
        if let Err(e) = running.browser.wait().await {
            tracing::debug!("Failed waiting for Chrome to exit: {}", e);
        }
        running.handler.abort();

        tracing::info!("Chrome stopped");
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        let Some(mut running) = self.running.take() else {
            return;
        };

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(async move {
                    let _ = running.browser.close().await;
                    let _ = running.browser.wait().await;
                    running.handler.abort();
                });
            }
            // chromiumoxide kills the child process when the Browser drops
            Err(_) => running.handler.abort(),
        }
    }
}
