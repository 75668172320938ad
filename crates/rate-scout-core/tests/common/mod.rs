//! In-memory browser used by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use rate_scout_core::{
    BrowserDriver, BrowserSession, ElementHandle, Error, PageError, PageHandle, Result,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub enum Navigation {
    #[default]
    Loads,
    TimesOut,
    /// Fails with a driver error this many times, then loads.
    Crashes(u32),
    /// Takes this long to load.
    Slow(Duration),
    /// Never finishes.
    Hangs,
}

#[derive(Debug, Clone)]
pub struct FakeTime {
    pub epoch: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct FakePost {
    pub text: String,
    pub time: Option<FakeTime>,
}

impl FakePost {
    pub fn text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            time: None,
        }
    }

    pub fn with_epoch(mut self, epoch: &str) -> Self {
        self.time = Some(FakeTime {
            epoch: Some(epoch.to_string()),
            text: "visible".to_string(),
        });
        self
    }

    pub fn with_time_text(mut self, text: &str) -> Self {
        self.time = Some(FakeTime {
            epoch: None,
            text: text.to_string(),
        });
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeSite {
    pub navigation: Navigation,
    pub title: Option<String>,
    pub posts: Vec<FakePost>,
    /// Posts exist but the selector wait still times out.
    pub slow_render: bool,
}

impl FakeSite {
    pub fn with_posts(title: &str, posts: Vec<FakePost>) -> Self {
        Self {
            title: Some(title.to_string()),
            posts,
            ..Self::default()
        }
    }

    pub fn empty(title: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            ..Self::default()
        }
    }

    pub fn navigation(mut self, navigation: Navigation) -> Self {
        self.navigation = navigation;
        self
    }
}

#[derive(Debug, Default)]
pub struct Tally {
    pub launches: u32,
    pub shutdowns: u32,
    pub acquired: u32,
    pub released: u32,
    pub abandoned: u32,
    pub navigations: HashMap<String, u32>,
}

#[derive(Clone, Default)]
pub struct FakeDriver {
    sites: Arc<HashMap<String, FakeSite>>,
    launch_error: Option<String>,
    acquire_failures: Arc<Mutex<u32>>,
    pub tally: Arc<Mutex<Tally>>,
}

impl FakeDriver {
    pub fn new(sites: Vec<(&str, FakeSite)>) -> Self {
        Self {
            sites: Arc::new(
                sites
                    .into_iter()
                    .map(|(url, site)| (url.to_string(), site))
                    .collect(),
            ),
            ..Self::default()
        }
    }

    pub fn failing_launch(message: &str) -> Self {
        Self {
            launch_error: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn failing_acquire(self, times: u32) -> Self {
        *self.acquire_failures.lock().unwrap() = times;
        self
    }

    pub fn tally(&self) -> std::sync::MutexGuard<'_, Tally> {
        self.tally.lock().unwrap()
    }
}

#[async_trait]
impl BrowserDriver for FakeDriver {
    type Session = FakeSession;

    async fn launch(&self) -> Result<FakeSession> {
        if let Some(message) = &self.launch_error {
            return Err(Error::Launch(message.clone()));
        }
        self.tally.lock().unwrap().launches += 1;
        Ok(FakeSession {
            driver: self.clone(),
        })
    }
}

pub struct FakeSession {
    driver: FakeDriver,
}

#[async_trait]
impl BrowserSession for FakeSession {
    type Page = FakePage;

    async fn acquire(&self) -> Result<FakePage> {
        {
            let mut remaining = self.driver.acquire_failures.lock().unwrap();
            if *remaining > 0 {
                *remaining -= 1;
                return Err(PageError::Driver("browser disconnected".to_string()).into());
            }
        }
        self.driver.tally.lock().unwrap().acquired += 1;
        Ok(FakePage {
            driver: self.driver.clone(),
            loaded: Arc::new(Mutex::new(None)),
        })
    }

    async fn release(&self, _page: FakePage) {
        self.driver.tally.lock().unwrap().released += 1;
    }

    fn abandon(&self, _page: FakePage) {
        self.driver.tally.lock().unwrap().abandoned += 1;
    }

    async fn shutdown(self) {
        self.driver.tally.lock().unwrap().shutdowns += 1;
    }
}

#[derive(Clone)]
pub struct FakePage {
    driver: FakeDriver,
    loaded: Arc<Mutex<Option<FakeSite>>>,
}

impl FakePage {
    fn site(&self) -> std::result::Result<FakeSite, PageError> {
        self.loaded
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| PageError::Driver("no page loaded".to_string()))
    }
}

#[async_trait]
impl PageHandle for FakePage {
    type Element = FakeElement;

    async fn goto(&self, url: &str, _timeout: Duration) -> std::result::Result<(), PageError> {
        let site = self
            .driver
            .sites
            .get(url)
            .cloned()
            .ok_or_else(|| PageError::Driver(format!("net::ERR_NAME_NOT_RESOLVED at {}", url)))?;

        let attempt = {
            let mut tally = self.driver.tally.lock().unwrap();
            let count = tally.navigations.entry(url.to_string()).or_insert(0);
            *count += 1;
            *count
        };

        match site.navigation {
            Navigation::Loads => {}
            Navigation::TimesOut => {
                return Err(PageError::Timeout("navigation exceeded 20s".to_string()));
            }
            Navigation::Crashes(times) if attempt <= times => {
                return Err(PageError::Driver("Target closed".to_string()));
            }
            Navigation::Crashes(_) => {}
            Navigation::Slow(delay) => tokio::time::sleep(delay).await,
            Navigation::Hangs => std::future::pending::<()>().await,
        }

        *self.loaded.lock().unwrap() = Some(site);
        Ok(())
    }

    async fn title(&self) -> std::result::Result<Option<String>, PageError> {
        Ok(self.site()?.title)
    }

    async fn wait_for_selector(
        &self,
        selector: &str,
        _timeout: Duration,
    ) -> std::result::Result<(), PageError> {
        let site = self.site()?;
        if site.posts.is_empty() || site.slow_render {
            return Err(PageError::Timeout(format!("waiting for {}", selector)));
        }
        Ok(())
    }

    async fn query_all(&self, _selector: &str) -> std::result::Result<Vec<FakeElement>, PageError> {
        Ok(self
            .site()?
            .posts
            .into_iter()
            .map(FakeElement::Post)
            .collect())
    }
}

#[derive(Debug, Clone)]
pub enum FakeElement {
    Post(FakePost),
    Time(FakeTime),
}

#[async_trait]
impl ElementHandle for FakeElement {
    async fn inner_text(&self) -> std::result::Result<Option<String>, PageError> {
        Ok(Some(match self {
            FakeElement::Post(post) => post.text.clone(),
            FakeElement::Time(time) => time.text.clone(),
        }))
    }

    async fn attribute(&self, name: &str) -> std::result::Result<Option<String>, PageError> {
        match self {
            FakeElement::Time(time) if name == "data-utime" => Ok(time.epoch.clone()),
            _ => Ok(None),
        }
    }

    async fn query(&self, _selector: &str) -> std::result::Result<Option<Self>, PageError> {
        match self {
            FakeElement::Post(post) => Ok(post.time.clone().map(FakeElement::Time)),
            FakeElement::Time(_) => Ok(None),
        }
    }
}
