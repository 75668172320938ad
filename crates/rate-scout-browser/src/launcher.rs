use crate::{ChromeFinder, Error, Result, TempProfile};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::handler::Handler;
use std::path::PathBuf;
use std::time::Duration;

/// How Chrome is started.
#[derive(Debug, Clone)]
pub struct ChromeOptions {
    pub chrome_path: Option<PathBuf>,
    pub headless: bool,
    /// Needed when running as root or inside most containers.
    pub no_sandbox: bool,
    /// Bound on a single CDP request.
    pub request_timeout: Duration,
    /// How often to re-check the DOM while waiting for a selector.
    pub selector_poll_interval: Duration,
    pub extra_args: Vec<String>,
}

impl Default for ChromeOptions {
    fn default() -> Self {
        Self {
            chrome_path: None,
            headless: true,
            no_sandbox: false,
            request_timeout: Duration::from_secs(30),
            selector_poll_interval: Duration::from_millis(100),
            extra_args: Vec::new(),
        }
    }
}

/// Starts Chrome processes for a batch
pub struct ChromeLauncher {
    options: ChromeOptions,
}

impl ChromeLauncher {
    pub fn new(options: ChromeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ChromeOptions {
        &self.options
    }

    /// Find Chrome, create a fresh profile and start the browser
    pub async fn launch(&self) -> Result<(Browser, Handler, TempProfile)> {
        let chrome_path = ChromeFinder::new(self.options.chrome_path.clone()).find()?;
        let profile = TempProfile::create()?;

        let config = self.build_config(chrome_path, profile.path().to_path_buf())?;

        tracing::info!(
            "Launching Chrome (headless={})",
            self.options.headless
        );
        let (browser, handler) = Browser::launch(config)
            .await
            .map_err(|e| Error::Browser(format!("Failed to launch Chrome: {}", e)))?;

        Ok((browser, handler, profile))
    }

    fn build_config(&self, chrome_path: PathBuf, profile_path: PathBuf) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .user_data_dir(profile_path)
            .request_timeout(self.options.request_timeout)
            .args(self.build_args());

        // with_head means NOT headless
        if !self.options.headless {
            builder = builder.with_head();
        }
        if self.options.no_sandbox {
            builder = builder.no_sandbox();
        }

        builder.build().map_err(Error::Browser)
    }

    /// Chrome command-line arguments on top of chromiumoxide's defaults
    fn build_args(&self) -> Vec<String> {
        let mut args = vec![
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
            "--disable-gpu".to_string(),
            "--disable-dev-shm-usage".to_string(),
            "--disable-blink-features=AutomationControlled".to_string(),
        ];
        args.extend(self.options.extra_args.iter().cloned());
        args
    }
}
