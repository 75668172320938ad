use serde::{Deserialize, Serialize};

/// Last known good exchange-rate reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestExchangeInfo {
    pub rate: String,
    pub timestamp: String,
    pub source_url: String,
    pub error: String,
}

impl LatestExchangeInfo {
    pub fn never_scraped() -> Self {
        Self {
            rate: "N/A".to_string(),
            timestamp: "Never scraped yet".to_string(),
            source_url: "No URL scraped yet.".to_string(),
            error: "No scrape performed yet.".to_string(),
        }
    }

    pub fn is_populated(&self) -> bool {
        *self != Self::never_scraped()
    }
}

impl Default for LatestExchangeInfo {
    fn default() -> Self {
        Self::never_scraped()
    }
}

/// Process-lifetime holder for [`LatestExchangeInfo`].
///
/// Owned by whoever drives batches and lent mutably to the pipeline after the
/// per-target join point, so there is exactly one writer and no locking. The
/// value is only ever swapped whole.
#[derive(Debug, Default)]
pub struct ExchangeCache {
    info: LatestExchangeInfo,
    updates: u64,
}

impl ExchangeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> &LatestExchangeInfo {
        &self.info
    }

    /// Number of successful replacements since start.
    pub fn updates(&self) -> u64 {
        self.updates
    }

    pub fn replace(&mut self, info: LatestExchangeInfo) {
        tracing::info!(
            "Exchange cache updated: rate={} source={}",
            info.rate,
            info.source_url
        );
        self.info = info;
        self.updates += 1;
    }
}
