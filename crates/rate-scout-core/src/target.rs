use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

/// An absolute http(s) URL to scrape.
///
/// Construction is the only validation point: a `ScrapeTarget` that exists is
/// always navigable, so malformed input is rejected before a browser is involved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ScrapeTarget(Url);

impl ScrapeTarget {
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let url = Url::parse(trimmed).map_err(|e| Error::InvalidTarget {
            input: input.to_string(),
            reason: e.to_string(),
        })?;

        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(Error::InvalidTarget {
                    input: input.to_string(),
                    reason: format!("unsupported scheme '{}', expected http or https", other),
                });
            }
        }

        if url.host_str().is_none_or(str::is_empty) {
            return Err(Error::InvalidTarget {
                input: input.to_string(),
                reason: "missing host".to_string(),
            });
        }

        Ok(Self(url))
    }

    pub fn url(&self) -> &Url {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ScrapeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl FromStr for ScrapeTarget {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for ScrapeTarget {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Self::parse(value)
    }
}

impl TryFrom<String> for ScrapeTarget {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<ScrapeTarget> for String {
    fn from(target: ScrapeTarget) -> Self {
        target.0.into()
    }
}
