use crate::Result;
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// What the ranking collaborator gets to see for one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostData {
    pub post_text: String,
    pub timestamp: Option<String>,
}

/// Posts keyed by target url, in the order the targets were given.
///
/// Rankers that walk the posts see them in input order, so "first match"
/// means the same target the pipeline credits as the source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostsByUrl {
    entries: Vec<(String, PostData)>,
}

impl PostsByUrl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a post, replacing an earlier one for the same url in place.
    pub fn insert(&mut self, url: impl Into<String>, post: PostData) {
        let url = url.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == url) {
            Some((_, slot)) => *slot = post,
            None => self.entries.push((url, post)),
        }
    }

    pub fn get(&self, url: &str) -> Option<&PostData> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == url)
            .map(|(_, post)| post)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PostData)> {
        self.entries.iter().map(|(url, post)| (url.as_str(), post))
    }

    /// First url in input order.
    pub fn first_url(&self) -> Option<&str> {
        self.entries.first().map(|(url, _)| url.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, PostData)> for PostsByUrl {
    fn from_iter<I: IntoIterator<Item = (K, PostData)>>(iter: I) -> Self {
        let mut posts = Self::new();
        for (url, post) in iter {
            posts.insert(url, post);
        }
        posts
    }
}

/// Serialized as a JSON object whose keys keep input order.
impl Serialize for PostsByUrl {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (url, post) in &self.entries {
            map.serialize_entry(url, post)?;
        }
        map.end()
    }
}

/// Picks the most relevant rate out of the gathered posts.
///
/// The returned string is an opaque label; the pipeline never parses it.
#[async_trait]
pub trait Ranker: Send + Sync {
    async fn rank(&self, posts: &PostsByUrl, prompt: &str) -> Result<String>;
}

lazy_static! {
    static ref LYD_RATE: Regex = Regex::new(r"(\d+\.\d{2})\s*LYD").unwrap();
}

/// Label returned by [`PatternRanker`] when no post mentions a rate.
pub const NO_RATE_LABEL: &str = "N/A LYD (Mock)";

/// Local ranker that takes the first `<d>.<dd> LYD` figure it finds.
#[derive(Debug, Default, Clone, Copy)]
pub struct PatternRanker;

#[async_trait]
impl Ranker for PatternRanker {
    async fn rank(&self, posts: &PostsByUrl, prompt: &str) -> Result<String> {
        tracing::debug!("Pattern ranking {} posts (prompt: {})", posts.len(), prompt);

        let found = posts.iter().find_map(|(url, post)| {
            LYD_RATE.captures(&post.post_text).map(|caps| {
                tracing::debug!("Rate pattern matched in post from {}", url);
                format!("{} LYD", &caps[1])
            })
        });

        Ok(found.unwrap_or_else(|| NO_RATE_LABEL.to_string()))
    }
}
