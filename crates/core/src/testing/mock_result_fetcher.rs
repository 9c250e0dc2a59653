//! Mock transcript downloader for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::fixtures::transcript_body;
use crate::services::{ResultFetcher, ServiceError};

/// Mock implementation of the ResultFetcher trait.
///
/// Unknown URIs answer with a valid document whose transcript is
/// `"transcript of <uri>"`.
#[derive(Debug, Clone, Default)]
pub struct MockResultFetcher {
    bodies: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    failing: Arc<RwLock<HashSet<String>>>,
    fetches: Arc<RwLock<Vec<String>>>,
}

impl MockResultFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the raw body returned for a URI.
    pub async fn set_body(&self, uri: &str, body: impl Into<Vec<u8>>) {
        self.bodies.write().await.insert(uri.to_string(), body.into());
    }

    /// Make downloads of a URI fail.
    pub async fn fail(&self, uri: &str) {
        self.failing.write().await.insert(uri.to_string());
    }

    /// URIs fetched so far, in call order.
    pub async fn fetched(&self) -> Vec<String> {
        self.fetches.read().await.clone()
    }
}

#[async_trait]
impl ResultFetcher for MockResultFetcher {
    async fn fetch(&self, uri: &str) -> Result<Vec<u8>, ServiceError> {
        self.fetches.write().await.push(uri.to_string());
        if self.failing.read().await.contains(uri) {
            return Err(ServiceError::api(403, "access denied"));
        }
        Ok(match self.bodies.read().await.get(uri) {
            Some(body) => body.clone(),
            None => transcript_body(&format!("transcript of {}", uri)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::parse_transcript;
    use tokio_test::assert_err;

    #[tokio::test]
    async fn test_default_and_scripted_bodies() {
        let fetcher = MockResultFetcher::new();
        fetcher.set_body("mock://b", "not json").await;
        fetcher.fail("mock://c").await;

        let body = fetcher.fetch("mock://a").await.unwrap();
        assert_eq!(parse_transcript(&body).unwrap(), "transcript of mock://a");
        assert_eq!(fetcher.fetch("mock://b").await.unwrap(), b"not json");
        assert_err!(fetcher.fetch("mock://c").await);

        assert_eq!(fetcher.fetched().await, vec!["mock://a", "mock://b", "mock://c"]);
    }
}
