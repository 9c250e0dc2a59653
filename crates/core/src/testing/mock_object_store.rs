//! Mock object store for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::services::{ObjectStore, ServiceError};

/// Mock implementation of the ObjectStore trait.
///
/// - Records uploads and deletions
/// - Fails uploads or deletions for chosen keys
/// - Simulates latency
#[derive(Debug, Clone)]
pub struct MockObjectStore {
    puts: Arc<RwLock<Vec<(String, PathBuf)>>>,
    deletes: Arc<RwLock<Vec<String>>>,
    failing_puts: Arc<RwLock<HashSet<String>>>,
    failing_deletes: Arc<RwLock<HashSet<String>>>,
    panicking_puts: Arc<RwLock<HashSet<String>>>,
    latency_ms: Arc<RwLock<u64>>,
}

impl Default for MockObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockObjectStore {
    pub fn new() -> Self {
        Self {
            puts: Arc::new(RwLock::new(Vec::new())),
            deletes: Arc::new(RwLock::new(Vec::new())),
            failing_puts: Arc::new(RwLock::new(HashSet::new())),
            failing_deletes: Arc::new(RwLock::new(HashSet::new())),
            panicking_puts: Arc::new(RwLock::new(HashSet::new())),
            latency_ms: Arc::new(RwLock::new(0)),
        }
    }

    /// Keys uploaded so far, in call order.
    pub async fn uploaded_keys(&self) -> Vec<String> {
        self.puts.read().await.iter().map(|(k, _)| k.clone()).collect()
    }

    /// Keys deleted so far, in call order.
    pub async fn deleted_keys(&self) -> Vec<String> {
        self.deletes.read().await.clone()
    }

    /// Number of delete calls for `key`.
    pub async fn delete_count(&self, key: &str) -> usize {
        self.deletes.read().await.iter().filter(|k| *k == key).count()
    }

    /// Make uploads of `key` fail.
    pub async fn fail_put(&self, key: &str) {
        self.failing_puts.write().await.insert(key.to_string());
    }

    /// Make deletions of `key` fail.
    pub async fn fail_delete(&self, key: &str) {
        self.failing_deletes.write().await.insert(key.to_string());
    }

    /// Make uploads of `key` panic.
    pub async fn panic_put(&self, key: &str) {
        self.panicking_puts.write().await.insert(key.to_string());
    }

    /// Set the simulated duration of every call.
    pub async fn set_latency(&self, latency: Duration) {
        *self.latency_ms.write().await = latency.as_millis() as u64;
    }

    async fn simulate_latency(&self) {
        let ms = *self.latency_ms.read().await;
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }
}

#[async_trait]
impl ObjectStore for MockObjectStore {
    fn name(&self) -> &str {
        "mock"
    }

    async fn put(&self, key: &str, source: &Path) -> Result<(), ServiceError> {
        self.simulate_latency().await;
        let panics = self.panicking_puts.read().await.contains(key);
        if panics {
            panic!("upload of {} crashed", key);
        }
        if self.failing_puts.read().await.contains(key) {
            return Err(ServiceError::api(500, format!("upload of {} rejected", key)));
        }
        self.puts
            .write()
            .await
            .push((key.to_string(), source.to_path_buf()));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), ServiceError> {
        self.simulate_latency().await;
        self.deletes.write().await.push(key.to_string());
        if self.failing_deletes.read().await.contains(key) {
            return Err(ServiceError::api(500, format!("delete of {} rejected", key)));
        }
        Ok(())
    }

    fn media_uri(&self, key: &str) -> String {
        format!("mock://bucket/{}", key)
    }
}
