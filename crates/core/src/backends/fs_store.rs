//! Directory-backed object store.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::FsStoreConfig;
use crate::services::{ObjectStore, ServiceError};

/// Stores objects as files under `<root>/<bucket>/<key>`.
///
/// Useful with network or FUSE-mounted buckets that the transcription
/// service can read directly.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    bucket_dir: PathBuf,
}

impl FsObjectStore {
    pub fn new(config: &FsStoreConfig, bucket: &str) -> Self {
        Self {
            bucket_dir: config.root.join(bucket),
        }
    }

    fn object_path(&self, key: &str) -> PathBuf {
        self.bucket_dir.join(key)
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    fn name(&self) -> &str {
        "filesystem"
    }

    async fn put(&self, key: &str, source: &Path) -> Result<(), ServiceError> {
        tokio::fs::create_dir_all(&self.bucket_dir).await?;
        let bytes = tokio::fs::copy(source, self.object_path(key)).await?;
        debug!(key, bytes, "Stored object");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), ServiceError> {
        match tokio::fs::remove_file(self.object_path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(ServiceError::NotFound(format!("object {}", key)))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn media_uri(&self, key: &str) -> String {
        format!("file://{}", self.object_path(key).display())
    }
}
