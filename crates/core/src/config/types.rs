use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::item::Recipient;
use crate::pipeline::PipelineConfig;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub source: SourceConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    pub storage: StorageConfig,
    pub transcription: TranscriptionConfig,
    pub mail: MailConfig,
}

/// Where recordings are found and who receives them
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    /// Directory the recorder is mounted at
    pub root: PathBuf,
    /// File extension of recordings, matched case-sensitively
    #[serde(default = "default_extension")]
    pub extension: String,
    /// Folders to scan, in order
    #[serde(default)]
    pub folders: Vec<FolderConfig>,
}

fn default_extension() -> String {
    "MP3".to_string()
}

/// One recorder folder and the recipients of its recordings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FolderConfig {
    /// Path relative to `source.root`
    pub path: PathBuf,
    pub recipients: Vec<Recipient>,
}

/// Object storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Bucket recordings are staged in
    pub bucket: String,
    /// Filesystem-specific configuration (required when backend = "filesystem")
    #[serde(default)]
    pub filesystem: Option<FsStoreConfig>,
}

/// Available object storage backends
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    Filesystem,
    // Future: S3
}

/// Directory-backed object storage
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FsStoreConfig {
    /// Directory holding one subdirectory per bucket
    pub root: PathBuf,
}

/// Transcription service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TranscriptionConfig {
    pub backend: TranscriptionBackend,
    /// HTTP job API configuration (required when backend = "http")
    #[serde(default)]
    pub http: Option<HttpJobConfig>,
}

/// Available transcription backends
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptionBackend {
    Http,
}

/// HTTP transcription job API
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpJobConfig {
    /// Base URL (e.g., "http://localhost:9000")
    pub url: String,
    /// Spoken language of the recordings
    #[serde(default = "default_language_code")]
    pub language_code: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_language_code() -> String {
    "en-GB".to_string()
}

fn default_timeout() -> u32 {
    30
}

/// Mail delivery configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MailConfig {
    pub backend: MailBackend,
    /// Sender address
    pub from: Recipient,
    /// Outbox-specific configuration (required when backend = "outbox")
    #[serde(default)]
    pub outbox: Option<OutboxConfig>,
}

/// Available mail backends
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MailBackend {
    Outbox,
    // Future: Smtp
}

/// Pickup directory read by an external mail transfer agent
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutboxConfig {
    pub dir: PathBuf,
}
