//! Testing utilities and mock implementations of the service traits.
//!
//! Every mock records what it was asked to do and can be told to fail for a
//! specific key or job name, so a single item of a batch can be broken while
//! the others run normally.
//!
//! # Example
//!
//! ```rust,ignore
//! use dictaphone_core::testing::{MockJobService, MockObjectStore};
//!
//! let jobs = MockJobService::new();
//! jobs.set_script("dictaphone-to-email-k1", vec![JobStatus::InProgress, JobStatus::Failed]).await;
//!
//! let store = MockObjectStore::new();
//! store.fail_put("k2").await;
//! ```

mod mock_job_service;
mod mock_mailer;
mod mock_object_store;
mod mock_result_fetcher;
mod recording_reporter;

pub use mock_job_service::MockJobService;
pub use mock_mailer::{MockMailer, SentMail};
pub use mock_object_store::MockObjectStore;
pub use mock_result_fetcher::MockResultFetcher;
pub use recording_reporter::RecordingReporter;

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::{Path, PathBuf};

    use crate::item::{Recipient, WorkItem};

    /// A transcript document holding `text`.
    pub fn transcript_body(text: &str) -> Vec<u8> {
        serde_json::json!({
            "results": { "transcripts": [{ "transcript": text }] }
        })
        .to_string()
        .into_bytes()
    }

    /// Writes a fake recording into `dir`.
    pub fn recording(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, vec![0u8; 1536]).expect("Failed to write recording");
        path
    }

    /// A work item with a predictable remote key.
    pub fn item(path: impl Into<PathBuf>, remote_key: &str) -> WorkItem {
        WorkItem::new(path, vec![Recipient::new("home@example.com").with_name("Home")])
            .with_remote_key(remote_key)
    }
}
