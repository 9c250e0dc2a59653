//! Value types exchanged with the remote services.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::item::Recipient;

/// Status of a remote transcription job.
///
/// Unknown values are kept verbatim and treated as terminal failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    Queued,
    InProgress,
    Completed,
    Failed,
    Other(String),
}

impl JobStatus {
    /// Wire representation.
    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Queued => "QUEUED",
            JobStatus::InProgress => "IN_PROGRESS",
            JobStatus::Completed => "COMPLETED",
            JobStatus::Failed => "FAILED",
            JobStatus::Other(s) => s,
        }
    }

    /// Whether the job will no longer change state.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Queued | JobStatus::InProgress)
    }

    /// Whether this is the single recognized success value.
    pub fn is_success(&self) -> bool {
        matches!(self, JobStatus::Completed)
    }
}

impl From<&str> for JobStatus {
    fn from(s: &str) -> Self {
        match s {
            "QUEUED" => JobStatus::Queued,
            "IN_PROGRESS" => JobStatus::InProgress,
            "COMPLETED" => JobStatus::Completed,
            "FAILED" => JobStatus::Failed,
            other => JobStatus::Other(other.to_string()),
        }
    }
}

impl From<String> for JobStatus {
    fn from(s: String) -> Self {
        JobStatus::from(s.as_str())
    }
}

impl From<JobStatus> for String {
    fn from(status: JobStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of a remote job as returned by submit and status calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobHandle {
    /// Job name (unique per recording).
    pub name: String,
    /// Current status.
    pub status: JobStatus,
    /// Where the transcript document can be downloaded once completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript_uri: Option<String>,
    /// Service-provided reason when the job failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl JobHandle {
    /// Creates a handle with no transcript location.
    pub fn new(name: impl Into<String>, status: JobStatus) -> Self {
        Self {
            name: name.into(),
            status,
            transcript_uri: None,
            failure_reason: None,
        }
    }

    /// Sets the transcript location.
    pub fn with_transcript_uri(mut self, uri: impl Into<String>) -> Self {
        self.transcript_uri = Some(uri.into());
        self
    }

    /// Sets the failure reason.
    pub fn with_failure_reason(mut self, reason: impl Into<String>) -> Self {
        self.failure_reason = Some(reason.into());
        self
    }
}

/// A message handed to the [`Mailer`](super::Mailer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutgoingMail {
    pub recipients: Vec<Recipient>,
    pub subject: String,
    pub body: String,
    /// File attached to the message.
    pub attachment: PathBuf,
}
