//! Work items: one recording carried through the pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::services::JobStatus;

/// Position of an item in its lifecycle.
///
/// Variants are ordered; an item's stage never decreases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Pending,
    Uploading,
    SubmittingJob,
    AwaitingJob,
    FetchingResult,
    CleaningUp,
    ReadyToFinalize,
    Sending,
    Finished,
}

impl Stage {
    /// Total number of stages.
    pub const COUNT: u8 = 9;

    /// 1-based stage number.
    pub fn number(self) -> u8 {
        match self {
            Stage::Pending => 1,
            Stage::Uploading => 2,
            Stage::SubmittingJob => 3,
            Stage::AwaitingJob => 4,
            Stage::FetchingResult => 5,
            Stage::CleaningUp => 6,
            Stage::ReadyToFinalize => 7,
            Stage::Sending => 8,
            Stage::Finished => 9,
        }
    }

    /// Whether `self -> next` is an edge of the lifecycle.
    ///
    /// `AwaitingJob -> AwaitingJob` is the polling self-loop and
    /// `AwaitingJob -> CleaningUp` the shortcut taken when the job does not
    /// complete successfully.
    pub fn can_transition_to(self, next: Stage) -> bool {
        use Stage::*;
        matches!(
            (self, next),
            (Pending, Uploading)
                | (Uploading, SubmittingJob)
                | (SubmittingJob, AwaitingJob)
                | (AwaitingJob, AwaitingJob)
                | (AwaitingJob, FetchingResult)
                | (AwaitingJob, CleaningUp)
                | (FetchingResult, CleaningUp)
                | (CleaningUp, ReadyToFinalize)
                | (ReadyToFinalize, Sending)
                | (Sending, Finished)
        )
    }

    /// Stages driven by the concurrent phase, i.e. the ones that hold a
    /// concurrency slot.
    pub fn is_processing(self) -> bool {
        matches!(
            self,
            Stage::Uploading
                | Stage::SubmittingJob
                | Stage::AwaitingJob
                | Stage::FetchingResult
                | Stage::CleaningUp
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Pending => "pending",
            Stage::Uploading => "uploading",
            Stage::SubmittingJob => "submitting_job",
            Stage::AwaitingJob => "awaiting_job",
            Stage::FetchingResult => "fetching_result",
            Stage::CleaningUp => "cleaning_up",
            Stage::ReadyToFinalize => "ready_to_finalize",
            Stage::Sending => "sending",
            Stage::Finished => "finished",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A delivery address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Recipient {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} <{}>", name, self.email),
            None => f.write_str(&self.email),
        }
    }
}

/// Marker left on an item whose remote job ended without success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobFailure {
    pub status: JobStatus,
    pub reason: Option<String>,
}

/// A failure that stopped an item for good.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFault {
    /// Stage the item was in when it failed.
    pub stage: Stage,
    pub error: String,
}

/// One recording and everything the pipeline learns about it.
///
/// An item is owned by exactly one task at a time: its processing chain
/// during the concurrent phase, then the coordinator during finalization.
#[derive(Debug, Clone)]
pub struct WorkItem {
    id: String,
    source: PathBuf,
    file_name: String,
    remote_key: String,
    recipients: Vec<Recipient>,
    stage: Stage,
    transcript: Option<String>,
    job_failure: Option<JobFailure>,
    fault: Option<ItemFault>,
}

impl WorkItem {
    /// Creates a pending item for the recording at `source`.
    ///
    /// A fresh random remote key is generated for the item.
    pub fn new(source: impl Into<PathBuf>, recipients: Vec<Recipient>) -> Self {
        let source = source.into();
        let file_name = source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| source.display().to_string());

        Self {
            id: source.display().to_string(),
            source,
            file_name,
            remote_key: Uuid::new_v4().simple().to_string(),
            recipients,
            stage: Stage::Pending,
            transcript: None,
            job_failure: None,
            fault: None,
        }
    }

    /// Replaces the generated remote key.
    pub fn with_remote_key(mut self, key: impl Into<String>) -> Self {
        self.remote_key = key.into();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Namespace for every remote resource created for this item.
    pub fn remote_key(&self) -> &str {
        &self.remote_key
    }

    pub fn recipients(&self) -> &[Recipient] {
        &self.recipients
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn transcript(&self) -> Option<&str> {
        self.transcript.as_deref()
    }

    pub fn job_failure(&self) -> Option<&JobFailure> {
        self.job_failure.as_ref()
    }

    pub fn fault(&self) -> Option<&ItemFault> {
        self.fault.as_ref()
    }

    /// Whether the item is waiting for the sequential phase.
    pub fn is_ready_to_finalize(&self) -> bool {
        self.stage == Stage::ReadyToFinalize && self.fault.is_none()
    }

    pub(crate) fn enter(&mut self, next: Stage) {
        debug_assert!(
            self.stage.can_transition_to(next),
            "illegal transition {} -> {}",
            self.stage,
            next
        );
        self.stage = next;
    }

    pub(crate) fn set_transcript(&mut self, text: String) {
        debug_assert!(self.transcript.is_none(), "transcript set twice");
        self.transcript = Some(text);
    }

    pub(crate) fn mark_job_failed(&mut self, status: JobStatus, reason: Option<String>) {
        self.job_failure = Some(JobFailure { status, reason });
    }

    pub(crate) fn mark_faulted(&mut self, error: impl fmt::Display) {
        self.fault = Some(ItemFault {
            stage: self.stage,
            error: error.to_string(),
        });
    }
}
