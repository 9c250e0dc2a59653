//! Errors that stop a single work item.

use thiserror::Error;

use crate::services::ServiceError;
use crate::transcript::TranscriptError;

/// A failure fatal to one item. Other items are never affected.
#[derive(Debug, Error)]
pub enum ItemError {
    #[error("Upload failed: {0}")]
    Upload(#[source] ServiceError),

    #[error("Could not start transcription: {0}")]
    Submit(#[source] ServiceError),

    #[error("Could not check transcription status: {0}")]
    StatusCheck(#[source] ServiceError),

    #[error("Job {0} completed without a transcript location")]
    MissingTranscriptUri(String),

    #[error("Could not download transcript: {0}")]
    Fetch(#[source] ServiceError),

    #[error("Could not read transcript: {0}")]
    Parse(#[from] TranscriptError),

    #[error("Could not send email: {0}")]
    Send(#[source] ServiceError),

    #[error("Processing task aborted: {0}")]
    Aborted(String),
}
