//! Trait definitions for the remote services.

use async_trait::async_trait;
use std::path::Path;

use super::error::ServiceError;
use super::types::{JobHandle, OutgoingMail};

/// Object storage used to stage recordings for transcription.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Returns the name of this implementation.
    fn name(&self) -> &str;

    /// Uploads the file at `source` under `key`.
    async fn put(&self, key: &str, source: &Path) -> Result<(), ServiceError>;

    /// Deletes the object stored under `key`.
    async fn delete(&self, key: &str) -> Result<(), ServiceError>;

    /// URI the job service should read the object from.
    fn media_uri(&self, key: &str) -> String;
}

/// Service running long-lived transcription jobs.
#[async_trait]
pub trait JobService: Send + Sync {
    /// Returns the name of this implementation.
    fn name(&self) -> &str;

    /// Starts a job named `job_name` transcribing the media at `media_uri`.
    async fn submit(&self, job_name: &str, media_uri: &str) -> Result<JobHandle, ServiceError>;

    /// Fetches the current state of a job.
    async fn status(&self, job_name: &str) -> Result<JobHandle, ServiceError>;

    /// Deletes a job and its stored output.
    async fn delete(&self, job_name: &str) -> Result<(), ServiceError>;
}

/// Downloads the transcript document of a finished job.
#[async_trait]
pub trait ResultFetcher: Send + Sync {
    /// Returns the raw document body.
    async fn fetch(&self, uri: &str) -> Result<Vec<u8>, ServiceError>;
}

/// Delivers the final message.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Returns the name of this implementation.
    fn name(&self) -> &str;

    /// Sends a message.
    async fn send(&self, mail: &OutgoingMail) -> Result<(), ServiceError>;
}
