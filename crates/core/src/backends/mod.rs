//! Reference service backends.
//!
//! Small implementations of the [`crate::services`] traits, enough to run
//! the pipeline end to end:
//!
//! - [`FsObjectStore`]: a directory acting as a bucket
//! - [`HttpJobService`]: JSON job API over HTTP
//! - [`HttpResultFetcher`]: plain HTTP download
//! - [`OutboxMailer`]: JSON envelopes dropped into a pickup directory

mod fs_store;
mod http_fetcher;
mod http_jobs;
mod outbox;

pub use fs_store::FsObjectStore;
pub use http_fetcher::HttpResultFetcher;
pub use http_jobs::HttpJobService;
pub use outbox::{OutboxEnvelope, OutboxMailer};

use std::time::Duration;

use crate::services::ServiceError;

/// Builds the HTTP client shared by every HTTP backend.
///
/// One client means one connection pool for all concurrent items.
pub fn build_http_client(timeout_secs: u32) -> Result<reqwest::Client, ServiceError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs as u64))
        .build()
        .map_err(|e| ServiceError::ConnectionFailed(format!("Failed to create HTTP client: {}", e)))
}

/// Turns a non-success response into an API error, keeping a short body excerpt.
async fn error_from_response(response: reqwest::Response) -> ServiceError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    ServiceError::api(status, body.chars().take(200).collect::<String>())
}
