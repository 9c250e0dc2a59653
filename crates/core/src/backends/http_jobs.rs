//! Transcription jobs over a JSON HTTP API.
//!
//! Endpoints, relative to the configured base URL:
//! - `POST /jobs` with `{name, media_uri, language_code}`
//! - `GET /jobs/{name}`
//! - `DELETE /jobs/{name}`
//!
//! Submit and status calls answer with a [`JobHandle`] document.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::debug;

use crate::config::HttpJobConfig;
use crate::services::{JobHandle, JobService, ServiceError};

use super::{build_http_client, error_from_response};

#[derive(Debug, Serialize)]
struct SubmitJobRequest<'a> {
    name: &'a str,
    media_uri: &'a str,
    language_code: &'a str,
}

/// HTTP transcription job client.
pub struct HttpJobService {
    client: Client,
    config: HttpJobConfig,
}

impl HttpJobService {
    /// Create a client with its own connection pool.
    pub fn new(config: HttpJobConfig) -> Result<Self, ServiceError> {
        let client = build_http_client(config.timeout_secs)?;
        Ok(Self::with_client(config, client))
    }

    /// Create a client on top of a shared `reqwest::Client`.
    pub fn with_client(config: HttpJobConfig, client: Client) -> Self {
        Self { client, config }
    }

    /// Get the base URL without trailing slash.
    fn base_url(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    fn job_url(&self, job_name: &str) -> String {
        format!("{}/jobs/{}", self.base_url(), job_name)
    }

    async fn read_handle(
        &self,
        job_name: &str,
        response: reqwest::Response,
    ) -> Result<JobHandle, ServiceError> {
        match response.status() {
            status if status.is_success() => Ok(response.json::<JobHandle>().await?),
            StatusCode::NOT_FOUND => Err(ServiceError::NotFound(format!("job {}", job_name))),
            _ => Err(error_from_response(response).await),
        }
    }
}

#[async_trait]
impl JobService for HttpJobService {
    fn name(&self) -> &str {
        "http"
    }

    async fn submit(&self, job_name: &str, media_uri: &str) -> Result<JobHandle, ServiceError> {
        let url = format!("{}/jobs", self.base_url());
        let body = SubmitJobRequest {
            name: job_name,
            media_uri,
            language_code: &self.config.language_code,
        };

        let response = self.client.post(&url).json(&body).send().await?;
        let handle = self.read_handle(job_name, response).await?;
        debug!(job = %handle.name, status = %handle.status, "Job accepted");
        Ok(handle)
    }

    async fn status(&self, job_name: &str) -> Result<JobHandle, ServiceError> {
        let response = self.client.get(self.job_url(job_name)).send().await?;
        self.read_handle(job_name, response).await
    }

    async fn delete(&self, job_name: &str) -> Result<(), ServiceError> {
        let response = self.client.delete(self.job_url(job_name)).send().await?;
        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(ServiceError::NotFound(format!("job {}", job_name))),
            _ => Err(error_from_response(response).await),
        }
    }
}
