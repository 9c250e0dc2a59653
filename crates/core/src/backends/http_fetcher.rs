//! Plain HTTP download of transcript documents.

use async_trait::async_trait;
use reqwest::Client;

use crate::services::{ResultFetcher, ServiceError};

use super::{build_http_client, error_from_response};

/// Downloads documents with a GET request.
#[derive(Clone)]
pub struct HttpResultFetcher {
    client: Client,
}

impl HttpResultFetcher {
    pub fn new(timeout_secs: u32) -> Result<Self, ServiceError> {
        Ok(Self::with_client(build_http_client(timeout_secs)?))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResultFetcher for HttpResultFetcher {
    async fn fetch(&self, uri: &str) -> Result<Vec<u8>, ServiceError> {
        let response = self.client.get(uri).send().await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        Ok(response.bytes().await?.to_vec())
    }
}
