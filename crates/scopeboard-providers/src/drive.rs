//! Google Drive API client.
//!
//! Only a single listing call is exposed; the response JSON is handed
//! back verbatim.

use std::time::Duration;

use tracing::debug;

use crate::error::{ProviderError, ProviderResult};

/// Google Drive API client bound to one access token.
#[derive(Debug)]
pub struct DriveClient {
    http_client: reqwest::Client,
    access_token: String,
    base_url: String,
}

impl DriveClient {
    /// Creates a new Drive client.
    pub fn new(
        access_token: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> ProviderResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::configuration(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            access_token: access_token.into(),
            base_url: base_url.into(),
        })
    }

    /// Lists the user's files.
    ///
    /// The file-listing response is returned as raw JSON.
    pub async fn list_files(&self) -> ProviderResult<serde_json::Value> {
        let url = format!("{}/files", self.base_url);

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| ProviderError::network(format!("request failed: {}", e)))?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ProviderError::authentication(
                "access token expired or invalid",
            ));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::api(format!(
                "API error ({}): {}",
                status, body
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::network(format!("failed to read response: {}", e)))?;

        let files = serde_json::from_str(&body)
            .map_err(|e| ProviderError::invalid_response(format!("failed to parse response: {}", e)))?;

        debug!("fetched drive file listing");
        Ok(files)
    }
}
