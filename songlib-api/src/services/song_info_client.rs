//! Song-info provider client
//!
//! Resolves release date, lyrics and link for a (group, song) pair before the
//! song is first stored. One request per call, no retries.

use serde::Serialize;
use songlib_common::models::SongDetail;
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = concat!("songlib/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum SongInfoError {
    /// Transport failure or non-success status
    #[error("Failed to fetch song info: {0}")]
    FetchFailed(String),

    /// Body is not a valid song detail document
    #[error("Failed to parse song info: {0}")]
    ParseFailed(String),
}

#[derive(Serialize)]
struct SongInfoQuery<'a> {
    group: &'a str,
    song: &'a str,
}

/// Song-info provider client
pub struct SongInfoClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl SongInfoClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SongInfoError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| SongInfoError::FetchFailed(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch details for `song` by `group`; both are URL-escaped as query parameters
    pub async fn fetch(&self, group: &str, song: &str) -> Result<SongDetail, SongInfoError> {
        tracing::debug!(group = %group, song = %song, url = %self.base_url, "Querying song info provider");

        let response = self
            .http_client
            .get(&self.base_url)
            .query(&SongInfoQuery { group, song })
            .send()
            .await
            .map_err(|e| SongInfoError::FetchFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SongInfoError::FetchFailed(format!(
                "provider returned {}: {}",
                status, error_text
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| SongInfoError::FetchFailed(e.to_string()))?;

        let detail: SongDetail = serde_json::from_slice(&body)
            .map_err(|e| SongInfoError::ParseFailed(e.to_string()))?;

        tracing::info!(
            group = %group,
            song = %song,
            release_date = %detail.release_date,
            "Retrieved song info"
        );

        Ok(detail)
    }
}
