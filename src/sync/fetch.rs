//! Subtitle download

use std::time::Duration;

use crate::error::{Result, SyncError};

/// Bounded-time HTTP client for subtitle sources
#[derive(Debug, Clone)]
pub struct SubtitleFetcher {
    client: reqwest::Client,
}

impl SubtitleFetcher {
    /// Create a fetcher whose requests are cancelled after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("subsync-server/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SyncError::Config(format!("HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Download a subtitle document as text
    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        let download_error = |reason: String| SyncError::Download {
            url: url.to_string(),
            reason,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| download_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(download_error(format!("HTTP {}", status)));
        }

        let text = response
            .text()
            .await
            .map_err(|e| download_error(e.to_string()))?;
        tracing::debug!(url = %url, bytes = text.len(), "Fetched subtitle");
        Ok(text)
    }
}
