// Remote transcript source
//
// Reads transcripts from another streamview server's HTTP API. Any non-2xx
// response is a transport failure, except 404 on a single transcript, which
// maps to NotFound like the local store.

use super::{validate_filename, Transcript, TranscriptError, TranscriptSummary};
use anyhow::{Context, Result};
use reqwest::{StatusCode, Url};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct RemoteSource {
    client: reqwest::Client,
    base_url: Url,
}

impl RemoteSource {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid remote URL: {}", base_url))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("Remote URL cannot be used as a base: {}", base_url);
        }

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/api/logs[/{filename}]`, with the filename percent-encoded
    fn endpoint(&self, filename: Option<&str>) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| anyhow::anyhow!("Remote URL cannot be used as a base"))?;
            segments.pop_if_empty().extend(["api", "logs"]);
            if let Some(filename) = filename {
                segments.push(filename);
            }
        }
        Ok(url)
    }

    pub async fn list(&self) -> Result<Vec<TranscriptSummary>> {
        let url = self.endpoint(None)?;
        tracing::debug!("Listing remote transcripts from {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?
            .error_for_status()
            .with_context(|| format!("Remote list failed: {}", url))?;

        response
            .json::<Vec<TranscriptSummary>>()
            .await
            .with_context(|| format!("Invalid transcript list from {}", url))
    }

    pub async fn fetch(&self, filename: &str) -> Result<Transcript> {
        validate_filename(filename)?;
        let url = self.endpoint(Some(filename))?;
        tracing::debug!("Fetching remote transcript {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(TranscriptError::NotFound(filename.to_string()).into());
        }

        let response = response
            .error_for_status()
            .with_context(|| format!("Remote fetch failed: {}", url))?;

        response
            .json::<Transcript>()
            .await
            .with_context(|| format!("Invalid transcript from {}", url))
    }
}
