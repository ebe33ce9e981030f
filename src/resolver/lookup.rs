use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{StreamResult, VideoLookup};
use crate::config::Config;
use crate::error::{ClassifierError, ResolveFailure, Result};

/// Per-video metadata lookup against the Twelve Labs index API
pub struct TwelveLabsVideoLookup {
    config: Config,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct VideoMetadataResponse {
    #[serde(default)]
    hls: Option<HlsInfo>,
}

#[derive(Debug, Deserialize)]
struct HlsInfo {
    #[serde(default)]
    video_url: Option<String>,
}

impl TwelveLabsVideoLookup {
    pub fn new(config: Config) -> Result<Self> {
        config.api_key()?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.service.timeout_seconds))
            .build()
            .map_err(|e| ClassifierError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }
}

/// Pull `hls.video_url` out of a metadata body
fn extract_stream_url(body: &str) -> StreamResult {
    let metadata: VideoMetadataResponse =
        serde_json::from_str(body).map_err(|e| ResolveFailure::Malformed(e.to_string()))?;

    metadata
        .hls
        .and_then(|hls| hls.video_url)
        .filter(|url| !url.is_empty())
        .ok_or(ResolveFailure::MissingUrl)
}

#[async_trait]
impl VideoLookup for TwelveLabsVideoLookup {
    async fn stream_url(&self, index_id: &str, video_id: &str) -> StreamResult {
        let api_key = self
            .config
            .api_key()
            .map_err(|e| ResolveFailure::Transport(e.to_string()))?;
        let url = self
            .config
            .service
            .endpoint(&["indexes", index_id, "videos", video_id])
            .map_err(|e| ResolveFailure::Transport(e.to_string()))?;

        debug!("Fetching video metadata from {}", url);

        let response = self
            .client
            .get(url)
            .header("x-api-key", api_key)
            .send()
            .await
            .map_err(|e| ResolveFailure::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolveFailure::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ResolveFailure::Transport(e.to_string()))?;

        extract_stream_url(&body)
    }
}
