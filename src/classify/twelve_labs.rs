use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use super::{ClassificationMatch, Classifier, VISUAL_OPTION};
use crate::config::Config;
use crate::error::{ClassifierError, Result};
use crate::taxonomy::Category;

/// Classifier backed by the Twelve Labs classify endpoint
pub struct TwelveLabsClassifier {
    config: Config,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
pub(crate) struct ClassifyRequest<'a> {
    pub index_id: &'a str,
    pub options: [&'static str; 1],
    pub classes: &'a [Category],
    pub include_clips: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ClassifyResponse {
    #[serde(default)]
    pub data: Vec<ClassificationMatch>,
    #[serde(default)]
    pub page_info: Option<PageInfo>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PageInfo {
    #[serde(default)]
    pub total_results: Option<u64>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

impl TwelveLabsClassifier {
    pub fn new(config: Config) -> Result<Self> {
        config.api_key()?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.service.timeout_seconds))
            .build()
            .map_err(|e| ClassifierError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl Classifier for TwelveLabsClassifier {
    async fn classify(
        &self,
        index_id: &str,
        categories: &[Category],
        include_clips: bool,
    ) -> Result<Vec<ClassificationMatch>> {
        let api_key = self.config.api_key()?;
        let url = self.config.service.endpoint(&["classify"])?;

        let request = ClassifyRequest {
            index_id,
            options: [VISUAL_OPTION],
            classes: categories,
            include_clips,
        };

        info!(
            "🎬 Classifying index {} against {} categories",
            index_id,
            categories.len()
        );
        debug!("Sending classify request to {}", url);

        let response = self
            .client
            .post(url)
            .header("x-api-key", api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ClassifierError::Service(format!(
                "classify API error {}: {}",
                status, text
            )));
        }

        let body: ClassifyResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::Service(format!("undecodable classify response: {}", e)))?;

        if let Some(page_info) = &body.page_info {
            debug!(
                "Classify page info: total_results={:?}, more_pages={}",
                page_info.total_results,
                page_info.next_page_token.is_some()
            );
        }

        info!("✅ Classifier returned {} matching videos", body.data.len());
        Ok(body.data)
    }
}
