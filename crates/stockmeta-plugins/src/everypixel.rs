//! Everypixel keywording API client

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use stockmeta_core::constants::{TAGGING_NUM_KEYWORDS, TAGGING_THRESHOLD, TAGGING_TIMEOUT_SECS};
use stockmeta_core::{AppConfig, AppError, AppResult, MediaAsset};
use tracing::debug;

use crate::http::{check_status, read_body, transport_error};
use crate::services::TaggingService;

const SERVICE: &str = "everypixel";

pub struct EverypixelClient {
    http_client: reqwest::Client,
    base_url: String,
    client_id: String,
    client_secret: String,
}

impl Debug for EverypixelClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("EverypixelClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct KeywordsResponse {
    #[serde(default)]
    keywords: Vec<TaggedKeyword>,
}

// Entries also carry a confidence score; the service already applied the threshold.
#[derive(Debug, Deserialize)]
struct TaggedKeyword {
    keyword: String,
}

impl EverypixelClient {
    pub fn new(config: &AppConfig, client_id: &str, client_secret: &str) -> AppResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(TAGGING_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                AppError::Config(format!("Failed to create HTTP client for Everypixel: {}", e))
            })?;

        Ok(Self {
            http_client,
            base_url: config.everypixel_base_url.trim_end_matches('/').to_string(),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
        })
    }
}

#[async_trait]
impl TaggingService for EverypixelClient {
    async fn keywords(&self, asset: &MediaAsset) -> AppResult<Vec<String>> {
        let data = tokio::fs::read(asset.path())
            .await
            .map_err(|e| AppError::Media(format!("Cannot read {}: {}", asset, e)))?;
        let part = Part::bytes(data).file_name(asset.file_name());
        let form = Form::new().part("data", part);

        let response = self
            .http_client
            .post(format!("{}/v1/keywords", self.base_url))
            .query(&[
                ("num_keywords", TAGGING_NUM_KEYWORDS.to_string()),
                ("threshold", TAGGING_THRESHOLD.to_string()),
            ])
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .multipart(form)
            .send()
            .await
            .map_err(|e| transport_error(SERVICE, e))?;

        let response = check_status(SERVICE, response).await?;
        let body = read_body(SERVICE, response).await?;
        let parsed: KeywordsResponse = serde_json::from_str(&body)
            .map_err(|e| AppError::Parse(format!("Unexpected Everypixel response: {}", e)))?;

        let keywords: Vec<String> = parsed.keywords.into_iter().map(|k| k.keyword).collect();
        debug!(path = %asset, count = keywords.len(), "Everypixel keywords received");
        Ok(keywords)
    }
}
