//! Groq chat-completions client (OpenAI-compatible API)

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use stockmeta_core::constants::{TEXT_TIMEOUT_SECS, VISION_TIMEOUT_SECS};
use stockmeta_core::{AppConfig, AppError, AppResult};
use stockmeta_processing::EncodedPreview;
use tracing::debug;

use crate::http::{check_status, read_body, transport_error};
use crate::services::CompletionService;

const SERVICE: &str = "groq";

pub struct GroqClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
    vision_model: String,
    text_model: String,
}

impl Debug for GroqClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("GroqClient")
            .field("base_url", &self.base_url)
            .field("vision_model", &self.vision_model)
            .field("text_model", &self.text_model)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: MessageContent<'a>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent<'a> {
    Text(&'a str),
    Parts(Vec<ContentPart<'a>>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    ImageUrl { image_url: ImageUrl },
    Text { text: &'a str },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl GroqClient {
    pub fn new(config: &AppConfig, api_key: impl Into<String>) -> AppResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(AppError::Config(
                "Groq API key is required; set it with `stockmeta settings set groq_api_key <key>`"
                    .to_string(),
            ));
        }

        let http_client = reqwest::Client::builder()
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client for Groq: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: config.groq_base_url.trim_end_matches('/').to_string(),
            api_key: api_key.trim().to_string(),
            vision_model: config.vision_model.clone(),
            text_model: config.text_model.clone(),
        })
    }

    async fn complete(&self, request: &ChatRequest<'_>, timeout: Duration) -> AppResult<String> {
        let started = std::time::Instant::now();
        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| transport_error(SERVICE, e))?;

        let response = check_status(SERVICE, response).await?;
        let body = read_body(SERVICE, response).await?;
        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| AppError::Parse(format!("Unexpected Groq response envelope: {}", e)))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AppError::Parse("Groq response contained no choices".to_string()))?;

        debug!(
            model = request.model,
            duration_ms = started.elapsed().as_millis() as u64,
            "Groq completion received"
        );
        Ok(content.trim().to_string())
    }
}

#[async_trait]
impl CompletionService for GroqClient {
    async fn vision(&self, preview: &EncodedPreview, prompt: &str, max_tokens: u32) -> AppResult<String> {
        let request = ChatRequest {
            model: &self.vision_model,
            messages: vec![ChatMessage {
                role: "user",
                content: MessageContent::Parts(vec![
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: preview.data_url(),
                        },
                    },
                    ContentPart::Text { text: prompt },
                ]),
            }],
            max_tokens,
        };
        self.complete(&request, Duration::from_secs(VISION_TIMEOUT_SECS))
            .await
    }

    async fn text(&self, prompt: &str, max_tokens: u32) -> AppResult<String> {
        let request = ChatRequest {
            model: &self.text_model,
            messages: vec![ChatMessage {
                role: "user",
                content: MessageContent::Text(prompt),
            }],
            max_tokens,
        };
        self.complete(&request, Duration::from_secs(TEXT_TIMEOUT_SECS))
            .await
    }
}
