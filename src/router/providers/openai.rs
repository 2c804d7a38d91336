//! OpenAI direct API adapters: chat completions and image generation.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::base::send_chat;
use super::traits::ProviderAdapter;
use crate::router::request::CompletionRequest;
use crate::types::{CompletionResponse, Role, TokenUsage};
use crate::{Error, Result};

const BASE_URL: &str = "https://api.openai.com";

/// Strip the vendor-path prefix used for routing; OpenAI's own API expects
/// the bare model id.
fn native_model(model: &str) -> &str {
    model.strip_prefix("openai/").unwrap_or(model)
}

#[derive(Debug)]
pub struct OpenAiAdapter {
    api_key: String,
    base_url: String,
}

impl OpenAiAdapter {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("OPENAI_API_KEY").unwrap_or_default(),
            base_url: std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| BASE_URL.into()),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiAdapter {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn complete(
        &self,
        http: &reqwest::Client,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        send_chat(
            http,
            &url,
            &self.api_key,
            request,
            native_model(&request.model),
            self.billing_multiplier_pct(),
        )
        .await
    }
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    url: Option<String>,
    b64_json: Option<String>,
}

/// Image generation backend. The prompt is the final user message; the
/// response content is the image URL (or base64 payload).
#[derive(Debug)]
pub struct OpenAiImageAdapter {
    api_key: String,
    base_url: String,
}

impl OpenAiImageAdapter {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("OPENAI_API_KEY").unwrap_or_default(),
            base_url: std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| BASE_URL.into()),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiImageAdapter {
    fn name(&self) -> &'static str {
        "openai-image"
    }

    async fn complete(
        &self,
        http: &reqwest::Client,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse> {
        let prompt = request
            .messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .ok_or_else(|| {
                Error::InvalidRequest("image generation requires a user prompt".into())
            })?;

        let url = format!("{}/v1/images/generations", self.base_url);
        let response = http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": native_model(&request.model),
                "prompt": prompt,
                "n": 1,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                message,
                status: Some(status.as_u16()),
                error_type: None,
            });
        }

        let parsed: ImageResponse = response.json().await?;
        let content = parsed
            .data
            .first()
            .and_then(|d| d.url.clone().or_else(|| d.b64_json.clone()))
            .ok_or_else(|| Error::Api {
                message: "image response contained no data".to_string(),
                status: None,
                error_type: None,
            })?;

        Ok(CompletionResponse {
            content,
            model: request.model.clone(),
            // Image endpoints bill per image, not per token.
            usage: TokenUsage::default(),
        })
    }
}
