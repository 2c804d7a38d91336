//! DeepSeek native API adapter.

use async_trait::async_trait;

use super::base::send_chat;
use super::traits::ProviderAdapter;
use crate::router::request::CompletionRequest;
use crate::types::CompletionResponse;
use crate::Result;

const BASE_URL: &str = "https://api.deepseek.com";

#[derive(Debug)]
pub struct DeepSeekAdapter {
    api_key: String,
    base_url: String,
}

impl DeepSeekAdapter {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("DEEPSEEK_API_KEY").unwrap_or_default(),
            base_url: std::env::var("DEEPSEEK_BASE_URL").unwrap_or_else(|_| BASE_URL.into()),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[async_trait]
impl ProviderAdapter for DeepSeekAdapter {
    fn name(&self) -> &'static str {
        "deepseek"
    }

    async fn complete(
        &self,
        http: &reqwest::Client,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse> {
        let url = format!("{}/chat/completions", self.base_url);
        send_chat(
            http,
            &url,
            &self.api_key,
            request,
            &request.model,
            self.billing_multiplier_pct(),
        )
        .await
    }
}
