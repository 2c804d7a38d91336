//! OpenRouter aggregator adapter: the default backend for any model name the
//! routing table cannot attribute to a direct vendor.

use async_trait::async_trait;

use super::base::send_chat;
use super::traits::ProviderAdapter;
use crate::router::request::CompletionRequest;
use crate::types::CompletionResponse;
use crate::Result;

const BASE_URL: &str = "https://openrouter.ai/api";

/// Aggregator calls bill at twice the raw token count.
const BILLING_MULTIPLIER_PCT: u64 = 200;

#[derive(Debug)]
pub struct OpenRouterAdapter {
    api_key: String,
    base_url: String,
}

impl OpenRouterAdapter {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("OPENROUTER_API_KEY").unwrap_or_default(),
            base_url: std::env::var("OPENROUTER_BASE_URL").unwrap_or_else(|_| BASE_URL.into()),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[async_trait]
impl ProviderAdapter for OpenRouterAdapter {
    fn name(&self) -> &'static str {
        "openrouter"
    }

    fn billing_multiplier_pct(&self) -> u64 {
        BILLING_MULTIPLIER_PCT
    }

    async fn complete(
        &self,
        http: &reqwest::Client,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse> {
        // OpenRouter accepts vendor-path model ids natively.
        let url = format!("{}/v1/chat/completions", self.base_url);
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
