//! Provider adapter trait definition.

use std::fmt::Debug;

use async_trait::async_trait;

use crate::router::request::CompletionRequest;
use crate::types::CompletionResponse;
use crate::Result;

#[async_trait]
pub trait ProviderAdapter: Send + Sync + Debug {
    fn name(&self) -> &'static str;

    /// Multiplier applied to raw token counts when reporting billing-relevant
    /// usage, in hundredths (100 = 1x, 200 = 2x). Aggregator backends bill at
    /// a premium over raw tokens.
    fn billing_multiplier_pct(&self) -> u64 {
        100
    }

    /// Execute one attempt. Transient failures are reported through the error
    /// taxonomy ([`crate::Error::is_retryable`]); the router owns retry and
    /// fallback policy, adapters never retry internally.
    async fn complete(
        &self,
        http: &reqwest::Client,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse>;
}
