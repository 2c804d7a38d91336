//! Routed call execution: rate-limit admission, timeout, retry and fallback.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use super::backoff::ExponentialBackoff;
use super::fallback::FallbackChains;
use super::providers::{
    DeepSeekAdapter, OpenAiAdapter, OpenAiImageAdapter, OpenRouterAdapter, ProviderAdapter,
};
use super::request::CompletionRequest;
use super::routing::{ProviderKind, RoutingTable};
use super::state::{CallPlan, CallStep};
use crate::limiter::RateLimiterRegistry;
use crate::types::CompletionResponse;
use crate::{Error, Result};

/// Retry budget and timing for one routed call.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempt budget across fallback and backoff.
    pub max_attempts: u32,
    pub backoff: ExponentialBackoff,
    /// Per-attempt wall clock bound; long-form content and image calls need
    /// a generous one.
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff: ExponentialBackoff::default(),
            attempt_timeout: Duration::from_secs(120),
        }
    }
}

/// Routes a logical model name to a backend, absorbs transient failures, and
/// returns normalized output regardless of which backend executed the call.
///
/// All retry state is call-local; the only shared state touched is the
/// injected [`RateLimiterRegistry`], consulted before every attempt.
pub struct ProviderRouter {
    routing: RoutingTable,
    chains: FallbackChains,
    policy: RetryPolicy,
    limiter: Arc<RateLimiterRegistry>,
    adapters: HashMap<ProviderKind, Arc<dyn ProviderAdapter>>,
    http: reqwest::Client,
}

impl std::fmt::Debug for ProviderRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRouter")
            .field("policy", &self.policy)
            .field("adapters", &self.adapters.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ProviderRouter {
    pub fn new(
        routing: RoutingTable,
        chains: FallbackChains,
        policy: RetryPolicy,
        limiter: Arc<RateLimiterRegistry>,
    ) -> Self {
        Self {
            routing,
            chains,
            policy,
            limiter,
            adapters: HashMap::new(),
            http: reqwest::Client::new(),
        }
    }

    /// Router with default routing rules, default chains, and all adapters
    /// configured from environment variables.
    pub fn from_env() -> Self {
        Self::new(
            RoutingTable::default(),
            FallbackChains::default(),
            RetryPolicy::default(),
            Arc::new(RateLimiterRegistry::default()),
        )
        .with_adapter(ProviderKind::DeepSeek, Arc::new(DeepSeekAdapter::from_env()))
        .with_adapter(ProviderKind::OpenAi, Arc::new(OpenAiAdapter::from_env()))
        .with_adapter(
            ProviderKind::OpenAiImage,
            Arc::new(OpenAiImageAdapter::from_env()),
        )
        .with_adapter(
            ProviderKind::OpenRouter,
            Arc::new(OpenRouterAdapter::from_env()),
        )
    }

    pub fn with_adapter(mut self, kind: ProviderKind, adapter: Arc<dyn ProviderAdapter>) -> Self {
        self.adapters.insert(kind, adapter);
        self
    }

    pub fn limiter(&self) -> &Arc<RateLimiterRegistry> {
        &self.limiter
    }

    /// Execute a completion request end to end.
    ///
    /// Transient failures (rate limit, 5xx, timeout) are absorbed internally:
    /// first by immediate fallback to the next untried model in the tier's
    /// chain, then by exponential backoff on the last model. Fatal errors
    /// propagate on the first occurrence. Exhausting the attempt budget
    /// yields [`Error::RetriesExhausted`] carrying the last backend message.
    pub async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let tier = self.routing.resolve(&request.model).tier;
        let chain = self.chains.for_tier(tier).to_vec();
        let mut plan = CallPlan::new(
            request.model.clone(),
            chain,
            self.policy.max_attempts,
            self.policy.backoff.clone(),
        );

        loop {
            let model = plan.current().to_string();
            let target = self.routing.resolve(&model);
            let adapter = self
                .adapters
                .get(&target.provider)
                .cloned()
                .ok_or_else(|| {
                    Error::Config(format!("no adapter registered for {:?}", target.provider))
                })?;

            let attempt = request.with_model(&model);
            let estimated = attempt.estimated_tokens();
            self.limiter.acquire(&model, estimated).await;

            let outcome = match tokio::time::timeout(
                self.policy.attempt_timeout,
                adapter.complete(&self.http, &attempt),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => Err(Error::Timeout(self.policy.attempt_timeout)),
            };

            match outcome {
                Ok(response) => {
                    self.limiter
                        .report_usage(&model, estimated, response.usage.total_tokens)
                        .await;
                    tracing::debug!(model, provider = adapter.name(), "completion served");
                    return Ok(response);
                }
                Err(err) if err.is_retryable() => {
                    tracing::warn!(
                        model,
                        provider = adapter.name(),
                        error = %err,
                        "retryable provider failure"
                    );
                    let cause = err.to_string();
                    match plan.on_retryable_failure() {
                        CallStep::FallOver { next_model } => {
                            tracing::info!(from = model, to = next_model, "falling over");
                        }
                        CallStep::Backoff { delay, .. } => {
                            tracing::debug!(model, ?delay, "chain exhausted, backing off");
                            tokio::time::sleep(delay).await;
                        }
                        CallStep::Fail {
                            last_model,
                            attempts,
                        } => {
                            return Err(Error::RetriesExhausted {
                                model: last_model,
                                attempts,
                                last_error: cause,
                            });
                        }
                    }
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::types::{Message, TokenUsage};

    /// Fails the first `failures` calls with a retryable error, then
    /// succeeds. Records the model of every attempt.
    #[derive(Debug)]
    struct FlakyAdapter {
        failures: AtomicU32,
        seen: Mutex<Vec<String>>,
    }

    impl FlakyAdapter {
        fn new(failures: u32) -> Self {
            Self {
                failures: AtomicU32::new(failures),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ProviderAdapter for FlakyAdapter {
        fn name(&self) -> &'static str {
            "flaky"
        }

        async fn complete(
            &self,
            _http: &reqwest::Client,
            request: &CompletionRequest,
        ) -> Result<CompletionResponse> {
            self.seen.lock().unwrap().push(request.model.clone());
            let remaining = self.failures.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failures.store(remaining - 1, Ordering::SeqCst);
                return Err(Error::Api {
                    message: "service unavailable".to_string(),
                    status: Some(503),
                    error_type: None,
                });
            }
            Ok(CompletionResponse {
                content: "done".to_string(),
                model: request.model.clone(),
                usage: TokenUsage::from_raw(10, 20, 100),
            })
        }
    }

    fn router_with(adapter: Arc<dyn ProviderAdapter>, policy: RetryPolicy) -> ProviderRouter {
        ProviderRouter::new(
            RoutingTable::default(),
            FallbackChains::new(
                vec!["model-a".into(), "model-b".into(), "model-c".into()],
                vec!["small-mini".into()],
            ),
            policy,
            Arc::new(RateLimiterRegistry::new(
                crate::limiter::QuotaTable::builder()
                    .default_quota(crate::limiter::ModelQuota::new(1_000_000, 1_000))
                    .build(),
            )),
        )
        // Default rules route all of model-a/b/c to the aggregator kind.
        .with_adapter(ProviderKind::OpenRouter, adapter)
    }

    #[tokio::test]
    async fn test_fallback_walks_chain_in_order() {
        let adapter = Arc::new(FlakyAdapter::new(2));
        let policy = RetryPolicy {
            max_attempts: 5,
            backoff: ExponentialBackoff::default().with_jitter(0.0),
            attempt_timeout: Duration::from_secs(5),
        };
        let router = router_with(adapter.clone(), policy);

        let request = CompletionRequest::new("model-a", vec![Message::user("go")]);
        let response = router.complete(request).await.unwrap();

        assert_eq!(response.content, "done");
        assert_eq!(
            *adapter.seen.lock().unwrap(),
            vec!["model-a", "model-b", "model-c"]
        );
    }

    #[tokio::test]
    async fn test_exhaustion_carries_last_error() {
        let adapter = Arc::new(FlakyAdapter::new(100));
        let policy = RetryPolicy {
            max_attempts: 4,
            backoff: ExponentialBackoff::new(
                Duration::from_millis(1),
                Duration::from_millis(2),
                2.0,
            )
            .with_jitter(0.0),
            attempt_timeout: Duration::from_secs(5),
        };
        let router = router_with(adapter, policy);

        let request = CompletionRequest::new("model-a", vec![Message::user("go")]);
        let err = router.complete(request).await.unwrap_err();

        match err {
            Error::RetriesExhausted {
                attempts,
                last_error,
                ..
            } => {
                assert_eq!(attempts, 4);
                assert!(last_error.contains("service unavailable"));
            }
            other => panic!("expected RetriesExhausted, got {other}"),
        }
    }

    /// Fatal (non-retryable) errors must propagate without any fallback.
    #[derive(Debug)]
    struct FatalAdapter {
        seen: AtomicU32,
    }

    #[async_trait]
    impl ProviderAdapter for FatalAdapter {
        fn name(&self) -> &'static str {
            "fatal"
        }

        async fn complete(
            &self,
            _http: &reqwest::Client,
            _request: &CompletionRequest,
        ) -> Result<CompletionResponse> {
            self.seen.fetch_add(1, Ordering::SeqCst);
            Err(Error::auth("bad key"))
        }
    }

    #[tokio::test]
    async fn test_fatal_error_propagates_immediately() {
        let adapter = Arc::new(FatalAdapter {
            seen: AtomicU32::new(0),
        });
        let router = router_with(adapter.clone(), RetryPolicy::default());

        let request = CompletionRequest::new("model-a", vec![Message::user("go")]);
        let err = router.complete(request).await.unwrap_err();

        assert!(matches!(err, Error::Auth { .. }));
        assert_eq!(adapter.seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_simple_tier_uses_simple_chain() {
        // "small-mini" carries a simple marker; chain for Simple holds only
        // itself, so a retryable failure goes straight to backoff/exhaustion.
        let adapter = Arc::new(FlakyAdapter::new(100));
        let policy = RetryPolicy {
            max_attempts: 2,
            backoff: ExponentialBackoff::new(
                Duration::from_millis(1),
                Duration::from_millis(1),
                2.0,
            )
            .with_jitter(0.0),
            attempt_timeout: Duration::from_secs(5),
        };
        let router = router_with(adapter.clone(), policy);

        let request = CompletionRequest::new("small-mini", vec![Message::user("go")]);
        let err = router.complete(request).await.unwrap_err();
        assert!(matches!(err, Error::RetriesExhausted { .. }));
        assert_eq!(
            *adapter.seen.lock().unwrap(),
            vec!["small-mini", "small-mini"]
        );
    }
}
