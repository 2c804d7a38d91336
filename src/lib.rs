//! # copyforge
//!
//! Admission-control and backpressure engine for AI content-generation
//! pipelines.
//!
//! Every generation job passes through four cooperating components before its
//! output is accepted:
//!
//! - [`ReservationLedger`] pre-commits an estimated billing cost against an
//!   account balance so concurrent jobs can never overdraw it.
//! - [`ProviderRouter`] resolves a logical model name to a backend provider,
//!   absorbs transient failures with tiered fallback and exponential backoff,
//!   and normalizes token usage across backends.
//! - [`RateLimiterRegistry`] enforces per-model tokens/minute, requests/minute
//!   and tokens/day quotas with FIFO deferral, consulted before every attempt.
//! - [`QualityGate`] scores a finished article against weighted structural
//!   checks and decides whether it is admissible.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use copyforge::{CompletionRequest, Message, ProviderRouter};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), copyforge::Error> {
//!     let router = ProviderRouter::from_env();
//!     let request = CompletionRequest::new(
//!         "deepseek-chat",
//!         vec![Message::user("Write an intro paragraph about alpaca wool.")],
//!     );
//!     let response = router.complete(request).await?;
//!     println!("{}", response.content);
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod jobs;
pub mod ledger;
pub mod limiter;
pub mod quality;
pub mod router;
pub mod types;

// Re-exports for convenience
pub use jobs::{JobHandle, JobPool, JobStatus, SubmitOutcome};
pub use ledger::{
    AccountSnapshot, Reservation, ReservationGuard, ReservationLedger, ReservationStatus,
    ReserveOutcome, UsageRecord,
};
pub use limiter::{ModelQuota, QuotaTable, QuotaTableBuilder, RateLimiterRegistry, WindowUsage};
pub use quality::{
    Article, ArticleMeta, CheckResult, QualityConfig, QualityGate, QualityReport, QualityWeights,
    Severity,
};
pub use router::{
    CallPlan, CallStep, CompletionRequest, DeepSeekAdapter, ExponentialBackoff, FallbackChains,
    ModelTier, OpenAiAdapter, OpenRouterAdapter, ProviderAdapter, ProviderKind, ProviderRouter,
    RetryPolicy, RouteTarget, RoutingTable,
};
pub use types::{CompletionResponse, Message, ResponseFormat, Role, TokenUsage};

/// Error type for copyforge operations.
///
/// Admission rejections ([`ReserveOutcome::InsufficientBalance`]) and quality
/// verdicts ([`QualityReport`]) are expected business outcomes and are returned
/// as data, never through this enum.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Backend returned an error response.
    #[error("provider error (HTTP {status:?}): {message}")]
    Api {
        message: String,
        status: Option<u16>,
        error_type: Option<String>,
    },

    /// Authentication with a backend failed.
    #[error("authentication failed: {message}")]
    Auth { message: String },

    /// Network connectivity or request failed.
    #[error("network request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization or deserialization failed.
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Backend rate limit exceeded.
    #[error("rate limit exceeded, retry after {retry_after:?}")]
    RateLimit {
        retry_after: Option<std::time::Duration>,
    },

    /// Call attempt exceeded its timeout.
    #[error("provider call timed out after {:.1}s", .0.as_secs_f64())]
    Timeout(std::time::Duration),

    /// Request parameters are invalid.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// The retry/fallback budget for a call was exhausted.
    ///
    /// The last backend error message is preserved at the tail of the chain.
    #[error("generation failed after {attempts} attempts (last model {model}): {last_error}")]
    RetriesExhausted {
        model: String,
        attempts: u32,
        last_error: String,
    },

    /// A supervised job failed or was aborted.
    #[error("job error: {0}")]
    Job(String),
}

impl Error {
    pub fn auth(message: impl Into<String>) -> Self {
        Error::Auth {
            message: message.into(),
        }
    }

    /// Whether the provider router may absorb this error via fallback or
    /// backoff. Rate limits, 5xx-class responses, timeouts and transport
    /// failures qualify; everything else propagates immediately.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::RateLimit { .. } | Error::Timeout(_) | Error::Network(_) => true,
            Error::Api {
                status: Some(429 | 500 | 502 | 503 | 529),
                ..
            } => true,
            _ => false,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => *status,
            _ => None,
        }
    }

    pub fn retry_after(&self) -> Option<std::time::Duration> {
        match self {
            Error::RateLimit { retry_after } => *retry_after,
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Api {
            message: "Invalid API key".to_string(),
            status: Some(401),
            error_type: None,
        };
        assert!(err.to_string().contains("Invalid API key"));
    }

    #[test]
    fn test_error_is_retryable() {
        let rate_limit = Error::RateLimit { retry_after: None };
        assert!(rate_limit.is_retryable());

        for status in [429, 500, 502, 503] {
            let err = Error::Api {
                message: "upstream unhappy".to_string(),
                status: Some(status),
                error_type: None,
            };
            assert!(err.is_retryable(), "status {status} should be retryable");
        }

        let auth_error = Error::auth("Invalid token");
        assert!(!auth_error.is_retryable());

        let bad_request = Error::Api {
            message: "messages must not be empty".to_string(),
            status: Some(400),
            error_type: Some("invalid_request_error".to_string()),
        };
        assert!(!bad_request.is_retryable());
    }

    #[test]
    fn test_retries_exhausted_preserves_cause() {
        let err = Error::RetriesExhausted {
            model: "deepseek-chat".to_string(),
            attempts: 5,
            last_error: "provider error (HTTP 503): overloaded".to_string(),
        };
        assert!(err.to_string().contains("overloaded"));
        assert!(!err.is_retryable());
    }
}
