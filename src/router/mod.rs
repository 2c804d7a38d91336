//! Multi-provider request router with tiered fallback and retry.
//!
//! Accepts a logical model name and a completion request, returns normalized
//! output regardless of which backend executed it, and absorbs transient
//! backend failures: immediate fallback to the next model in the tier's chain,
//! then exponential backoff once the chain is exhausted. The rate limiter is
//! consulted before every attempt.

mod backoff;
mod fallback;
pub mod providers;
mod request;
mod router;
mod routing;
mod state;

pub use backoff::ExponentialBackoff;
pub use fallback::FallbackChains;
pub use providers::{DeepSeekAdapter, OpenAiAdapter, OpenAiImageAdapter, OpenRouterAdapter, ProviderAdapter};
pub use request::CompletionRequest;
pub use router::{ProviderRouter, RetryPolicy};
pub use routing::{ModelTier, ProviderKind, RouteTarget, RoutingTable, RoutingTableBuilder};
pub use state::{CallPlan, CallStep};
