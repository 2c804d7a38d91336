//! Per-model admission control against external provider quotas.
//!
//! Tracks tokens/minute, requests/minute and tokens/day independently per
//! logical model name, with lazy window reset and FIFO wake-up of deferred
//! callers. The registry is an injected component owned by the orchestrator's
//! composition root, so tests instantiate isolated registries.

mod quota;
mod registry;
mod window;

pub use quota::{ModelQuota, QuotaTable, QuotaTableBuilder};
pub(crate) use quota::normalize;
pub use registry::RateLimiterRegistry;
pub use window::WindowUsage;
