//! Injected registry of per-model rate limiters.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, Notify};
use tokio::time::Instant;

use super::quota::{ModelQuota, QuotaTable, normalize};
use super::window::{RateWindow, WindowUsage};

#[derive(Debug)]
struct LimiterState {
    window: RateWindow,
    /// Next ticket to hand out; `serving == next_ticket` means no queue.
    next_ticket: u64,
    /// Ticket currently allowed to attempt admission.
    serving: u64,
}

#[derive(Debug)]
struct ModelLimiter {
    state: Mutex<LimiterState>,
    reopened: Notify,
}

impl ModelLimiter {
    fn new(now: Instant) -> Self {
        Self {
            state: Mutex::new(LimiterState {
                window: RateWindow::new(now),
                next_ticket: 0,
                serving: 0,
            }),
            reopened: Notify::new(),
        }
    }
}

/// Owns one rate-limit window per logical model name.
///
/// Deliberately not a module-level singleton: the orchestrator's composition
/// root constructs and injects it, so each test instantiates an isolated
/// registry. Limiter state is created lazily on first use of a model name and
/// lives for the registry's lifetime.
#[derive(Debug, Default)]
pub struct RateLimiterRegistry {
    quotas: QuotaTable,
    limiters: DashMap<String, Arc<ModelLimiter>, ahash::RandomState>,
}

impl RateLimiterRegistry {
    pub fn new(quotas: QuotaTable) -> Self {
        Self {
            quotas,
            limiters: DashMap::default(),
        }
    }

    fn limiter_for(&self, model: &str) -> Arc<ModelLimiter> {
        self.limiters
            .entry(normalize(model))
            .or_insert_with(|| Arc::new(ModelLimiter::new(Instant::now())))
            .clone()
    }

    /// Suspend until admitting `estimated_tokens` plus one request fits every
    /// configured window for `model`, then charge all counters atomically.
    ///
    /// Deferred callers are admitted in FIFO arrival order through a ticket
    /// turnstile; the caller at the head of the queue sleeps until the
    /// blocking window's reopen time, everyone behind it waits to be waved
    /// through. No global lock is held across a suspension.
    pub async fn acquire(&self, model: &str, estimated_tokens: u64) {
        let quota = self.quotas.quota_for(model);
        let limiter = self.limiter_for(model);

        // Fast path: no queue and room in every window.
        let ticket = {
            let mut s = limiter.state.lock().await;
            s.window.roll(Instant::now());
            if s.serving == s.next_ticket && s.window.check(&quota, estimated_tokens).is_none() {
                s.window.admit(estimated_tokens);
                return;
            }
            let ticket = s.next_ticket;
            s.next_ticket += 1;
            ticket
        };

        tracing::debug!(model, ticket, estimated_tokens, "rate limit reached, deferring caller");

        loop {
            let wakeup = limiter.reopened.notified();
            tokio::pin!(wakeup);
            // Register interest before re-checking so an admission between the
            // check and the await is never missed.
            wakeup.as_mut().enable();

            let deadline = {
                let mut s = limiter.state.lock().await;
                s.window.roll(Instant::now());
                if s.serving == ticket {
                    match s.window.check(&quota, estimated_tokens) {
                        None => {
                            s.window.admit(estimated_tokens);
                            s.serving += 1;
                            limiter.reopened.notify_waiters();
                            tracing::debug!(model, ticket, "deferred caller admitted");
                            return;
                        }
                        Some(refusal) => Some(refusal.deadline()),
                    }
                } else {
                    // Not our turn yet; the predecessor's admission wakes us.
                    None
                }
            };

            match deadline {
                Some(at) => {
                    tokio::select! {
                        _ = &mut wakeup => {}
                        _ = tokio::time::sleep_until(at) => {}
                    }
                }
                None => wakeup.await,
            }
        }
    }

    /// Reconcile an admission's estimate with the backend's actual count.
    ///
    /// Adds only the positive difference; an over-estimate is never refunded
    /// mid-window, to avoid double-booking headroom across concurrent
    /// callers.
    pub async fn report_usage(&self, model: &str, estimated_tokens: u64, actual_tokens: u64) {
        if actual_tokens <= estimated_tokens {
            return;
        }
        let overrun = actual_tokens - estimated_tokens;
        let limiter = self.limiter_for(model);
        let mut s = limiter.state.lock().await;
        s.window.roll(Instant::now());
        s.window.add_overrun(overrun);
        tracing::trace!(model, overrun, "usage reconciled above estimate");
    }

    /// Current counters for a model's windows.
    pub async fn usage(&self, model: &str) -> WindowUsage {
        let limiter = self.limiter_for(model);
        let mut s = limiter.state.lock().await;
        s.window.roll(Instant::now());
        s.window.usage()
    }

    pub fn quota_for(&self, model: &str) -> ModelQuota {
        self.quotas.quota_for(model)
    }
}
