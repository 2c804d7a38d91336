//! Explicit state machine for one routed call.
//!
//! The fallback/backoff decision logic lives here as pure transitions over
//! [`CallPlan`], so it is testable without mocking any network calls. The
//! router drives the plan: attempt the current model, and on a retryable
//! failure ask the plan what to do next.

use std::time::Duration;

use super::backoff::ExponentialBackoff;
use super::fallback::next_after;

/// Decision produced by [`CallPlan::on_retryable_failure`].
#[derive(Debug, Clone, PartialEq)]
pub enum CallStep {
    /// Switch to an untried chain model and retry immediately, with no delay:
    /// "try a different provider now" rather than "wait".
    FallOver { next_model: String },
    /// Chain exhausted; wait out the delay and retry the same model.
    Backoff { model: String, delay: Duration },
    /// Attempt budget exhausted; the call fails with the last backend error.
    Fail { last_model: String, attempts: u32 },
}

/// Mutable state of one call: current model, attempt count, and which chain
/// models have already been consumed.
#[derive(Debug, Clone)]
pub struct CallPlan {
    chain: Vec<String>,
    current: String,
    tried: Vec<String>,
    attempts: u32,
    max_attempts: u32,
    backoff: ExponentialBackoff,
}

impl CallPlan {
    pub fn new(
        requested_model: impl Into<String>,
        chain: Vec<String>,
        max_attempts: u32,
        backoff: ExponentialBackoff,
    ) -> Self {
        Self {
            chain,
            current: requested_model.into(),
            tried: Vec::new(),
            attempts: 0,
            max_attempts,
            backoff,
        }
    }

    /// Model the next attempt should use.
    pub fn current(&self) -> &str {
        &self.current
    }

    /// Attempts made so far, counting the one currently in flight once
    /// [`on_retryable_failure`](Self::on_retryable_failure) is consulted.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Record that the in-flight attempt failed with a retryable error, and
    /// decide the next step. Fatal errors never reach this point; the router
    /// propagates them immediately.
    pub fn on_retryable_failure(&mut self) -> CallStep {
        self.attempts += 1;

        if self.attempts >= self.max_attempts {
            return CallStep::Fail {
                last_model: self.current.clone(),
                attempts: self.attempts,
            };
        }

        if let Some(next) = next_after(&self.chain, &self.current, &self.tried) {
            let next = next.to_string();
            self.tried.push(std::mem::replace(&mut self.current, next.clone()));
            return CallStep::FallOver { next_model: next };
        }

        CallStep::Backoff {
            model: self.current.clone(),
            delay: self.backoff.delay_for(self.attempts),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(requested: &str, max_attempts: u32) -> CallPlan {
        CallPlan::new(
            requested,
            vec!["a".into(), "b".into(), "c".into()],
            max_attempts,
            ExponentialBackoff::default().with_jitter(0.0),
        )
    }

    #[test]
    fn test_falls_forward_through_chain() {
        let mut plan = plan("a", 10);

        assert_eq!(
            plan.on_retryable_failure(),
            CallStep::FallOver {
                next_model: "b".into()
            }
        );
        assert_eq!(
            plan.on_retryable_failure(),
            CallStep::FallOver {
                next_model: "c".into()
            }
        );
        // Chain exhausted: backoff on the final model, never backward.
        assert!(matches!(
            plan.on_retryable_failure(),
            CallStep::Backoff { ref model, .. } if model == "c"
        ));
    }

    #[test]
    fn test_requested_model_outside_chain_starts_at_head() {
        let mut plan = plan("outsider", 10);
        assert_eq!(
            plan.on_retryable_failure(),
            CallStep::FallOver {
                next_model: "a".into()
            }
        );
    }

    #[test]
    fn test_mid_chain_start_skips_earlier_models() {
        let mut plan = plan("b", 10);
        assert_eq!(
            plan.on_retryable_failure(),
            CallStep::FallOver {
                next_model: "c".into()
            }
        );
        assert!(matches!(
            plan.on_retryable_failure(),
            CallStep::Backoff { ref model, .. } if model == "c"
        ));
    }

    #[test]
    fn test_attempt_budget_exhaustion() {
        let mut plan = plan("a", 2);
        assert!(matches!(plan.on_retryable_failure(), CallStep::FallOver { .. }));
        assert_eq!(
            plan.on_retryable_failure(),
            CallStep::Fail {
                last_model: "b".into(),
                attempts: 2
            }
        );
    }

    #[test]
    fn test_backoff_delays_grow() {
        let mut plan = plan("c", 10);
        let mut last = Duration::ZERO;
        for _ in 0..3 {
            match plan.on_retryable_failure() {
                CallStep::Backoff { delay, .. } => {
                    assert!(delay >= last);
                    last = delay;
                }
                other => panic!("expected backoff, got {other:?}"),
            }
        }
    }
}
