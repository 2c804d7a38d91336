//! Supervised execution of content-generation jobs.
//!
//! One job per generation request, each running as an independently scheduled
//! tokio task. There is no worker-pool cap; capacity is bounded by the
//! reservation ledger at admission and by the rate limiter during execution.
//! A job's billing hold travels with the task as a [`ReservationGuard`], so
//! cancellation or a panic releases the hold without any bookkeeping by the
//! caller.
//!
//! [`ReservationGuard`]: crate::ledger::ReservationGuard

mod pool;

pub use pool::{JobHandle, JobPool, JobStatus, SubmitOutcome};
