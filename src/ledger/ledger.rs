//! Account-scoped reservation bookkeeping.

use std::collections::HashMap;

use chrono::Utc;
use dashmap::DashMap;

use super::reservation::{Reservation, ReservationStatus, ReserveOutcome, UsageRecord};

/// Point-in-time view of one account's balance position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountSnapshot {
    pub balance: u64,
    pub total_reserved: u64,
    pub available: u64,
    pub committed_units: u64,
}

#[derive(Debug, Default)]
struct AccountState {
    balance: u64,
    committed_units: u64,
    reservations: HashMap<String, Reservation>,
    usage: Vec<UsageRecord>,
}

impl AccountState {
    fn total_reserved(&self) -> u64 {
        self.reservations
            .values()
            .filter(|r| r.is_active())
            .map(|r| r.amount)
            .sum()
    }

    fn available(&self) -> u64 {
        self.balance.saturating_sub(self.total_reserved())
    }
}

/// Guarantees no job runs whose estimated cost would overdraw its account,
/// and at most one outstanding reservation per job.
///
/// Each account's state lives behind its own map entry, so the
/// read-compare-insert in [`reserve`](Self::reserve) is serializable per
/// account without contending with unrelated accounts.
#[derive(Debug, Default)]
pub struct ReservationLedger {
    accounts: DashMap<String, AccountState, ahash::RandomState>,
    /// Job id -> owning account id, so release/commit need only the job id.
    jobs: DashMap<String, String, ahash::RandomState>,
}

impl ReservationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an account's balance outright (billing layer hook).
    pub fn set_balance(&self, account_id: impl Into<String>, units: u64) {
        let mut state = self.accounts.entry(account_id.into()).or_default();
        state.balance = units;
    }

    /// Add billing units to an account's balance (top-up hook).
    pub fn deposit(&self, account_id: impl Into<String>, units: u64) {
        let mut state = self.accounts.entry(account_id.into()).or_default();
        state.balance = state.balance.saturating_add(units);
    }

    /// Attempt to place a hold of `estimated_units` for `job_id`.
    ///
    /// Succeeds iff the estimate fits within `balance - active reservations`
    /// at this instant. Insufficient balance is returned as data, never as an
    /// error. Calling again for a job whose reservation is still active is a
    /// logged no-op that reports the current position.
    pub fn reserve(
        &self,
        account_id: &str,
        job_id: &str,
        estimated_units: u64,
    ) -> ReserveOutcome {
        let mut state = self.accounts.entry(account_id.to_string()).or_default();

        if let Some(existing) = state.reservations.get(job_id)
            && existing.is_active()
        {
            tracing::warn!(job_id, account_id, "job already holds an active reservation");
            return ReserveOutcome::Reserved {
                available_balance: state.available(),
                total_reserved: state.total_reserved(),
            };
        }

        let total_reserved = state.total_reserved();
        let available = state.balance.saturating_sub(total_reserved);

        if estimated_units > available {
            tracing::debug!(
                job_id,
                account_id,
                required = estimated_units,
                available,
                "reservation rejected: insufficient balance"
            );
            return ReserveOutcome::InsufficientBalance {
                available_balance: available,
                total_reserved,
                required: estimated_units,
            };
        }

        state
            .reservations
            .insert(job_id.to_string(), Reservation::new(job_id, account_id, estimated_units));
        let outcome = ReserveOutcome::Reserved {
            available_balance: available - estimated_units,
            total_reserved: total_reserved + estimated_units,
        };
        drop(state);

        self.jobs.insert(job_id.to_string(), account_id.to_string());
        tracing::debug!(job_id, account_id, estimated_units, "reservation placed");
        outcome
    }

    /// Return a job's hold without billing anything.
    ///
    /// Idempotent: a missing or already-resolved reservation is a logged
    /// no-op, since the job may already have been cleaned up by a prior
    /// failure path.
    pub fn release(&self, job_id: &str) {
        let Some(account_id) = self.jobs.get(job_id).map(|a| a.clone()) else {
            tracing::warn!(job_id, "release for unknown job; treating as already resolved");
            return;
        };

        let Some(mut state) = self.accounts.get_mut(&account_id) else {
            tracing::warn!(job_id, %account_id, "release for unknown account");
            return;
        };

        match state.reservations.get_mut(job_id) {
            Some(r) if r.is_active() => {
                r.status = ReservationStatus::Released;
                tracing::debug!(job_id, %account_id, amount = r.amount, "reservation released");
            }
            Some(_) | None => {
                tracing::warn!(job_id, %account_id, "release on resolved reservation; no-op");
            }
        }
    }

    /// Convert a job's hold into a permanent usage deduction of
    /// `actual_units`, which may differ from the estimate.
    ///
    /// Idempotent against missing or already-resolved reservations.
    pub fn commit(&self, job_id: &str, actual_units: u64) {
        let Some(account_id) = self.jobs.get(job_id).map(|a| a.clone()) else {
            tracing::warn!(job_id, "commit for unknown job; treating as already resolved");
            return;
        };

        let Some(mut state) = self.accounts.get_mut(&account_id) else {
            tracing::warn!(job_id, %account_id, "commit for unknown account");
            return;
        };

        match state.reservations.get_mut(job_id) {
            Some(r) if r.is_active() => {
                r.status = ReservationStatus::Committed;
                state.balance = state.balance.saturating_sub(actual_units);
                state.committed_units += actual_units;
                state.usage.push(UsageRecord {
                    job_id: job_id.to_string(),
                    account_id: account_id.clone(),
                    units: actual_units,
                    recorded_at: Utc::now(),
                });
                tracing::debug!(job_id, %account_id, actual_units, "reservation committed");
            }
            Some(_) | None => {
                tracing::warn!(job_id, %account_id, "commit on resolved reservation; no-op");
            }
        }
    }

    /// Current position of one account, for dashboards and shortfall prompts.
    pub fn snapshot(&self, account_id: &str) -> Option<AccountSnapshot> {
        self.accounts.get(account_id).map(|state| AccountSnapshot {
            balance: state.balance,
            total_reserved: state.total_reserved(),
            available: state.available(),
            committed_units: state.committed_units,
        })
    }

    pub fn reservation(&self, job_id: &str) -> Option<Reservation> {
        let account_id = self.jobs.get(job_id)?.clone();
        let state = self.accounts.get(&account_id)?;
        state.reservations.get(job_id).cloned()
    }

    /// Usage records for an account, oldest first.
    pub fn usage_history(&self, account_id: &str) -> Vec<UsageRecord> {
        self.accounts
            .get(account_id)
            .map(|state| state.usage.clone())
            .unwrap_or_default()
    }
}
