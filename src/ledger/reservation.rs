use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of a reservation row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    /// Counted against the account's available balance.
    Active,
    /// Job aborted before producing billable usage; hold returned.
    Released,
    /// Converted into a permanent usage deduction.
    Committed,
}

/// A provisional hold of billing units against an account for one job.
///
/// Owned exclusively by the job that created it; no other job may release or
/// commit it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub job_id: String,
    pub account_id: String,
    /// Estimated cost in integer billing units.
    pub amount: u64,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
}

impl Reservation {
    pub(crate) fn new(
        job_id: impl Into<String>,
        account_id: impl Into<String>,
        amount: u64,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            account_id: account_id.into(),
            amount,
            status: ReservationStatus::Active,
            created_at: Utc::now(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == ReservationStatus::Active
    }
}

/// Immutable record of usage actually incurred by a completed job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageRecord {
    pub job_id: String,
    pub account_id: String,
    /// Actual cost in integer billing units (may differ from the estimate).
    pub units: u64,
    pub recorded_at: DateTime<Utc>,
}

/// Outcome of a reservation attempt.
///
/// Insufficient balance is an expected business outcome, reported as data so
/// the caller can abort admission and surface an upgrade prompt with the
/// precise shortfall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReserveOutcome {
    Reserved {
        available_balance: u64,
        total_reserved: u64,
    },
    InsufficientBalance {
        available_balance: u64,
        total_reserved: u64,
        required: u64,
    },
}

impl ReserveOutcome {
    pub fn is_reserved(&self) -> bool {
        matches!(self, Self::Reserved { .. })
    }

    pub fn available_balance(&self) -> u64 {
        match self {
            Self::Reserved {
                available_balance, ..
            }
            | Self::InsufficientBalance {
                available_balance, ..
            } => *available_balance,
        }
    }

    pub fn total_reserved(&self) -> u64 {
        match self {
            Self::Reserved { total_reserved, .. }
            | Self::InsufficientBalance { total_reserved, .. } => *total_reserved,
        }
    }
}
