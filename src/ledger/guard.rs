//! RAII hook point for the release-on-abort guarantee.

use std::sync::Arc;

use super::ledger::ReservationLedger;

/// Holds a job's reservation for the duration of its run.
///
/// If the job aborts for any reason before calling [`commit`](Self::commit)
/// or [`release`](Self::release), dropping the guard releases the hold, so an
/// externally cancelled task can never leak reserved balance.
#[derive(Debug)]
pub struct ReservationGuard {
    ledger: Arc<ReservationLedger>,
    job_id: String,
    resolved: bool,
}

impl ReservationGuard {
    /// Wrap an already-placed reservation for `job_id`.
    pub fn new(ledger: Arc<ReservationLedger>, job_id: impl Into<String>) -> Self {
        Self {
            ledger,
            job_id: job_id.into(),
            resolved: false,
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Convert the hold into a permanent deduction of `actual_units`.
    pub fn commit(mut self, actual_units: u64) {
        self.ledger.commit(&self.job_id, actual_units);
        self.resolved = true;
    }

    /// Return the hold without billing anything.
    pub fn release(mut self) {
        self.ledger.release(&self.job_id);
        self.resolved = true;
    }
}

impl Drop for ReservationGuard {
    fn drop(&mut self) {
        if !self.resolved {
            tracing::debug!(job_id = %self.job_id, "reservation guard dropped; releasing hold");
            self.ledger.release(&self.job_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_releases_on_drop() {
        let ledger = Arc::new(ReservationLedger::new());
        ledger.set_balance("acct", 1_000);
        assert!(ledger.reserve("acct", "job", 600).is_reserved());

        {
            let _guard = ReservationGuard::new(Arc::clone(&ledger), "job");
            // guard dropped without commit/release
        }

        let snap = ledger.snapshot("acct").unwrap();
        assert_eq!(snap.available, 1_000);
    }

    #[test]
    fn test_guard_commit_suppresses_release() {
        let ledger = Arc::new(ReservationLedger::new());
        ledger.set_balance("acct", 1_000);
        assert!(ledger.reserve("acct", "job", 600).is_reserved());

        let guard = ReservationGuard::new(Arc::clone(&ledger), "job");
        guard.commit(500);

        let snap = ledger.snapshot("acct").unwrap();
        assert_eq!(snap.balance, 500);
        assert_eq!(snap.committed_units, 500);
    }
}
