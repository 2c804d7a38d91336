//! Job pool: admission, supervision, and settlement of generation jobs.

use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::ledger::{ReservationGuard, ReservationLedger, ReserveOutcome};
use crate::{Error, Result};

/// Where a job is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    /// Admitted and reserved, not yet scheduled.
    Submitted,
    Running,
    /// Finished; `units` is the actual billed amount.
    Completed { units: u64 },
    Failed { error: String },
    Cancelled,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Submitted | JobStatus::Running)
    }
}

/// Result of asking the pool to run a job.
///
/// Rejection for lack of balance is a structured condition, not a fault, so a
/// caller can surface the figures to the account owner.
#[derive(Debug)]
pub enum SubmitOutcome {
    Admitted(JobHandle),
    InsufficientBalance {
        available_balance: u64,
        total_reserved: u64,
        required: u64,
    },
}

impl SubmitOutcome {
    /// Unwraps the handle, converting a rejection into [`Error::Job`].
    pub fn admitted(self) -> Result<JobHandle> {
        match self {
            SubmitOutcome::Admitted(handle) => Ok(handle),
            SubmitOutcome::InsufficientBalance {
                available_balance,
                required,
                ..
            } => Err(Error::Job(format!(
                "job rejected: {required} units required, {available_balance} available"
            ))),
        }
    }
}

/// Handle to one supervised job.
#[derive(Debug)]
pub struct JobHandle {
    job_id: String,
    handle: JoinHandle<Result<u64>>,
    statuses: Arc<DashMap<String, JobStatus, ahash::RandomState>>,
}

impl JobHandle {
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn status(&self) -> JobStatus {
        self.statuses
            .get(&self.job_id)
            .map(|s| s.clone())
            .unwrap_or(JobStatus::Submitted)
    }

    /// Aborts the job. The task's reservation guard releases the billing hold
    /// as the task unwinds.
    pub fn cancel(&self) {
        self.handle.abort();
        if let Some(mut status) = self.statuses.get_mut(&self.job_id)
            && !status.is_terminal()
        {
            *status = JobStatus::Cancelled;
        }
        info!(job_id = %self.job_id, "job cancelled");
    }

    /// Waits for the job to finish, returning the actual billed units.
    pub async fn wait(self) -> Result<u64> {
        match self.handle.await {
            Ok(result) => result,
            Err(join_err) if join_err.is_cancelled() => {
                Err(Error::Job(format!("job {} was cancelled", self.job_id)))
            }
            Err(join_err) => Err(Error::Job(format!(
                "job {} panicked: {join_err}",
                self.job_id
            ))),
        }
    }
}

/// Admits and supervises generation jobs against a shared ledger.
///
/// `submit` places the billing hold before spawning, so a job that is
/// scheduled at all is a job the account can afford.
#[derive(Clone)]
pub struct JobPool {
    ledger: Arc<ReservationLedger>,
    statuses: Arc<DashMap<String, JobStatus, ahash::RandomState>>,
}

impl JobPool {
    pub fn new(ledger: Arc<ReservationLedger>) -> Self {
        Self {
            ledger,
            statuses: Arc::new(DashMap::default()),
        }
    }

    pub fn ledger(&self) -> &Arc<ReservationLedger> {
        &self.ledger
    }

    /// Reserves `estimated_units` for the account and, if the hold sticks,
    /// spawns `work` as a supervised task.
    ///
    /// `work` resolves to the actual billed units; on success the hold is
    /// committed at that amount, on error or abort it is released in full.
    pub fn submit<F>(&self, account_id: &str, estimated_units: u64, work: F) -> SubmitOutcome
    where
        F: Future<Output = Result<u64>> + Send + 'static,
    {
        let job_id = Uuid::new_v4().to_string();

        match self.ledger.reserve(account_id, &job_id, estimated_units) {
            ReserveOutcome::Reserved { .. } => {}
            ReserveOutcome::InsufficientBalance {
                available_balance,
                total_reserved,
                required,
            } => {
                warn!(
                    account_id,
                    required, available_balance, "job rejected: insufficient balance"
                );
                return SubmitOutcome::InsufficientBalance {
                    available_balance,
                    total_reserved,
                    required,
                };
            }
        }

        debug!(job_id = %job_id, account_id, estimated_units, "job admitted");
        self.statuses.insert(job_id.clone(), JobStatus::Submitted);

        let guard = ReservationGuard::new(Arc::clone(&self.ledger), &job_id);
        let statuses = Arc::clone(&self.statuses);
        let task_job_id = job_id.clone();
        let handle = tokio::spawn(async move {
            statuses.insert(task_job_id.clone(), JobStatus::Running);

            match work.await {
                Ok(actual_units) => {
                    guard.commit(actual_units);
                    statuses.insert(
                        task_job_id.clone(),
                        JobStatus::Completed {
                            units: actual_units,
                        },
                    );
                    debug!(job_id = %task_job_id, actual_units, "job completed");
                    Ok(actual_units)
                }
                Err(err) => {
                    guard.release();
                    statuses.insert(
                        task_job_id.clone(),
                        JobStatus::Failed {
                            error: err.to_string(),
                        },
                    );
                    warn!(job_id = %task_job_id, error = %err, "job failed; hold released");
                    Err(err)
                }
            }
        });

        SubmitOutcome::Admitted(JobHandle {
            job_id,
            handle,
            statuses: Arc::clone(&self.statuses),
        })
    }

    pub fn status(&self, job_id: &str) -> Option<JobStatus> {
        self.statuses.get(job_id).map(|s| s.clone())
    }

    pub fn running_count(&self) -> usize {
        self.statuses
            .iter()
            .filter(|entry| !entry.value().is_terminal())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool_with_balance(units: u64) -> JobPool {
        let ledger = Arc::new(ReservationLedger::new());
        ledger.set_balance("acct", units);
        JobPool::new(ledger)
    }

    #[tokio::test]
    async fn test_successful_job_commits_actual_usage() {
        let pool = pool_with_balance(1_000);

        let handle = pool
            .submit("acct", 600, async { Ok(450) })
            .admitted()
            .unwrap();
        let units = handle.wait().await.unwrap();
        assert_eq!(units, 450);

        let snap = pool.ledger().snapshot("acct").unwrap();
        assert_eq!(snap.balance, 550);
        assert_eq!(snap.committed_units, 450);
        assert_eq!(snap.total_reserved, 0);
    }

    #[tokio::test]
    async fn test_failed_job_releases_hold() {
        let pool = pool_with_balance(1_000);

        let handle = pool
            .submit("acct", 600, async {
                Err(Error::Job("backend melted".into()))
            })
            .admitted()
            .unwrap();
        let job_id = handle.job_id().to_string();
        assert!(handle.wait().await.is_err());

        let snap = pool.ledger().snapshot("acct").unwrap();
        assert_eq!(snap.available, 1_000);
        assert!(matches!(
            pool.status(&job_id),
            Some(JobStatus::Failed { .. })
        ));
    }

    #[tokio::test]
    async fn test_rejection_reports_figures() {
        let pool = pool_with_balance(300);

        match pool.submit("acct", 400, async { Ok(0) }) {
            SubmitOutcome::InsufficientBalance {
                available_balance,
                total_reserved,
                required,
            } => {
                assert_eq!(available_balance, 300);
                assert_eq!(total_reserved, 0);
                assert_eq!(required, 400);
            }
            SubmitOutcome::Admitted(_) => panic!("should have been rejected"),
        }
    }

    #[tokio::test]
    async fn test_cancelled_job_releases_hold() {
        let pool = pool_with_balance(1_000);

        let handle = pool
            .submit("acct", 600, async {
                // Never resolves on its own.
                std::future::pending::<()>().await;
                Ok(0)
            })
            .admitted()
            .unwrap();
        let job_id = handle.job_id().to_string();

        // Let the task start and take its guard with it.
        tokio::task::yield_now().await;
        handle.cancel();
        assert!(matches!(pool.status(&job_id), Some(JobStatus::Cancelled)));

        // Awaiting the aborted task guarantees its guard has dropped.
        let err = handle.wait().await.unwrap_err();
        assert!(matches!(err, Error::Job(_)));

        let snap = pool.ledger().snapshot("acct").unwrap();
        assert_eq!(snap.available, 1_000);
    }

    #[tokio::test]
    async fn test_running_count_excludes_terminal_jobs() {
        let pool = pool_with_balance(1_000);

        let done = pool.submit("acct", 100, async { Ok(100) }).admitted().unwrap();
        done.wait().await.unwrap();

        let pending = pool
            .submit("acct", 100, async {
                std::future::pending::<()>().await;
                Ok(0)
            })
            .admitted()
            .unwrap();
        tokio::task::yield_now().await;

        assert_eq!(pool.running_count(), 1);
        pending.cancel();
        let _ = pending.wait().await;
        assert_eq!(pool.running_count(), 0);
    }
}
