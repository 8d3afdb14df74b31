//! Backend trait.
//!
//! ```text
//!   submit() ──→ status() ──→ result()
//!   (async)      (async)      (async)
//! ```
//!
//! A job carries a whole batch of circuits executed with the same number of
//! shots. [`Backend::wait`] polls until the job is terminal or the
//! [`WaitPolicy`] timeout elapses.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use ftdemo_ir::Circuit;

use crate::error::{HalError, HalResult};
use crate::job::{JobId, JobStatus};
use crate::result::JobResult;

/// Polling schedule used by [`Backend::wait`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    /// Delay between status queries.
    pub poll_interval: Duration,
    /// Give up after this long.
    pub timeout: Duration,
}

impl Default for WaitPolicy {
    /// Poll every 500ms for up to 5 minutes.
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            timeout: Duration::from_secs(300),
        }
    }
}

/// Trait for execution backends.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Get the name of this backend.
    fn name(&self) -> &str;

    /// Submit a batch of circuits, each executed `shots` times.
    async fn submit(&self, circuits: &[Circuit], shots: u32) -> HalResult<JobId>;

    /// Get the status of a job.
    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus>;

    /// Get the result of a completed job.
    ///
    /// Must only be called when `status()` returns `Completed`.
    async fn result(&self, job_id: &JobId) -> HalResult<JobResult>;

    /// Wait for a job to complete and return its result.
    ///
    /// Returns [`HalError::Timeout`] when the job is still pending after
    /// `policy.timeout`.
    async fn wait(&self, job_id: &JobId, policy: WaitPolicy) -> HalResult<JobResult> {
        let deadline = tokio::time::Instant::now() + policy.timeout;

        loop {
            match self.status(job_id).await? {
                JobStatus::Completed => return self.result(job_id).await,
                JobStatus::Failed(msg) => return Err(HalError::JobFailed(msg)),
                JobStatus::Cancelled => return Err(HalError::JobCancelled),
                JobStatus::Queued | JobStatus::Running => {}
            }
            if tokio::time::Instant::now() + policy.poll_interval > deadline {
                return Err(HalError::Timeout(job_id.0.clone()));
            }
            debug!(job = %job_id, "job pending, polling again");
            tokio::time::sleep(policy.poll_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::Calibration;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Reports `Running` for a fixed number of polls, then `Completed`.
    struct SlowBackend {
        polls_left: AtomicU32,
    }

    #[async_trait]
    impl Backend for SlowBackend {
        fn name(&self) -> &str {
            "slow"
        }

        async fn submit(&self, _circuits: &[Circuit], _shots: u32) -> HalResult<JobId> {
            Ok(JobId::from("slow-1"))
        }

        async fn status(&self, _job_id: &JobId) -> HalResult<JobStatus> {
            let left = self.polls_left.load(Ordering::SeqCst);
            if left == 0 {
                return Ok(JobStatus::Completed);
            }
            self.polls_left.store(left - 1, Ordering::SeqCst);
            Ok(JobStatus::Running)
        }

        async fn result(&self, job_id: &JobId) -> HalResult<JobResult> {
            Ok(JobResult {
                job_id: job_id.clone(),
                status: JobStatus::Completed,
                shots: 1,
                circuits: vec![],
                calibration: Calibration::default(),
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_completes() {
        let backend = SlowBackend {
            polls_left: AtomicU32::new(3),
        };
        let id = backend.submit(&[], 1).await.unwrap();
        let result = backend.wait(&id, WaitPolicy::default()).await.unwrap();
        assert_eq!(result.job_id, id);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_times_out() {
        let backend = SlowBackend {
            polls_left: AtomicU32::new(u32::MAX),
        };
        let id = backend.submit(&[], 1).await.unwrap();
        let policy = WaitPolicy {
            poll_interval: Duration::from_secs(1),
            timeout: Duration::from_secs(10),
        };
        let err = backend.wait(&id, policy).await.unwrap_err();
        assert!(err.is_timeout());
    }
}
