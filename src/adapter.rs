use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::backend::ExecutionBackend;
use crate::errors::AdapterError;
use crate::models::{JobOutcome, JobRequest};

/// Turns a submit-then-poll execution backend into a single blocking call.
///
/// Each call submits one job, polls its handle every `poll_interval` and
/// returns exactly one [`JobOutcome`]. Polling stops at the first terminal
/// state or once the next wait would overrun `max_wait`. A timed-out job is
/// left running on the backend.
///
/// Status query errors are transient: they are logged and retried until the
/// deadline. If the deadline passes with the last query still failing, the
/// outcome is `TimedOut` with that error attached, never `Failed`.
#[derive(Clone)]
pub struct SyncJobAdapter {
    backend: Arc<dyn ExecutionBackend>,
}

impl SyncJobAdapter {
    pub fn new(backend: Arc<dyn ExecutionBackend>) -> Self {
        Self { backend }
    }

    /// Submit `job` and wait for its outcome.
    pub async fn run(
        &self,
        job: JobRequest,
        poll_interval: Duration,
        max_wait: Duration,
    ) -> Result<JobOutcome, AdapterError> {
        self.run_until(job, poll_interval, max_wait, std::future::pending())
            .await
    }

    /// Like [`run`](Self::run), but returns `AdapterError::Aborted` as soon
    /// as `abort` completes. The submitted job is not cancelled remotely.
    pub async fn run_until<F>(
        &self,
        job: JobRequest,
        poll_interval: Duration,
        max_wait: Duration,
        abort: F,
    ) -> Result<JobOutcome, AdapterError>
    where
        F: Future<Output = ()>,
    {
        validate(&job, poll_interval, max_wait)?;
        tokio::pin!(abort);

        let handle = tokio::select! {
            submitted = self.backend.submit(&job) => submitted.map_err(|e| {
                tracing::error!("Failed to submit job to {}: {}", job.resource, e);
                AdapterError::Submission(e)
            })?,
            _ = &mut abort => return Err(AdapterError::Aborted),
        };
        tracing::info!("Submitted job {} to {}", handle, job.resource);

        let started = Instant::now();
        let deadline = started + max_wait;
        let mut polls: u32 = 0;
        let mut last_error: Option<String> = None;

        loop {
            polls += 1;
            let status = tokio::select! {
                status = self.backend.get_status(&handle) => status,
                _ = &mut abort => {
                    tracing::info!("Stopped polling {} after {} queries: aborted", handle, polls);
                    return Err(AdapterError::Aborted);
                }
            };

            match status {
                Ok(status) => {
                    last_error = None;
                    if let Some(outcome) = status.into_outcome() {
                        tracing::info!(
                            "Job {} {} after {} queries ({:.1}s)",
                            handle,
                            outcome.label(),
                            polls,
                            started.elapsed().as_secs_f64()
                        );
                        return Ok(outcome);
                    }
                }
                Err(e) => {
                    tracing::warn!("Status query {} for {} failed: {}", polls, handle, e);
                    last_error = Some(e.to_string());
                }
            }

            if Instant::now() + poll_interval > deadline {
                tracing::warn!(
                    "Job {} still not finished after {}s ({} queries), giving up",
                    handle,
                    max_wait.as_secs(),
                    polls
                );
                return Ok(JobOutcome::TimedOut { last_error });
            }

            tokio::select! {
                _ = tokio::time::sleep(poll_interval) => {}
                _ = &mut abort => {
                    tracing::info!("Stopped polling {} after {} queries: aborted", handle, polls);
                    return Err(AdapterError::Aborted);
                }
            }
        }
    }
}

fn validate(job: &JobRequest, poll_interval: Duration, max_wait: Duration) -> Result<(), AdapterError> {
    if job.resource.trim().is_empty() {
        return Err(AdapterError::InvalidRequest(
            "job resource must not be empty".to_string(),
        ));
    }
    if job.has_empty_argument() {
        return Err(AdapterError::InvalidRequest(
            "job argument must not be empty".to_string(),
        ));
    }
    if poll_interval.is_zero() || max_wait.is_zero() {
        return Err(AdapterError::InvalidRequest(
            "poll interval and max wait must be positive".to_string(),
        ));
    }
    if poll_interval > max_wait {
        return Err(AdapterError::InvalidRequest(format!(
            "poll interval {:?} exceeds max wait {:?}",
            poll_interval, max_wait
        )));
    }
    Ok(())
}
