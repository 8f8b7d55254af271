pub mod workflows;

use async_trait::async_trait;

use crate::errors::BackendError;
use crate::models::{JobHandle, JobRequest, JobStatus};

pub use workflows::WorkflowsBackend;

/// An asynchronous execution service: submit once, then query by handle.
#[async_trait]
pub trait ExecutionBackend: Send + Sync {
    async fn submit(&self, job: &JobRequest) -> Result<JobHandle, BackendError>;
    async fn get_status(&self, handle: &JobHandle) -> Result<JobStatus, BackendError>;
}
