use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ExecutionBackend;
use crate::errors::BackendError;
use crate::models::{JobHandle, JobRequest, JobState, JobStatus, WorkflowConfig};

/// Client for the Cloud Workflows Executions REST API.
pub struct WorkflowsBackend {
    client: Client,
    endpoint: String,
    access_token: Option<String>,
}

#[derive(Debug, Serialize)]
struct CreateExecution {
    /// The API takes the argument as a JSON-encoded string.
    argument: String,
}

#[derive(Debug, Deserialize)]
struct Execution {
    name: String,
    #[serde(default)]
    state: ExecutionState,
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    error: Option<ExecutionError>,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum ExecutionState {
    #[default]
    StateUnspecified,
    Queued,
    Active,
    Succeeded,
    Failed,
    Cancelled,
    Unavailable,
}

#[derive(Debug, Default, Deserialize)]
struct ExecutionError {
    #[serde(default)]
    payload: String,
    #[serde(default)]
    context: String,
}

impl ExecutionError {
    fn message(&self) -> String {
        match (self.payload.is_empty(), self.context.is_empty()) {
            (false, false) => format!("{} ({})", self.payload, self.context),
            (false, true) => self.payload.clone(),
            (true, false) => self.context.clone(),
            (true, true) => String::new(),
        }
    }
}

impl Execution {
    fn into_status(self) -> JobStatus {
        let error = self.error.map(|e| e.message()).filter(|m| !m.is_empty());
        match self.state {
            ExecutionState::StateUnspecified | ExecutionState::Queued | ExecutionState::Active => {
                JobStatus::running()
            }
            ExecutionState::Succeeded => JobStatus {
                state: JobState::Succeeded,
                result: Some(parse_result(self.result.as_deref())),
                error: None,
            },
            ExecutionState::Failed => JobStatus {
                state: JobState::Failed,
                result: None,
                error,
            },
            ExecutionState::Cancelled => JobStatus {
                state: JobState::Cancelled,
                result: None,
                error,
            },
            ExecutionState::Unavailable => JobStatus::failed(
                error.unwrap_or_else(|| "execution data unavailable".to_string()),
            ),
        }
    }
}

/// Parse the execution result string. Non-JSON results are passed through
/// as a JSON string rather than failing the poll.
fn parse_result(raw: Option<&str>) -> Value {
    match raw.map(str::trim) {
        None | Some("") => Value::Object(Default::default()),
        Some(text) => serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string())),
    }
}

impl WorkflowsBackend {
    pub fn new(config: &WorkflowConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
        })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.access_token {
            Some(ref token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn read_execution(response: Response) -> Result<Execution, BackendError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| BackendError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl ExecutionBackend for WorkflowsBackend {
    async fn submit(&self, job: &JobRequest) -> Result<JobHandle, BackendError> {
        let url = format!("{}/v1/{}/executions", self.endpoint, job.resource);
        let body = CreateExecution {
            argument: serde_json::to_string(&job.argument)
                .map_err(|e| BackendError::Malformed(e.to_string()))?,
        };

        tracing::debug!("Creating execution under {}", job.resource);
        let response = self
            .authorize(self.client.post(&url).json(&body))
            .send()
            .await?;
        let execution = Self::read_execution(response).await?;

        if execution.name.is_empty() {
            return Err(BackendError::Malformed(
                "execution response has no name".to_string(),
            ));
        }
        Ok(JobHandle::new(execution.name))
    }

    async fn get_status(&self, handle: &JobHandle) -> Result<JobStatus, BackendError> {
        let url = format!("{}/v1/{}", self.endpoint, handle.as_str());
        let response = self.authorize(self.client.get(&url)).send().await?;
        let execution = Self::read_execution(response).await?;
        tracing::debug!("Execution {} is {:?}", handle, execution.state);
        Ok(execution.into_status())
    }
}
