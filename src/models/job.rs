use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A unit of work to submit: the backend resource plus its argument payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobRequest {
    pub resource: String,
    pub argument: Value,
}

impl JobRequest {
    pub fn new(resource: impl Into<String>, argument: Value) -> Self {
        Self {
            resource: resource.into(),
            argument,
        }
    }

    /// True when the argument carries no data at all.
    pub fn has_empty_argument(&self) -> bool {
        match &self.argument {
            Value::Null => true,
            Value::Object(map) => map.is_empty(),
            Value::Array(items) => items.is_empty(),
            Value::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

/// Backend-assigned identifier of a submitted job.
///
/// Deliberately not `Clone`: the adapter owns it for one poll cycle.
#[derive(Debug, PartialEq, Eq)]
pub struct JobHandle(String);

impl JobHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobState::Running)
    }
}

/// One status snapshot reported by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobStatus {
    pub state: JobState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobStatus {
    pub fn running() -> Self {
        Self {
            state: JobState::Running,
            result: None,
            error: None,
        }
    }

    pub fn succeeded(result: Value) -> Self {
        Self {
            state: JobState::Succeeded,
            result: Some(result),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            state: JobState::Failed,
            result: None,
            error: Some(error.into()),
        }
    }

    pub fn cancelled() -> Self {
        Self {
            state: JobState::Cancelled,
            result: None,
            error: None,
        }
    }

    /// Map a terminal status to its outcome. Returns `None` while running.
    pub fn into_outcome(self) -> Option<JobOutcome> {
        match self.state {
            JobState::Running => None,
            JobState::Succeeded => Some(JobOutcome::Succeeded {
                result: self
                    .result
                    .unwrap_or_else(|| Value::Object(Default::default())),
            }),
            JobState::Failed => Some(JobOutcome::Failed {
                reason: self.error.unwrap_or_default(),
            }),
            JobState::Cancelled => Some(JobOutcome::Cancelled {
                reason: self.error.unwrap_or_default(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum JobOutcome {
    Succeeded { result: Value },
    Failed { reason: String },
    Cancelled { reason: String },
    TimedOut {
        /// Last status query error, if the final poll attempt failed.
        #[serde(skip_serializing_if = "Option::is_none")]
        last_error: Option<String>,
    },
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Succeeded { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            JobOutcome::Succeeded { .. } => "succeeded",
            JobOutcome::Failed { .. } => "failed",
            JobOutcome::Cancelled { .. } => "cancelled",
            JobOutcome::TimedOut { .. } => "timed_out",
        }
    }
}
