use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Errors raised by an execution backend on submit or status query.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BackendError {
    #[error("Backend unreachable: {0}")]
    Unreachable(String),

    #[error("Backend request timed out")]
    Timeout,

    #[error("Backend rejected request ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Malformed backend response: {0}")]
    Malformed(String),
}

impl BackendError {
    /// True when the backend could not be reached at all, as opposed to
    /// answering with something unusable.
    pub fn is_transport(&self) -> bool {
        matches!(self, BackendError::Unreachable(_) | BackendError::Timeout)
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BackendError::Timeout
        } else if err.is_decode() {
            BackendError::Malformed(err.to_string())
        } else {
            BackendError::Unreachable(err.to_string())
        }
    }
}

/// Errors returned by the synchronous job adapter instead of an outcome.
#[derive(Debug, Error, PartialEq)]
pub enum AdapterError {
    #[error("Invalid job request: {0}")]
    InvalidRequest(String),

    #[error("Submission failed: {0}")]
    Submission(BackendError),

    #[error("Polling aborted by caller")]
    Aborted,
}

/// Errors surfaced at the HTTP boundary as `{error, details?}`.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Submission(String),

    #[error("{0}")]
    JobFailed(String),

    #[error("{message}")]
    Upstream {
        message: String,
        details: Option<String>,
    },

    #[error("{0}")]
    Transport(String),

    #[error("{0}")]
    Unavailable(String),

    #[error("{0}")]
    Timeout(String),

    #[error("{0}")]
    Internal(String),
}

impl ProxyError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ProxyError::Submission(_)
            | ProxyError::JobFailed(_)
            | ProxyError::Upstream { .. }
            | ProxyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::Transport(_) | ProxyError::Unavailable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ProxyError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl From<AdapterError> for ProxyError {
    fn from(err: AdapterError) -> Self {
        match err {
            AdapterError::InvalidRequest(msg) => ProxyError::BadRequest(msg),
            AdapterError::Submission(e) if e.is_transport() => {
                ProxyError::Transport(format!("Workflow backend unavailable: {}", e))
            }
            AdapterError::Submission(e) => {
                ProxyError::Submission(format!("Failed to start workflow execution: {}", e))
            }
            AdapterError::Aborted => {
                ProxyError::Unavailable("Server is shutting down".to_string())
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let details = match &self {
            ProxyError::Upstream { details, .. } => details.clone(),
            _ => None,
        };
        if status.is_server_error() {
            tracing::warn!("Request failed ({}): {}", status.as_u16(), self);
        }
        let body = ErrorBody {
            error: self.to_string(),
            details,
        };
        (status, Json(body)).into_response()
    }
}
