use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_MAX_AGE,
};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tokio::sync::watch;
use uuid::Uuid;

use super::AppState;
use crate::errors::ProxyError;
use crate::extract::{ContentExtractor, Extracted};
use crate::models::{AnalysisInput, AnalysisReport, AnalyzeRequest, JobOutcome, JobRequest};
use crate::scoring::present;

// ---------------------------------------------------------------------------
// CORS / method handling
// ---------------------------------------------------------------------------

/// OPTIONS on any proxy endpoint.
pub async fn preflight() -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        [
            (ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (ACCESS_CONTROL_ALLOW_METHODS, "POST"),
            (ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
            (ACCESS_CONTROL_MAX_AGE, "3600"),
        ],
    )
}

pub async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({"error": "Method not allowed"})),
    )
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Resolves once the server starts shutting down. Never resolves without a
/// shutdown channel.
async fn shutdown_signal(rx: Option<watch::Receiver<()>>) {
    match rx {
        Some(mut rx) => {
            let _ = rx.changed().await;
        }
        None => std::future::pending::<()>().await,
    }
}

fn input_kind(input: &AnalysisInput) -> &'static str {
    match input {
        AnalysisInput::Text(_) => "text",
        AnalysisInput::Url(_) => "url",
        AnalysisInput::File(_) => "file",
    }
}

/// Build the claim sent to the scoring API from the client's input.
pub async fn build_claim(
    extractor: &dyn ContentExtractor,
    input: AnalysisInput,
) -> Result<String, ProxyError> {
    match input {
        AnalysisInput::Text(text) => Ok(text),
        AnalysisInput::Url(url) => Ok(format!(
            "Please analyze this URL for misinformation: {}",
            url
        )),
        AnalysisInput::File(file) => {
            let fallback = format!(
                "Please analyze this uploaded file for misinformation: {}",
                file.name
            );
            if file.bytes.is_empty() {
                return Ok(fallback);
            }
            match extractor.extract(&file.bytes, &file.mime_type).await {
                Ok(Extracted::Text(text)) if !text.trim().is_empty() => Ok(text),
                Ok(Extracted::Text(_)) => {
                    tracing::warn!(
                        "No text extracted from '{}' ({}), using file name",
                        file.name,
                        file.mime_type
                    );
                    Ok(fallback)
                }
                Ok(Extracted::Placeholder(note)) => {
                    tracing::info!("Content of '{}' not extracted: {}", file.name, note);
                    Ok(fallback)
                }
                Err(e) => {
                    tracing::warn!(
                        "Content extraction failed for '{}' ({}): {:#}",
                        file.name,
                        file.mime_type,
                        e
                    );
                    Ok(fallback)
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /analyze: run the analysis workflow and return its result.
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Response, ProxyError> {
    let request_id = Uuid::now_v7();
    let (raw, request) = AnalyzeRequest::parse_body(&body)?;
    let input = request.into_input()?;
    tracing::info!(
        "[{}] Workflow analysis requested ({} input)",
        request_id,
        input_kind(&input)
    );

    let job = JobRequest::new(
        state.config.workflow.resource_name(),
        json!({ "body": raw }),
    );
    let max_wait = state.config.poll.max_wait();
    let outcome = state
        .adapter
        .run_until(
            job,
            state.config.poll.interval(),
            max_wait,
            shutdown_signal(state.shutdown_rx.clone()),
        )
        .await?;

    tracing::info!("[{}] Workflow {}", request_id, outcome.label());
    match outcome {
        JobOutcome::Succeeded { result } => Ok((StatusCode::OK, Json(result)).into_response()),
        JobOutcome::Failed { reason } if reason.is_empty() => {
            Err(ProxyError::JobFailed("Workflow execution failed".to_string()))
        }
        JobOutcome::Failed { reason } => Err(ProxyError::JobFailed(reason)),
        JobOutcome::Cancelled { reason } if reason.is_empty() => Err(ProxyError::JobFailed(
            "Workflow execution cancelled".to_string(),
        )),
        JobOutcome::Cancelled { reason } => Err(ProxyError::JobFailed(format!(
            "Workflow execution cancelled: {}",
            reason
        ))),
        JobOutcome::TimedOut { last_error } => {
            if let Some(e) = last_error {
                tracing::warn!("[{}] Last status query before timeout failed: {}", request_id, e);
            }
            Err(ProxyError::Timeout(format!(
                "Analysis timed out after {}s",
                max_wait.as_secs()
            )))
        }
    }
}

/// POST /pure-analyze: score the claim directly and return a report.
pub async fn pure_analyze(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<AnalysisReport>, ProxyError> {
    let request_id = Uuid::now_v7();
    let (_, request) = AnalyzeRequest::parse_body(&body)?;
    let input = request.into_input()?;

    let scoring = state
        .scoring
        .as_ref()
        .ok_or_else(|| ProxyError::Unavailable("Scoring API is not configured".to_string()))?;

    tracing::info!(
        "[{}] Direct scoring requested ({} input)",
        request_id,
        input_kind(&input)
    );
    let claim = build_claim(state.extractor.as_ref(), input).await?;
    let response = scoring.score(&claim).await?;
    let report = present(response);
    tracing::info!("[{}] Risk score {}", request_id, report.risk_score);

    Ok(Json(report))
}
