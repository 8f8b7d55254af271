// CLI submit command: run one analysis workflow without the HTTP layer.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Value};

use super::SubmitArgs;
use crate::daemon;
use crate::models::{AnalyzeRequest, FilePayload, JobOutcome, JobRequest};

/// Build the request body the proxy would have received for this input.
pub fn build_request_body(args: &SubmitArgs) -> anyhow::Result<Value> {
    let request = if let Some(ref text) = args.text {
        AnalyzeRequest {
            text: Some(text.clone()),
            ..Default::default()
        }
    } else if let Some(ref url) = args.url {
        AnalyzeRequest {
            url: Some(url.clone()),
            ..Default::default()
        }
    } else if let Some(ref path) = args.file {
        AnalyzeRequest {
            file: Some(read_file_payload(path)?),
            ..Default::default()
        }
    } else {
        anyhow::bail!("One of --text, --url or --file is required");
    };

    let body = serde_json::to_vec(&request)?;
    let (raw, request) = AnalyzeRequest::parse_body(&body)?;
    request.into_input()?;
    Ok(raw)
}

fn read_file_payload(path: &Path) -> anyhow::Result<FilePayload> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read file {}", path.display()))?;
    let mime_type = mime_guess::from_path(path)
        .first()
        .map(|m| m.essence_str().to_string());
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned());
    Ok(FilePayload {
        data: Some(STANDARD.encode(bytes)),
        mime_type,
        name,
    })
}

/// analysis-proxy submit
pub async fn cmd_submit(args: &SubmitArgs) -> anyhow::Result<()> {
    let body = build_request_body(args)?;

    let config = daemon::load_config(args.config.as_deref())?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;
    let interval = args
        .interval_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.poll.interval());
    let max_wait = args
        .max_wait_secs
        .map(Duration::from_secs)
        .unwrap_or_else(|| config.poll.max_wait());

    let adapter = daemon::build_adapter(&config)?;
    let job = JobRequest::new(config.workflow.resource_name(), json!({ "body": body }));

    let outcome = adapter
        .run_until(job, interval, max_wait, async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Received Ctrl+C signal");
        })
        .await?;

    println!("{}", serde_json::to_string_pretty(&outcome)?);

    match outcome {
        JobOutcome::Succeeded { .. } => Ok(()),
        other => Err(anyhow::anyhow!("Workflow did not succeed: {}", other.label())),
    }
}
