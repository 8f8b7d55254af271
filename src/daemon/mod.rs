// Server runtime: config resolution, dependency wiring, and the serve loop.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::Utc;
use tokio::sync::watch;

use crate::adapter::SyncJobAdapter;
use crate::backend::WorkflowsBackend;
use crate::extract::{ContentExtractor, GeminiExtractor, LocalExtractor};
use crate::models::ProxyConfig;
use crate::scoring::{HttpScoringClient, ScoringApi};
use crate::server::{self, AppState};

pub const CONFIG_DIR_ENV: &str = "ANALYSIS_PROXY_CONFIG_DIR";
pub const ACCESS_TOKEN_ENV: &str = "ANALYSIS_PROXY_ACCESS_TOKEN";
pub const GEMINI_API_KEY_ENV: &str = "ANALYSIS_PROXY_GEMINI_API_KEY";
pub const SCORING_URL_ENV: &str = "ANALYSIS_PROXY_SCORING_URL";

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

fn read_config_file(path: &Path) -> Result<ProxyConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}

/// Load the ProxyConfig using this resolution order:
///   1. --config CLI flag (passed as config_path)
///   2. ANALYSIS_PROXY_CONFIG_DIR environment variable
///   3. Platform config dir (dirs::config_dir()/analysis-proxy/config.json)
///   4. If no config file exists, use ProxyConfig::default()
///
/// Secrets and the scoring URL can then be overridden from the environment.
pub fn load_config(config_path: Option<&Path>) -> Result<ProxyConfig> {
    let mut config = resolve_config_file(config_path)?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

fn resolve_config_file(config_path: Option<&Path>) -> Result<ProxyConfig> {
    // 1. Explicit config path
    if let Some(path) = config_path {
        if path.exists() {
            let config = read_config_file(path)?;
            tracing::info!("Loaded config from: {}", path.display());
            return Ok(config);
        }
        return Err(anyhow::anyhow!("Config file not found: {}", path.display()));
    }

    // 2. Env-provided config dir
    if let Ok(config_dir) = std::env::var(CONFIG_DIR_ENV) {
        let path = PathBuf::from(&config_dir).join("config.json");
        if path.exists() {
            let config = read_config_file(&path)?;
            tracing::info!("Loaded config from {}: {}", CONFIG_DIR_ENV, path.display());
            return Ok(config);
        }
    }

    // 3. Platform config dir
    if let Some(config_dir) = dirs::config_dir() {
        let path = config_dir.join("analysis-proxy").join("config.json");
        if path.exists() {
            let config = read_config_file(&path)?;
            tracing::info!("Loaded config from: {}", path.display());
            return Ok(config);
        }
    }

    // 4. Use defaults
    tracing::info!("No config file found, using defaults");
    Ok(ProxyConfig::default())
}

/// Apply environment overrides. `lookup` is injected so tests do not touch
/// the process environment.
pub fn apply_env_overrides<F>(config: &mut ProxyConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(token) = non_empty(ACCESS_TOKEN_ENV) {
        config.workflow.access_token = Some(token);
    }
    if let Some(key) = non_empty(GEMINI_API_KEY_ENV) {
        config.extraction.api_key = Some(key);
    }
    if let Some(url) = non_empty(SCORING_URL_ENV) {
        config.scoring.url = Some(url);
    }
}

// ---------------------------------------------------------------------------
// Wiring
// ---------------------------------------------------------------------------

/// Build the workflow adapter from config.
pub fn build_adapter(config: &ProxyConfig) -> Result<SyncJobAdapter> {
    let backend = WorkflowsBackend::new(&config.workflow)
        .context("Failed to build workflow backend client")?;
    Ok(SyncJobAdapter::new(Arc::new(backend)))
}

/// Build the shared server state. Scoring is optional; without an API key
/// the extractor only handles text.
pub fn build_state(
    config: Arc<ProxyConfig>,
    shutdown_rx: Option<watch::Receiver<()>>,
) -> Result<Arc<AppState>> {
    let adapter = build_adapter(&config)?;

    let scoring_timeout = Duration::from_secs(config.scoring.timeout_secs);
    let scoring = match config.scoring.url {
        Some(ref url) if !url.trim().is_empty() => {
            let client = HttpScoringClient::new(url.trim(), scoring_timeout)
                .context("Failed to build scoring client")?;
            Some(Arc::new(client) as Arc<dyn ScoringApi>)
        }
        _ => {
            tracing::warn!("No scoring URL configured; /pure-analyze will return 503");
            None
        }
    };

    let extractor: Arc<dyn ContentExtractor> = match config.extraction.api_key {
        Some(ref key) => Arc::new(GeminiExtractor::new(&config.extraction, key.clone())?),
        None => {
            tracing::info!("No extraction API key configured; media uploads get placeholders");
            Arc::new(LocalExtractor)
        }
    };

    Ok(Arc::new(AppState {
        config,
        adapter,
        scoring,
        extractor,
        start_time: Instant::now(),
        started_at: Utc::now(),
        shutdown_rx,
    }))
}

// ---------------------------------------------------------------------------
// Server bootstrap
// ---------------------------------------------------------------------------

/// Run the proxy server in the foreground until Ctrl+C or SIGTERM.
pub async fn start_server(
    config_path: Option<&Path>,
    host_override: Option<&str>,
    port_override: Option<u16>,
) -> Result<()> {
    let mut config = load_config(config_path)?;

    // Apply host/port overrides from CLI flags
    if let Some(h) = host_override {
        config.host = h.to_string();
    }
    if let Some(p) = port_override {
        config.port = p;
    }
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    let config = Arc::new(config);
    let (shutdown_tx, shutdown_rx) = watch::channel(());
    let state = build_state(Arc::clone(&config), Some(shutdown_rx.clone()))?;

    let router = server::create_router(state);
    let bind_addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .context(format!("Failed to bind to {}", bind_addr))?;

    tracing::info!(
        "Proxy listening on http://{} (workflow {}, poll every {}ms for up to {}s)",
        bind_addr,
        config.workflow.resource_name(),
        config.poll.interval_ms,
        config.poll.max_wait_secs
    );

    let mut server_shutdown_rx = shutdown_rx;
    let server_handle = tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                server_shutdown_rx.changed().await.ok();
                tracing::info!("HTTP server received shutdown signal");
            })
            .await
    });

    wait_for_signal().await?;

    // Stops the listener and aborts in-flight polls.
    let _ = shutdown_tx.send(());

    match server_handle.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!("HTTP server error: {}", e),
        Err(e) => tracing::error!("HTTP server task failed: {}", e),
    }

    tracing::info!("Proxy exited cleanly.");
    Ok(())
}

async fn wait_for_signal() -> Result<()> {
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received Ctrl+C signal");
            }
            _ = sigterm.recv() => {
                tracing::info!("Received SIGTERM signal");
            }
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        tracing::info!("Received Ctrl+C signal");
    }
    Ok(())
}
