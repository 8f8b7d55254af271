use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub workflow: WorkflowConfig,
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
}

/// Where workflow executions are submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConfig {
    #[serde(default)]
    pub project_id: String,
    #[serde(default = "default_location")]
    pub location: String,
    #[serde(default = "default_workflow_id")]
    pub workflow_id: String,
    #[serde(default = "default_workflow_endpoint")]
    pub endpoint: String,
    #[serde(default, skip_serializing)]
    pub access_token: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "default_max_wait_secs")]
    pub max_wait_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_scoring_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    #[serde(default = "default_extraction_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    #[serde(default = "default_extraction_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_location() -> String {
    "asia-south1".to_string()
}

fn default_workflow_id() -> String {
    "misinfo-analyzer-workflow".to_string()
}

fn default_workflow_endpoint() -> String {
    "https://workflowexecutions.googleapis.com".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_interval_ms() -> u64 {
    2000
}

fn default_max_wait_secs() -> u64 {
    60
}

fn default_scoring_timeout_secs() -> u64 {
    60
}

fn default_extraction_timeout_secs() -> u64 {
    45
}

fn default_extraction_endpoint() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workflow: WorkflowConfig::default(),
            poll: PollConfig::default(),
            scoring: ScoringConfig::default(),
            extraction: ExtractionConfig::default(),
        }
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            location: default_location(),
            workflow_id: default_workflow_id(),
            endpoint: default_workflow_endpoint(),
            access_token: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            max_wait_secs: default_max_wait_secs(),
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: default_scoring_timeout_secs(),
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            endpoint: default_extraction_endpoint(),
            model: default_model(),
            api_key: None,
            timeout_secs: default_extraction_timeout_secs(),
        }
    }
}

impl WorkflowConfig {
    /// Full resource name executions are created under.
    pub fn resource_name(&self) -> String {
        format!(
            "projects/{}/locations/{}/workflows/{}",
            self.project_id, self.location, self.workflow_id
        )
    }
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn max_wait(&self) -> Duration {
        Duration::from_secs(self.max_wait_secs)
    }
}

impl ProxyConfig {
    /// Reject configurations the server cannot run with.
    pub fn validate(&self) -> Result<(), String> {
        if self.workflow.project_id.trim().is_empty() {
            return Err("workflow.project_id must be set".to_string());
        }
        if self.workflow.workflow_id.trim().is_empty() {
            return Err("workflow.workflow_id must be set".to_string());
        }
        if self.poll.interval_ms == 0 {
            return Err("poll.interval_ms must be positive".to_string());
        }
        if self.poll.interval() > self.poll.max_wait() {
            return Err(format!(
                "poll.interval_ms ({}) exceeds poll.max_wait_secs ({})",
                self.poll.interval_ms, self.poll.max_wait_secs
            ));
        }
        Ok(())
    }
}
