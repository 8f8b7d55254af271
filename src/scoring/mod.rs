pub mod present;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::errors::ProxyError;
use crate::models::{ScoringRequest, ScoringResponse};

pub use present::present;

#[async_trait]
pub trait ScoringApi: Send + Sync {
    async fn score(&self, claim: &str) -> Result<ScoringResponse, ProxyError>;
}

/// Client for the downstream claim-scoring API.
pub struct HttpScoringClient {
    client: Client,
    url: String,
}

impl HttpScoringClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

fn transport_error(err: reqwest::Error) -> ProxyError {
    if err.is_timeout() {
        ProxyError::Timeout("Analysis timed out. Please try again.".to_string())
    } else {
        ProxyError::Transport(format!("Network error: {}", err))
    }
}

#[async_trait]
impl ScoringApi for HttpScoringClient {
    async fn score(&self, claim: &str) -> Result<ScoringResponse, ProxyError> {
        let request = ScoringRequest {
            claim: claim.to_string(),
        };
        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProxyError::Upstream {
                message: format!("Scoring API failed: {}", status.as_u16()),
                details: Some(body),
            });
        }

        let bytes = response.bytes().await.map_err(transport_error)?;
        serde_json::from_slice(&bytes).map_err(|e| {
            ProxyError::Internal(format!("Internal error: invalid scoring response: {}", e))
        })
    }
}
