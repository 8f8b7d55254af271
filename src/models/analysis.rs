use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ProxyError;

/// Raw client request body. Exactly one input is used, in the order
/// text, url, file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<FilePayload>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FilePayload {
    /// Base64-encoded file contents.
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default, rename = "type")]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisInput {
    Text(String),
    Url(String),
    File(UploadedFile),
}

/// A file upload after its base64 data has been decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedFile {
    pub name: String,
    pub mime_type: String,
    /// Empty when the client sent no data.
    pub bytes: Vec<u8>,
}

impl AnalyzeRequest {
    /// Parse a raw request body. Empty, unparseable, non-object or empty
    /// object bodies are rejected.
    pub fn parse_body(body: &[u8]) -> Result<(Value, AnalyzeRequest), ProxyError> {
        let no_json = || ProxyError::BadRequest("No JSON data provided".to_string());

        if body.iter().all(|b| b.is_ascii_whitespace()) {
            return Err(no_json());
        }
        let value: Value = serde_json::from_slice(body).map_err(|_| no_json())?;
        match &value {
            Value::Object(map) if !map.is_empty() => {}
            _ => return Err(no_json()),
        }
        let request: AnalyzeRequest = serde_json::from_value(value.clone())
            .map_err(|e| ProxyError::BadRequest(format!("Invalid request body: {}", e)))?;
        Ok((value, request))
    }

    /// Pick the input to analyze.
    pub fn into_input(self) -> Result<AnalysisInput, ProxyError> {
        if let Some(text) = self.text.filter(|t| !t.trim().is_empty()) {
            return Ok(AnalysisInput::Text(text));
        }
        if let Some(url) = self.url.filter(|u| !u.trim().is_empty()) {
            return Ok(AnalysisInput::Url(url.trim().to_string()));
        }
        if let Some(file) = self.file {
            return Ok(AnalysisInput::File(UploadedFile {
                bytes: file.decode()?,
                mime_type: file.resolved_mime_type(),
                name: file.display_name().to_string(),
            }));
        }
        Err(ProxyError::BadRequest(
            "No valid content provided for analysis".to_string(),
        ))
    }
}

impl FilePayload {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("unknown file")
    }

    /// Decoded file bytes; empty when no data was sent.
    pub fn decode(&self) -> Result<Vec<u8>, ProxyError> {
        match self.data {
            Some(ref data) => STANDARD
                .decode(data.trim())
                .map_err(|e| ProxyError::BadRequest(format!("Invalid base64 file data: {}", e))),
            None => Ok(Vec::new()),
        }
    }

    /// Declared MIME type, falling back to a guess from the file name.
    pub fn resolved_mime_type(&self) -> String {
        if let Some(ref mime) = self.mime_type {
            if !mime.trim().is_empty() {
                return mime.trim().to_ascii_lowercase();
            }
        }
        self.name
            .as_deref()
            .and_then(|name| mime_guess::from_path(name).first())
            .map(|m| m.essence_str().to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string())
    }
}

/// Request body accepted by the downstream scoring API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoringRequest {
    pub claim: String,
}

/// Response returned by the downstream scoring API. Every field is optional
/// upstream, so defaults are applied during presentation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoringResponse {
    #[serde(default)]
    pub credibility_score: Option<f64>,
    #[serde(default)]
    pub confidence: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub key_points: Vec<Value>,
    #[serde(default)]
    pub model: Option<String>,
}

/// Presentation-ready analysis result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisReport {
    pub risk_score: u8,
    pub summary_title: String,
    pub explanation: Explanation,
    pub method: String,
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Explanation {
    pub credibility_score: u8,
    pub confidence: String,
    pub paragraphs: Vec<String>,
    pub key_points: Vec<String>,
    pub methodology: String,
}
