use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{decode_text, unsupported_placeholder, ContentExtractor, Extracted, MimeClass};
use crate::models::ExtractionConfig;

/// Extractor backed by a generative model's `generateContent` endpoint.
pub struct GeminiExtractor {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    Inline { inline_data: InlineData },
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

fn prompt_for(class: MimeClass) -> &'static str {
    match class {
        MimeClass::Image => {
            "Transcribe all readable text in this image, then briefly describe \
             any claims the image makes. Reply with plain text only."
        }
        MimeClass::Document => {
            "Extract the main textual content of this document, preserving \
             any factual claims. Reply with plain text only."
        }
        MimeClass::Video => {
            "Summarize the spoken and on-screen claims made in this video. \
             Reply with plain text only."
        }
        MimeClass::Text | MimeClass::Unsupported => "Extract the text content.",
    }
}

impl GenerateResponse {
    fn into_text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_default()
            .trim()
            .to_string()
    }
}

impl GeminiExtractor {
    pub fn new(config: &ExtractionConfig, api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build extraction HTTP client")?;
        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }

    async fn generate(&self, bytes: &[u8], mime_type: &str, class: MimeClass) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint, self.model
        );
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text {
                        text: prompt_for(class).to_string(),
                    },
                    Part::Inline {
                        inline_data: InlineData {
                            mime_type: mime_type.to_string(),
                            data: STANDARD.encode(bytes),
                        },
                    },
                ],
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .context("Extraction request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Extraction model returned {}: {}", status, body);
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .context("Failed to parse extraction response")?;
        Ok(parsed.into_text())
    }
}

#[async_trait]
impl ContentExtractor for GeminiExtractor {
    async fn extract(&self, bytes: &[u8], mime_type: &str) -> Result<Extracted> {
        let class = MimeClass::classify(mime_type);
        match class {
            MimeClass::Text => Ok(Extracted::Text(decode_text(bytes))),
            MimeClass::Unsupported => Ok(Extracted::Placeholder(unsupported_placeholder(mime_type))),
            MimeClass::Image | MimeClass::Document | MimeClass::Video => {
                tracing::debug!(
                    "Extracting {} bytes of {} with model {}",
                    bytes.len(),
                    mime_type,
                    self.model
                );
                self.generate(bytes, mime_type, class).await.map(Extracted::Text)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_shape() {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text {
                        text: "describe".to_string(),
                    },
                    Part::Inline {
                        inline_data: InlineData {
                            mime_type: "image/png".to_string(),
                            data: STANDARD.encode([1u8, 2, 3]),
                        },
                    },
                ],
            }],
        };
        let value = serde_json::to_value(&request).expect("serialize");
        assert_eq!(value["contents"][0]["parts"][0]["text"], "describe");
        assert_eq!(
            value["contents"][0]["parts"][1]["inline_data"]["mime_type"],
            "image/png"
        );
        assert_eq!(value["contents"][0]["parts"][1]["inline_data"]["data"], "AQID");
    }

    #[test]
    fn test_response_text_joins_parts() {
        let response: GenerateResponse = serde_json::from_value(json!({
            "candidates": [
                {"content": {"parts": [{"text": "line one"}, {"text": "line two"}]}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]
        }))
        .expect("deserialize");
        assert_eq!(response.into_text(), "line one\nline two");
    }

    #[test]
    fn test_empty_response_is_empty_text() {
        let response: GenerateResponse = serde_json::from_value(json!({})).expect("deserialize");
        assert_eq!(response.into_text(), "");
    }

    #[tokio::test]
    async fn test_text_and_unsupported_never_call_model() {
        let config = ExtractionConfig {
            endpoint: "http://127.0.0.1:1".to_string(),
            ..Default::default()
        };
        let extractor =
            GeminiExtractor::new(&config, "key".to_string()).unwrap();

        let text = extractor.extract(b"plain claim", "text/plain").await.unwrap();
        assert_eq!(text, Extracted::Text("plain claim".to_string()));

        let text = extractor
            .extract(b"\x00\x01", "application/octet-stream")
            .await
            .unwrap();
        assert_eq!(
            text,
            Extracted::Placeholder(unsupported_placeholder("application/octet-stream"))
        );
    }
}
