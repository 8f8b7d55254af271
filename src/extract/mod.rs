pub mod gemini;

use anyhow::Result;
use async_trait::async_trait;

pub use gemini::GeminiExtractor;

/// Turns uploaded bytes into text that can be scored.
///
/// Unsupported MIME types yield a descriptive placeholder, not an error.
#[async_trait]
pub trait ContentExtractor: Send + Sync {
    async fn extract(&self, bytes: &[u8], mime_type: &str) -> Result<Extracted>;
}

/// What an extractor got out of an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extracted {
    /// Text read from the content itself.
    Text(String),
    /// Description standing in for content that was not read.
    Placeholder(String),
}

impl Extracted {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Extracted::Placeholder(_))
    }
}

/// Coarse grouping of MIME types by how their content can be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MimeClass {
    Text,
    Image,
    Document,
    Video,
    Unsupported,
}

impl MimeClass {
    pub fn classify(mime_type: &str) -> Self {
        let essence = mime_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "application/json" | "application/xml" => MimeClass::Text,
            "application/pdf" => MimeClass::Document,
            m if m.starts_with("text/") => MimeClass::Text,
            m if m.starts_with("image/") => MimeClass::Image,
            m if m.starts_with("video/") => MimeClass::Video,
            _ => MimeClass::Unsupported,
        }
    }
}

pub fn unsupported_placeholder(mime_type: &str) -> String {
    format!(
        "[Unsupported file type: {}. Content could not be extracted for analysis.]",
        mime_type
    )
}

pub(crate) fn decode_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).trim().to_string()
}

/// Extractor that only reads text itself. Media needs a model-backed
/// extractor, so it gets a placeholder here.
pub struct LocalExtractor;

#[async_trait]
impl ContentExtractor for LocalExtractor {
    async fn extract(&self, bytes: &[u8], mime_type: &str) -> Result<Extracted> {
        let placeholder = |kind: &str| {
            Extracted::Placeholder(format!(
                "[{} content ({}, {} bytes) was not analyzed: no model extractor is configured.]",
                kind,
                mime_type,
                bytes.len()
            ))
        };
        Ok(match MimeClass::classify(mime_type) {
            MimeClass::Text => Extracted::Text(decode_text(bytes)),
            MimeClass::Image => placeholder("Image"),
            MimeClass::Document => placeholder("Document"),
            MimeClass::Video => placeholder("Video"),
            MimeClass::Unsupported => Extracted::Placeholder(unsupported_placeholder(mime_type)),
        })
    }
}
