use serde_json::Value;

use crate::models::{AnalysisReport, Explanation, ScoringResponse};

const DEFAULT_CREDIBILITY: f64 = 50.0;
const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const METHOD: &str = "pure_vertex_ai_api";

/// Reshape a scoring API response into the report the front-end consumes.
pub fn present(response: ScoringResponse) -> AnalysisReport {
    let raw_credibility = response
        .credibility_score
        .filter(|score| !score.is_nan())
        .unwrap_or(DEFAULT_CREDIBILITY);
    let credibility = to_percent(raw_credibility);
    let risk_score = to_percent(100.0 - raw_credibility);
    let model = response
        .model
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());

    let mut key_points = string_points(&response.key_points);
    let explanation_text = match response.explanation {
        Some(text) if !text.trim().is_empty() => {
            let (text, embedded_points) = unwrap_fenced_json(&text);
            if key_points.is_empty() {
                key_points = embedded_points;
            }
            text
        }
        _ => "No explanation provided".to_string(),
    };

    let confidence = response
        .confidence
        .filter(|c| !c.trim().is_empty())
        .map(|c| title_case(&c))
        .unwrap_or_else(|| "Unknown".to_string());

    AnalysisReport {
        risk_score,
        summary_title: risk_title(risk_score).to_string(),
        explanation: Explanation {
            credibility_score: credibility,
            confidence,
            paragraphs: paragraphs(&explanation_text),
            key_points,
            methodology: format!(
                "This assessment was generated using the {} model, evaluating the content \
                 against known patterns of misinformation and factual accuracy.",
                model
            ),
        },
        method: METHOD.to_string(),
        model,
    }
}

pub fn risk_title(risk_score: u8) -> &'static str {
    match risk_score {
        0..=15 => "Very Low Risk: Highly Credible Content",
        16..=30 => "Low Risk: Generally Reliable",
        31..=50 => "Moderate Risk: Some Concerns Detected",
        51..=70 => "High Risk: Significant Issues Found",
        _ => "Very High Risk: Potentially Misleading",
    }
}

fn to_percent(score: f64) -> u8 {
    score.round().clamp(0.0, 100.0) as u8
}

fn string_points(points: &[Value]) -> Vec<String> {
    points
        .iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Models sometimes wrap their whole answer in a ```json fence. Pull the
/// real explanation (and key points) out of it, or strip the fences if the
/// body does not parse.
fn unwrap_fenced_json(text: &str) -> (String, Vec<String>) {
    let trimmed = text.trim_start();
    let Some(rest) = trimmed.strip_prefix("```json") else {
        return (text.to_string(), Vec::new());
    };
    let body = rest.split("```").next().unwrap_or_default().trim();

    if let Ok(Value::Object(embedded)) = serde_json::from_str::<Value>(body) {
        let explanation = embedded
            .get("explanation")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| text.to_string());
        let points = embedded
            .get("key_points")
            .and_then(Value::as_array)
            .map(|p| string_points(p))
            .unwrap_or_default();
        return (explanation, points);
    }

    (text.replace("```json", "").replace("```", ""), Vec::new())
}

fn paragraphs(text: &str) -> Vec<String> {
    text.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
