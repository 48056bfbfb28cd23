use anyhow::{Context, Result, anyhow};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::providers::http_errors::api_request_error;

pub const GEMINI_MODEL: &str = "gemini-2.0-flash";
const API_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// One turn of the conversation, in the Gemini wire format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            parts: vec![Part::Text { text: text.into() }],
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: "model".to_string(),
            parts: vec![Part::Text { text: text.into() }],
        }
    }
}

/// A content segment. Only text parts are meaningful to this program;
/// anything else the API returns is preserved opaquely and skipped when
/// rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text { text: String },
    Other(serde_json::Value),
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: &'a [Content],
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
}

fn generate_url(base_url: &str, model: &str) -> String {
    format!(
        "{}/v1beta/models/{}:generateContent",
        base_url.trim_end_matches('/'),
        model
    )
}

/// Sends the full conversation to the Gemini API and returns the parsed
/// response. The caller decides what to do with the candidates.
pub async fn generate(
    client: &Client,
    cfg: &Config,
    contents: &[Content],
) -> Result<GenerateContentResponse> {
    let api_url = generate_url(API_BASE_URL, GEMINI_MODEL);
    let body = GenerateContentRequest { contents };
    debug!(
        model = GEMINI_MODEL,
        content_count = contents.len(),
        "sending generateContent request"
    );

    let response = client
        .post(&api_url)
        .header("x-goog-api-key", &cfg.api_key)
        .json(&body)
        .send()
        .await
        .map_err(|err| {
            warn!(
                model = GEMINI_MODEL,
                error = %err,
                "generateContent request failed"
            );
            api_request_error(err, &api_url)
        })?;

    if !response.status().is_success() {
        let status = response.status();
        let response_body = response
            .text()
            .await
            .unwrap_or_else(|_| "<failed to read response body>".to_string());
        warn!(
            model = GEMINI_MODEL,
            status = %status,
            response_body_len = response_body.len(),
            "Gemini API returned non-success status"
        );
        return Err(anyhow!(
            "Gemini API request failed with status {}: {}",
            status,
            response_body
        ));
    }

    let parsed: GenerateContentResponse = response
        .json()
        .await
        .context("Failed to parse generateContent response")?;
    debug!(
        model = GEMINI_MODEL,
        candidate_count = parsed.candidates.len(),
        "received generateContent response"
    );
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::{Content, GenerateContentRequest, GenerateContentResponse, Part, generate_url};

    #[test]
    fn generate_url_trims_trailing_slash() {
        assert_eq!(
            generate_url("https://generativelanguage.googleapis.com/", "gemini-2.0-flash"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn request_serializes_to_gemini_wire_shape() {
        let contents = vec![Content::user("hello")];
        let body = GenerateContentRequest {
            contents: &contents,
        };
        let json = serde_json::to_value(&body).expect("request should serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "contents": [
                    {"role": "user", "parts": [{"text": "hello"}]}
                ]
            })
        );
    }

    #[test]
    fn response_deserializes_text_and_opaque_parts() {
        let raw = r#"{
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        {"text": "hi there"},
                        {"inlineData": {"mimeType": "image/png", "data": "Zm9v"}}
                    ]
                }
            }]
        }"#;
        let parsed: GenerateContentResponse =
            serde_json::from_str(raw).expect("response should deserialize");

        let content = parsed.candidates[0]
            .content
            .as_ref()
            .expect("candidate should have content");
        assert_eq!(content.parts.len(), 2);
        assert!(matches!(&content.parts[0], Part::Text { text } if text == "hi there"));
        assert!(matches!(&content.parts[1], Part::Other(_)));
    }

    #[test]
    fn response_without_candidates_deserializes_to_empty_list() {
        let parsed: GenerateContentResponse =
            serde_json::from_str("{}").expect("response should deserialize");
        assert!(parsed.candidates.is_empty());
    }
}
