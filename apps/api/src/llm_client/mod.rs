/// LLM Client — the single point of entry for all Gemini API calls in Resumatch.
///
/// ARCHITECTURAL RULE: No other module may call the Gemini API directly.
/// All model interactions MUST go through this module.
///
/// Model: gemini-1.5-flash (hardcoded — do not make configurable to prevent drift)
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
/// The model used for all LLM calls in Resumatch.
/// This is intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "gemini-1.5-flash";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// A base64-encoded image payload tagged with its MIME type — the wire shape
/// of the `inline_data` part the Gemini API expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlinePart {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

/// One ordered part of a request. Serializes as `{"text": ...}` or
/// `{"inline_data": {...}}` per the Gemini wire format.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: &'a str },
    Inline { inline_data: &'a InlinePart },
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(rename = "usageMetadata")]
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: CandidateContent,
}

#[derive(Debug, Default, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
pub struct ContentPart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    pub prompt_token_count: Option<u32>,
    pub candidates_token_count: Option<u32>,
}

impl LlmResponse {
    /// Extracts the text of the first text part of the first candidate.
    pub fn text(&self) -> Option<&str> {
        self.candidates
            .iter()
            .flat_map(|c| c.content.parts.iter())
            .find_map(|p| p.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

/// The seam between the submit orchestration and the remote model.
/// `AppState` carries an `Arc<dyn Evaluator>`; tests swap in a stub.
#[async_trait]
pub trait Evaluator: Send + Sync {
    /// One model call with the three ordered parts of an evaluation:
    /// the task instruction, the rendered resume page, and the job text.
    async fn evaluate(
        &self,
        instruction: &str,
        resume: &InlinePart,
        job_text: &str,
    ) -> Result<String, LlmError>;
}

/// The single LLM client used in Resumatch. Wraps the Gemini
/// `generateContent` endpoint: one request, one blocking response —
/// no retries, no timeout override, no streaming.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
        }
    }

    async fn generate(
        &self,
        instruction: &str,
        resume: &InlinePart,
        job_text: &str,
    ) -> Result<String, LlmError> {
        let request_body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text { text: instruction },
                    Part::Inline { inline_data: resume },
                    Part::Text { text: job_text },
                ],
            }],
        };

        let url = format!("{GEMINI_API_BASE}/{MODEL}:generateContent");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Try to parse the provider's error envelope
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let llm_response: LlmResponse = response.json().await?;

        if let Some(usage) = &llm_response.usage_metadata {
            debug!(
                "LLM call succeeded: prompt_tokens={:?}, candidate_tokens={:?}",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }

        llm_response
            .text()
            .map(str::to_owned)
            .ok_or(LlmError::EmptyContent)
    }
}

#[async_trait]
impl Evaluator for GeminiClient {
    async fn evaluate(
        &self,
        instruction: &str,
        resume: &InlinePart,
        job_text: &str,
    ) -> Result<String, LlmError> {
        self.generate(instruction, resume, job_text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_part() -> InlinePart {
        InlinePart {
            mime_type: "image/jpeg".to_string(),
            data: "aGVsbG8=".to_string(),
        }
    }

    #[test]
    fn test_request_parts_serialize_in_order() {
        let resume = sample_part();
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text {
                        text: "instruction",
                    },
                    Part::Inline {
                        inline_data: &resume,
                    },
                    Part::Text { text: "job text" },
                ],
            }],
        };

        let value = serde_json::to_value(&request).unwrap();
        let parts = value["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0]["text"], "instruction");
        assert_eq!(parts[1]["inline_data"]["mime_type"], "image/jpeg");
        assert_eq!(parts[1]["inline_data"]["data"], "aGVsbG8=");
        assert_eq!(parts[2]["text"], "job text");
    }

    #[test]
    fn test_response_text_extracts_first_text_part() {
        let json = r#"{
            "candidates": [
                {
                    "content": {
                        "parts": [{"text": "The candidate aligns well."}],
                        "role": "model"
                    },
                    "finishReason": "STOP"
                }
            ],
            "usageMetadata": {
                "promptTokenCount": 301,
                "candidatesTokenCount": 128,
                "totalTokenCount": 429
            }
        }"#;

        let response: LlmResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.text(), Some("The candidate aligns well."));
        let usage = response.usage_metadata.unwrap();
        assert_eq!(usage.prompt_token_count, Some(301));
        assert_eq!(usage.candidates_token_count, Some(128));
    }

    #[test]
    fn test_response_without_candidates_has_no_text() {
        let response: LlmResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert_eq!(response.text(), None);
    }

    #[test]
    fn test_error_envelope_parses_provider_message() {
        let body = r#"{"error": {"code": 429, "message": "Resource has been exhausted", "status": "RESOURCE_EXHAUSTED"}}"#;
        let parsed: GeminiError = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.error.message, "Resource has been exhausted");
    }
}
