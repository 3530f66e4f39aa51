//! Wire access to the hosted generative model.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{InterpretError, InterpretResult};
use crate::config::ModelConfig;

/// Sends one text prompt and returns the model's raw text answer.
#[async_trait]
pub trait CompletionTransport: Send + Sync {
    async fn complete(&self, api_key: &str, prompt: &str) -> InterpretResult<String>;

    fn name(&self) -> &'static str;
}

/// Gemini `generateContent` over REST.
pub struct GeminiTransport {
    client: Client,
    api_url: String,
    model: String,
}

#[derive(Serialize, Debug)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Serialize, Debug)]
struct RequestContent<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize, Debug)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize, Debug)]
pub(crate) struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Deserialize, Debug)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Debug)]
struct ResponsePart {
    text: Option<String>,
}

impl GeminiTransport {
    pub fn new(config: &ModelConfig) -> InterpretResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| InterpretError::ModelInvocation {
                reason: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            model: config.model.trim_start_matches("models/").to_string(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_url, self.model)
    }
}

#[async_trait]
impl CompletionTransport for GeminiTransport {
    async fn complete(&self, api_key: &str, prompt: &str) -> InterpretResult<String> {
        let body = GenerateRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| InterpretError::ModelInvocation {
                reason: if e.is_timeout() {
                    "Request timeout - the API took too long to respond".to_string()
                } else if e.is_connect() {
                    "Connection error - unable to reach the API".to_string()
                } else {
                    format!("Network error: {}", e)
                },
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(InterpretError::ModelInvocation {
                reason: match status.as_u16() {
                    400 => format!("Bad request: {}", error_text),
                    401 | 403 => "Authentication failed - check your API key".to_string(),
                    429 => "Rate limit exceeded - too many requests".to_string(),
                    500..=599 => format!("Server error ({}): {}", status, error_text),
                    _ => format!("HTTP error {}: {}", status, error_text),
                },
            });
        }

        let parsed: GenerateResponse =
            response
                .json()
                .await
                .map_err(|e| InterpretError::ModelInvocation {
                    reason: format!("Failed to parse API response as JSON: {}", e),
                })?;

        candidate_text(parsed)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

/// Concatenated text parts of the first candidate.
pub(crate) fn candidate_text(response: GenerateResponse) -> InterpretResult<String> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(InterpretError::ModelInvocation {
            reason: "API returned empty content".to_string(),
        });
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_accepts_prefixed_model_ids() {
        let config = ModelConfig {
            model: "models/gemini-1.5-flash-latest".to_string(),
            api_url: "https://example.test/v1beta/".to_string(),
            ..Default::default()
        };
        let transport = GeminiTransport::new(&config).unwrap();
        assert_eq!(
            transport.endpoint(),
            "https://example.test/v1beta/models/gemini-1.5-flash-latest:generateContent"
        );
    }

    #[test]
    fn request_body_matches_generate_content_shape() {
        let body = GenerateRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: "draw" }],
            }],
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"contents": [{"role": "user", "parts": [{"text": "draw"}]}]})
        );
    }

    #[test]
    fn candidate_text_joins_parts() {
        let response: GenerateResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "{\"shapes\""}, {"text": ": []}"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(candidate_text(response).unwrap(), r#"{"shapes": []}"#);
    }

    #[test]
    fn missing_candidates_is_an_invocation_error() {
        let response: GenerateResponse =
            serde_json::from_str(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#).unwrap();
        assert!(matches!(
            candidate_text(response),
            Err(InterpretError::ModelInvocation { .. })
        ));
    }
}
