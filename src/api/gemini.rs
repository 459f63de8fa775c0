//! Google Gemini `generateContent` client.
//!
//! The generation config is fixed and deterministic-leaning (temperature from
//! settings, `topK = 1`, one candidate). This keeps the reply close to the
//! two-line format the prompt asks for.

use super::GenerativeModel;
use crate::config::ModelSettings;
use crate::error::AppError;
use crate::utils::truncate_for_log;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_k: u32,
    pub candidate_count: u32,
    pub max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
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

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Client for one Gemini model.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
    generation_config: GenerationConfig,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("generation_config", &self.generation_config)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    pub fn new(settings: &ModelSettings, api_key: String) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| AppError::Config(format!("cannot build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            model: settings.name.clone(),
            api_key,
            generation_config: GenerationConfig {
                temperature: settings.temperature,
                top_k: 1,
                candidate_count: 1,
                max_output_tokens: settings.max_output_tokens,
            },
        })
    }

    pub fn generate_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    fn request_body<'a>(&self, prompt: &'a str) -> GenerateRequest<'a> {
        GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            generation_config: self.generation_config.clone(),
        }
    }
}

impl GenerativeModel for GeminiClient {
    #[instrument(level = "info", skip_all, fields(model = %self.model))]
    async fn generate(&self, prompt: &str) -> Result<String, AppError> {
        let response = self
            .client
            .post(self.generate_url())
            .header("x-goog-api-key", &self.api_key)
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(AppError::model_transport)?;

        let status = response.status();
        let body = response.text().await.map_err(AppError::model_transport)?;

        if !status.is_success() {
            warn!(status = status.as_u16(), body = %truncate_for_log(&body, 300), "Gemini returned an error status");
            return Err(status_error(status, &body));
        }
        extract_text(&body)
    }
}

fn status_error(status: StatusCode, body: &str) -> AppError {
    let message = serde_json::from_str::<ApiErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| truncate_for_log(body, 300));
    let mut detail = format!("HTTP {}: {message}", status.as_u16());
    if status == StatusCode::TOO_MANY_REQUESTS || message.to_lowercase().contains("quota") {
        detail.push_str(" | This might be a rate limit or quota issue. Please check your API usage.");
    }
    AppError::ModelUnavailable(detail)
}

/// Pull the completion text out of a successful response body.
fn extract_text(body: &str) -> Result<String, AppError> {
    let parsed: GenerateResponse = serde_json::from_str(body).map_err(|e| {
        AppError::ModelUnavailable(format!(
            "malformed response ({e}): {}",
            truncate_for_log(body, 300)
        ))
    })?;

    let Some(candidate) = parsed.candidates.into_iter().next() else {
        let reason = parsed
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .map(|r| format!(" | Block Reason: {r}"))
            .unwrap_or_default();
        return Err(AppError::ModelUnavailable(format!(
            "model returned no candidates{reason}"
        )));
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        let finish = candidate.finish_reason.unwrap_or_else(|| "unknown".to_string());
        return Err(AppError::ModelUnavailable(format!(
            "candidate contained no text (finish reason: {finish})"
        )));
    }
    debug!(reply = %truncate_for_log(&text, 200), "Gemini reply");
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GeminiClient {
        GeminiClient::new(&ModelSettings::default(), "g-secret".to_string()).unwrap()
    }

    #[test]
    fn test_generate_url() {
        assert_eq!(
            client().generate_url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn test_request_body_shape() {
        let value = serde_json::to_value(client().request_body("Assess this")).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "contents": [{"role": "user", "parts": [{"text": "Assess this"}]}],
                "generationConfig": {
                    "temperature": 0.0,
                    "topK": 1,
                    "candidateCount": 1,
                    "maxOutputTokens": 512
                }
            })
        );
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"Estimated Credibility: Credible\n"},{"text":"Reasoning: Reuters."}],"role":"model"},"finishReason":"STOP"}]}"#;
        assert_eq!(
            extract_text(body).unwrap(),
            "Estimated Credibility: Credible\nReasoning: Reuters."
        );
    }

    #[test]
    fn test_extract_text_reports_block_reason() {
        let body = r#"{"candidates":[],"promptFeedback":{"blockReason":"SAFETY"}}"#;
        let err = extract_text(body).unwrap_err();
        assert!(err.to_string().contains("Block Reason: SAFETY"), "{err}");
    }

    #[test]
    fn test_extract_text_rejects_textless_candidate() {
        let body = r#"{"candidates":[{"finishReason":"MAX_TOKENS"}]}"#;
        let err = extract_text(body).unwrap_err();
        assert!(err.to_string().contains("MAX_TOKENS"), "{err}");
    }

    #[test]
    fn test_status_error_flags_quota() {
        let body = r#"{"error":{"code":429,"message":"Resource has been exhausted","status":"RESOURCE_EXHAUSTED"}}"#;
        let err = status_error(StatusCode::TOO_MANY_REQUESTS, body);
        let text = err.to_string();
        assert!(text.contains("HTTP 429: Resource has been exhausted"), "{text}");
        assert!(text.contains("quota"), "{text}");
    }

    #[test]
    fn test_status_error_falls_back_to_raw_body() {
        let err = status_error(StatusCode::BAD_GATEWAY, "upstream died");
        assert_eq!(err.to_string(), "Model unavailable: HTTP 502: upstream died");
    }

    #[test]
    fn test_debug_hides_api_key() {
        assert!(!format!("{:?}", client()).contains("g-secret"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_model_unavailable() {
        let mut settings = ModelSettings::default();
        settings.endpoint = "http://127.0.0.1:9".to_string();
        settings.timeout_secs = 2;
        let client = GeminiClient::new(&settings, "k".to_string()).unwrap();
        let err = client.generate("hello").await.unwrap_err();
        assert!(matches!(err, AppError::ModelUnavailable(_)));
    }
}
