//! Gemini client for structured content recommendations.
//!
//! The prompt is sent with a response schema so the model answers with a
//! JSON object matching [`GeneratedRecommendation`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use trendbot_models::{structured_output_schema, GeneratedRecommendation};

use crate::error::{ClientError, ClientResult};
use crate::API_KEY_HEADER;

/// Generator of structured recommendations from a prompt.
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait RecommendationGenerator: Send + Sync {
    /// Generate a recommendation. Partial output is never returned.
    async fn generate(&self, prompt: &str) -> ClientResult<GeneratedRecommendation>;
}

/// Gemini configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key; empty when not configured
    pub api_key: String,
    /// Base URL of the Generative Language API
    pub base_url: String,
    /// Model name
    pub model: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-1.5-flash-latest".to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

impl GeminiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            api_key: std::env::var("GEMINI_API_KEY").unwrap_or_default(),
            base_url: std::env::var("GEMINI_API_BASE_URL").unwrap_or(defaults.base_url),
            model: std::env::var("GEMINI_MODEL").unwrap_or(defaults.model),
            timeout: std::env::var("GEMINI_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

/// Gemini API request.
#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'static str,
    #[serde(rename = "responseSchema")]
    response_schema: serde_json::Value,
}

/// Gemini API response.
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct PromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl GeminiResponse {
    fn into_text(self) -> ClientResult<String> {
        let Some(candidate) = self.candidates.into_iter().next() else {
            let reason = self
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .unwrap_or_else(|| "no candidates".to_string());
            return Err(ClientError::invalid_response(format!(
                "Gemini returned no content ({})",
                reason
            )));
        };

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ClientError::invalid_response(format!(
                "Gemini returned an empty candidate (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }

        Ok(text)
    }
}

/// Gemini API client.
#[derive(Clone)]
pub struct GeminiClient {
    http: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Create a new Gemini client.
    pub fn new(config: GeminiConfig) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("trendbot/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> ClientResult<Self> {
        Self::new(GeminiConfig::from_env())
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Call the generateContent endpoint and return the raw candidate text.
    async fn call_gemini_api(&self, prompt: &str) -> ClientResult<String> {
        if !self.config.is_configured() {
            return Err(ClientError::config("GEMINI_API_KEY not configured"));
        }

        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        );

        let request = GeminiRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: structured_output_schema(),
            },
        };

        let response = self
            .http
            .post(&url)
            .header(API_KEY_HEADER, self.config.api_key.as_str())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body: GeminiResponse = response.json().await?;
        body.into_text()
    }
}

#[async_trait]
impl RecommendationGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> ClientResult<GeneratedRecommendation> {
        info!(model = %self.config.model, "Requesting recommendations from Gemini");

        let result = match self.call_gemini_api(prompt).await {
            Ok(text) => parse_recommendation(&text),
            Err(e) => Err(e),
        };

        match &result {
            Ok(rec) => info!(
                titles = rec.titles.len(),
                hashtags = rec.hashtags.len(),
                "Parsed Gemini recommendation"
            ),
            Err(e) => warn!(model = %self.config.model, error = %e, "Gemini generation failed"),
        }

        result
    }
}

/// Parse model output into a recommendation, tolerating a markdown code fence.
pub fn parse_recommendation(text: &str) -> ClientResult<GeneratedRecommendation> {
    let text = strip_code_fence(text);
    debug!(len = text.len(), "Parsing recommendation JSON");

    serde_json::from_str(text).map_err(|e| {
        ClientError::invalid_response(format!("Failed to parse recommendation JSON: {}", e))
    })
}

fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    text.strip_suffix("```").unwrap_or(text).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MODEL_PATH: &str = "/models/gemini-1.5-flash-latest:generateContent";

    fn candidate_body(text: &str) -> serde_json::Value {
        json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] },
                "finishReason": "STOP"
            }]
        })
    }

    fn client(server: &MockServer) -> GeminiClient {
        let config = GeminiConfig::default()
            .with_api_key("test-key")
            .with_base_url(server.uri());
        GeminiClient::new(config).unwrap()
    }

    #[test]
    fn test_parse_plain_json() {
        let rec = parse_recommendation(
            r##"{"titles":["a","b"],"thumbnail_prompt":"neon desk","hashtags":["#x"]}"##,
        )
        .unwrap();
        assert_eq!(rec.titles, vec!["a", "b"]);
        assert_eq!(rec.thumbnail_prompt, "neon desk");
        assert_eq!(rec.hashtags, vec!["#x"]);
    }

    #[test]
    fn test_parse_fenced_json() {
        let text = "```json\n{\"titles\":[],\"thumbnail_prompt\":\"p\",\"hashtags\":[]}\n```";
        assert_eq!(parse_recommendation(text).unwrap().thumbnail_prompt, "p");

        let text = "```\n{\"titles\":[],\"thumbnail_prompt\":\"q\",\"hashtags\":[]}\n```";
        assert_eq!(parse_recommendation(text).unwrap().thumbnail_prompt, "q");
    }

    #[test]
    fn test_parse_rejects_missing_hashtags() {
        let err = parse_recommendation(r#"{"titles":["a"],"thumbnail_prompt":"p"}"#).unwrap_err();
        assert!(matches!(err, ClientError::InvalidResponse(_)));
        assert!(err.to_string().contains("hashtags"));
    }

    #[test]
    fn test_parse_rejects_non_json() {
        assert!(parse_recommendation("Here are some titles for you!").is_err());
    }

    #[tokio::test]
    async fn test_generate_sends_schema_and_parses() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .and(header(API_KEY_HEADER, "test-key"))
            .and(body_partial_json(json!({
                "contents": [{ "role": "user", "parts": [{ "text": "the prompt" }] }],
                "generationConfig": {
                    "responseMimeType": "application/json",
                    "responseSchema": { "type": "OBJECT" }
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body(
                r##"{"titles":["t1"],"thumbnail_prompt":"tp","hashtags":["#a","#b"]}"##,
            )))
            .expect(1)
            .mount(&server)
            .await;

        let rec = client(&server).generate("the prompt").await.unwrap();
        assert_eq!(rec.titles, vec!["t1"]);

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests[0].url.query(), None);
        assert_eq!(rec.hashtags.len(), 2);
    }

    #[tokio::test]
    async fn test_generate_missing_field_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body(
                r#"{"titles":["t1"],"thumbnail_prompt":"tp"}"#,
            )))
            .mount(&server)
            .await;

        let err = client(&server).generate("p").await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_generate_blocked_prompt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "promptFeedback": { "blockReason": "SAFETY" }
            })))
            .mount(&server)
            .await;

        let err = client(&server).generate("p").await.unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[tokio::test]
    async fn test_generate_upstream_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": { "code": 400, "message": "API key not valid. Please pass a valid API key." }
            })))
            .mount(&server)
            .await;

        match client(&server).generate("p").await.unwrap_err() {
            ClientError::Status { status, message } => {
                assert_eq!(status, 400);
                assert!(message.starts_with("API key not valid"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_generate_without_key_skips_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let config = GeminiConfig::default().with_base_url(server.uri());
        let err = GeminiClient::new(config).unwrap().generate("p").await.unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[tokio::test]
    async fn test_network_error_does_not_leak_key() {
        let config = GeminiConfig::default()
            .with_api_key("SECRET-GEMINI-KEY")
            .with_base_url("http://127.0.0.1:1");

        let err = GeminiClient::new(config)
            .unwrap()
            .generate("p")
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Network(_)));
        assert!(!err.to_string().contains("SECRET-GEMINI-KEY"));
    }
}
