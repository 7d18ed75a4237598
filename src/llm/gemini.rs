//! Google Gemini completion backend.
//!
//! Speaks the `generateContent` REST API with an API key from config or the
//! `GEMINI_API_KEY` / `GOOGLE_API_KEY` environment variables. Generation
//! parameters are tuned for short, low-variance supportive replies.

use super::traits::CompletionBackend;
use crate::sessions::{ConversationTurn, TurnRole};
use anyhow::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const MAX_OUTPUT_TOKENS: u32 = 300;
const TOP_P: f64 = 0.8;
const TOP_K: u32 = 40;

pub struct GeminiBackend {
    api_key: Option<String>,
    model: String,
    temperature: f64,
    base_url: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f64,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    #[serde(rename = "topP")]
    top_p: f64,
    #[serde(rename = "topK")]
    top_k: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

impl GeminiBackend {
    /// Key resolution order: explicit key, then `GEMINI_API_KEY`, then
    /// `GOOGLE_API_KEY`. A missing key only fails at request time, so the
    /// crisis path keeps working without credentials.
    pub fn new(
        api_key: Option<&str>,
        model: &str,
        temperature: f64,
        timeout: Duration,
    ) -> Result<Self> {
        let resolved_key = api_key
            .map(String::from)
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .or_else(|| std::env::var("GOOGLE_API_KEY").ok());

        Ok(Self {
            api_key: resolved_key,
            model: model.to_string(),
            temperature,
            base_url: DEFAULT_BASE_URL.to_string(),
            client: Client::builder().timeout(timeout).build()?,
        })
    }

    /// Point the backend at a different host. Used by tests.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn model_name(model: &str) -> String {
        if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{model}")
        }
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            anyhow::anyhow!(
                "Gemini API key not found. Set GEMINI_API_KEY (or GOOGLE_API_KEY), \
                 or put api_key under [backend] in opora.toml"
            )
        })
    }

    fn map_turn(turn: &ConversationTurn) -> Content {
        let role = match turn.role {
            TurnRole::User => "user",
            TurnRole::Assistant => "model",
        };
        Content {
            role: Some(role.to_string()),
            parts: vec![Part {
                text: Some(turn.content.clone()),
            }],
        }
    }

    fn build_request(
        &self,
        system_prompt: &str,
        history: &[ConversationTurn],
        message: &str,
    ) -> GenerateContentRequest {
        let mut contents: Vec<Content> = history.iter().map(Self::map_turn).collect();
        contents.push(Content {
            role: Some("user".to_string()),
            parts: vec![Part {
                text: Some(message.to_string()),
            }],
        });

        GenerateContentRequest {
            contents,
            system_instruction: Some(Content {
                role: None,
                parts: vec![Part {
                    text: Some(system_prompt.to_string()),
                }],
            }),
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: MAX_OUTPUT_TOKENS,
                top_p: TOP_P,
                top_k: TOP_K,
            },
        }
    }

    fn extract_text(result: &GenerateContentResponse) -> Result<String> {
        let text = result
            .candidates
            .as_ref()
            .and_then(|candidates| candidates.first())
            .map(|candidate| {
                let mut out = String::new();
                for part in &candidate.content.parts {
                    if let Some(t) = &part.text {
                        if !out.is_empty() {
                            out.push('\n');
                        }
                        out.push_str(t);
                    }
                }
                out
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            anyhow::bail!("no text in Gemini response");
        }
        Ok(text.trim().to_string())
    }

    async fn call_api(&self, request: &GenerateContentRequest) -> Result<GenerateContentResponse> {
        let api_key = self.api_key()?;
        let model_name = Self::model_name(&self.model);
        let url = format!("{}/{model_name}:generateContent?key={api_key}", self.base_url);

        let response = self.client.post(url).json(request).send().await.map_err(|e| {
            anyhow::anyhow!("Gemini request failed: {}", redact_api_key(&e.to_string()))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Gemini API error ({status}): {}", redact_api_key(&body));
        }

        let result: GenerateContentResponse = response.json().await?;
        if let Some(err) = result.error.as_ref() {
            anyhow::bail!("Gemini API error: {}", redact_api_key(&err.message));
        }
        Ok(result)
    }
}

/// Strip `key=...` query values before an error string reaches the logs.
fn redact_api_key(message: &str) -> String {
    let mut out = String::with_capacity(message.len());
    let mut rest = message;
    while let Some(idx) = rest.find("key=") {
        let (head, tail) = rest.split_at(idx + "key=".len());
        out.push_str(head);
        out.push_str("REDACTED");
        let value_end = tail
            .find(|c: char| c == '&' || c == '"' || c.is_whitespace())
            .unwrap_or(tail.len());
        rest = &tail[value_end..];
    }
    out.push_str(rest);
    out
}

impl CompletionBackend for GeminiBackend {
    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn describe(&self) -> String {
        format!("Google {}", self.model)
    }

    fn complete<'a>(
        &'a self,
        system_prompt: &'a str,
        history: &'a [ConversationTurn],
        message: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(async move {
            let request = self.build_request(system_prompt, history, message);
            let result = self.call_api(&request).await?;
            Self::extract_text(&result)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn backend(base_url: &str) -> GeminiBackend {
        GeminiBackend::new(
            Some("test-key"),
            "gemini-1.5-flash",
            0.7,
            Duration::from_secs(2),
        )
        .unwrap()
        .with_base_url(base_url)
    }

    #[test]
    fn model_name_prefixing() {
        assert_eq!(
            GeminiBackend::model_name("gemini-1.5-flash"),
            "models/gemini-1.5-flash"
        );
        assert_eq!(
            GeminiBackend::model_name("models/gemini-pro"),
            "models/gemini-pro"
        );
    }

    #[test]
    fn describe_names_the_vendor_and_model() {
        let backend = backend("http://localhost");
        assert_eq!(backend.describe(), "Google gemini-1.5-flash");
        assert_eq!(backend.name(), "gemini");
    }

    #[test]
    fn request_maps_roles_and_carries_generation_config() {
        let backend = backend("http://localhost");
        let history = vec![
            ConversationTurn::user("first"),
            ConversationTurn::assistant("reply"),
        ];
        let request = backend.build_request("be kind", &history, "second");

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][1]["role"], "model");
        assert_eq!(json["contents"][2]["role"], "user");
        assert_eq!(json["contents"][2]["parts"][0]["text"], "second");
        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "be kind");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 300);
        assert_eq!(json["generationConfig"]["topK"], 40);
    }

    #[test]
    fn redacts_key_query_values() {
        let message = "error for url https://example.test/v1beta/models/x:generateContent?key=SECRET123&alt=json";
        let redacted = redact_api_key(message);
        assert!(!redacted.contains("SECRET123"));
        assert!(redacted.contains("key=REDACTED"));
        assert!(redacted.contains("&alt=json"));
    }

    #[tokio::test]
    async fn complete_returns_candidate_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-1.5-flash:generateContent"))
            .and(body_partial_json(serde_json::json!({
                "generationConfig": {"temperature": 0.7}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": {"parts": [{"text": "  I'm listening.  "}]}
                }]
            })))
            .mount(&server)
            .await;

        let backend = backend(&server.uri());
        let reply = backend.complete("sys", &[], "hello").await.unwrap();
        assert_eq!(reply, "I'm listening.");
    }

    #[tokio::test]
    async fn http_error_is_reported_without_the_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limit"))
            .mount(&server)
            .await;

        let backend = backend(&server.uri());
        let err = backend.complete("sys", &[], "hello").await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("429"));
        assert!(!message.contains("test-key"));
    }

    #[tokio::test]
    async fn empty_candidates_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"candidates": []})),
            )
            .mount(&server)
            .await;

        let backend = backend(&server.uri());
        let err = backend.complete("sys", &[], "hello").await.unwrap_err();
        assert!(err.to_string().contains("no text"));
    }

    #[tokio::test]
    async fn missing_key_fails_at_request_time() {
        // Explicit empty resolution: construct directly without env fallback.
        let backend = GeminiBackend {
            api_key: None,
            model: "gemini-1.5-flash".to_string(),
            temperature: 0.7,
            base_url: "http://localhost:1".to_string(),
            client: Client::new(),
        };
        let err = backend.complete("sys", &[], "hello").await.unwrap_err();
        assert!(err.to_string().contains("API key"));
    }
}
