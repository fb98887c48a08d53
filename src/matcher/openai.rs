// src/matcher/openai.rs
// =============================================================================
// The text-generation seam.
//
// TextGenerator is the only thing the matcher needs from the outside world:
// send a prompt, get text back. OpenAIClient implements it against any
// OpenAI-compatible /chat/completions endpoint with a single request; there
// are no retries. Every request is bounded by the client timeout, so a
// stalled endpoint turns into a Network error instead of a hang.
// =============================================================================

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::MatchError;

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Sends `prompt` as a single user message and returns the reply text.
    async fn generate(&self, prompt: &str, temperature: f64) -> Result<String, MatchError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

#[derive(Clone)]
pub struct OpenAIClient {
    http_client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAIClient {
    // Creates a client whose requests give up after `timeout`
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, MatchError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MatchError::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_key: api_key.into(),
            base_url: crate::config::DEFAULT_BASE_URL.to_string(),
            model: model.into(),
        })
    }

    // Fails when OPENAI_API_KEY was not configured
    pub fn from_config(config: &Config) -> Result<Self, MatchError> {
        let api_key = config.require_api_key()?;
        Ok(
            Self::new(api_key, config.model.clone(), config.llm_timeout)?
                .with_base_url(config.base_url.clone()),
        )
    }

    /// Set a custom base URL (proxies, compatible servers, tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl TextGenerator for OpenAIClient {
    async fn generate(&self, prompt: &str, temperature: f64) -> Result<String, MatchError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature,
        };

        debug!(model = %self.model, prompt_len = prompt.len(), "sending chat completion");

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "chat completion request failed");
                MatchError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(%status, error = %error_text, "chat completion API error");
            return Err(MatchError::Api(format!("HTTP {}: {}", status.as_u16(), error_text)));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| MatchError::Parse(e.to_string()))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| MatchError::Parse("no message content in response".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> OpenAIClient {
        OpenAIClient::new("test-key", "gpt-4o", Duration::from_secs(5))
            .unwrap()
            .with_base_url(server.uri())
    }

    #[tokio::test]
    async fn test_generate_returns_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-4o",
                "messages": [{"role": "user", "content": "hello"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "https://example.com/privacy"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = client_for(&server).generate("hello", 0.2).await.unwrap();
        assert_eq!(text, "https://example.com/privacy");
    }

    #[tokio::test]
    async fn test_api_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let err = client_for(&server).generate("hello", 0.2).await.unwrap_err();
        assert!(matches!(err, MatchError::Api(ref msg) if msg.contains("401")));
    }

    #[tokio::test]
    async fn test_malformed_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})))
            .mount(&server)
            .await;

        let err = client_for(&server).generate("hello", 0.2).await.unwrap_err();
        assert!(matches!(err, MatchError::Parse(_)));
    }

    #[tokio::test]
    async fn test_stalled_endpoint_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({
                        "choices": [{"message": {"content": "too late"}}]
                    }))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let client = OpenAIClient::new("test-key", "gpt-4o", Duration::from_millis(200))
            .unwrap()
            .with_base_url(server.uri());
        let err = client.generate("hello", 0.2).await.unwrap_err();
        assert!(matches!(err, MatchError::Network(_)));
    }

    #[test]
    fn test_from_config_requires_key() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert!(matches!(
            OpenAIClient::from_config(&config),
            Err(MatchError::Config(_))
        ));

        let config = Config::from_lookup(|name| {
            (name == "OPENAI_API_KEY").then(|| "sk-test".to_string())
        })
        .unwrap();
        let client = OpenAIClient::from_config(&config).unwrap();
        assert_eq!(client.model(), "gpt-4o");
    }
}
