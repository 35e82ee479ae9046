//! Chat-completion client
//!
//! The pipeline talks to an OpenAI-compatible chat endpoint (DeepSeek by
//! default) through the [`ChatClient`] trait, so tests can substitute
//! scripted clients without a network.

use crate::error::{AnalysisError, AnalysisResult};
use async_trait::async_trait;
use meetbrief_core::LlmConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One chat-completion request
#[derive(Debug, Clone)]
pub struct ChatPrompt {
    /// System instruction
    pub system: String,

    /// User content
    pub user: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Response token cap
    pub max_tokens: u32,
}

impl ChatPrompt {
    /// Build a prompt with the given sampling settings
    #[must_use]
    pub fn new(
        system: impl Into<String>,
        user: impl Into<String>,
        temperature: f32,
        max_tokens: u32,
    ) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            temperature,
            max_tokens,
        }
    }
}

/// Chat-completion backend contract
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Send a prompt and return the assistant's text reply
    async fn chat(&self, prompt: ChatPrompt) -> AnalysisResult<String>;
}

/// OpenAI-compatible chat client (DeepSeek API)
#[derive(Debug, Clone)]
pub struct DeepSeekClient {
    http: reqwest::Client,
    config: LlmConfig,
}

impl DeepSeekClient {
    /// Create a client from configuration
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Configuration`] when no API key is set, and
    /// propagates HTTP client construction failures.
    pub fn new(config: LlmConfig) -> AnalysisResult<Self> {
        if config.api_key.is_empty() {
            return Err(AnalysisError::configuration("llm.api_key is not set"));
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self { http, config })
    }
}

#[async_trait]
impl ChatClient for DeepSeekClient {
    async fn chat(&self, prompt: ChatPrompt) -> AnalysisResult<String> {
        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: prompt.system,
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.user,
                },
            ],
            temperature: prompt.temperature,
            max_tokens: prompt.max_tokens,
        };

        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        debug!(model = %request.model, "sending chat completion request");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Backend { status, body });
        }

        let completion: ChatCompletionResponse = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or(AnalysisError::EmptyResponse)
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base_url: String) -> LlmConfig {
        LlmConfig {
            api_key: "sk-test".to_string(),
            base_url,
            model: "deepseek-chat".to_string(),
            timeout_seconds: 5,
        }
    }

    #[test]
    fn test_new_requires_api_key() {
        let result = DeepSeekClient::new(LlmConfig::default());
        assert!(matches!(
            result,
            Err(AnalysisError::Configuration { .. })
        ));
    }

    #[tokio::test]
    async fn test_chat_returns_first_choice_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [
                    {"message": {"role": "assistant", "content": "## Topic\nRelease planning"}}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = DeepSeekClient::new(config(server.uri())).unwrap();
        let reply = client
            .chat(ChatPrompt::new("be helpful", "summarize", 0.3, 1000))
            .await
            .unwrap();

        assert_eq!(reply, "## Topic\nRelease planning");
    }

    #[tokio::test]
    async fn test_chat_surfaces_backend_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;

        let client = DeepSeekClient::new(config(server.uri())).unwrap();
        let error = client
            .chat(ChatPrompt::new("sys", "user", 0.2, 100))
            .await
            .unwrap_err();

        match error {
            AnalysisError::Backend { status, body } => {
                assert_eq!(status, 429);
                assert_eq!(body, "slow down");
            }
            other => panic!("expected backend error, got {other}"),
        }
    }

    #[tokio::test]
    async fn test_chat_rejects_empty_choices() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"choices": []})),
            )
            .mount(&server)
            .await;

        let client = DeepSeekClient::new(config(server.uri())).unwrap();
        let error = client
            .chat(ChatPrompt::new("sys", "user", 0.2, 100))
            .await
            .unwrap_err();

        assert!(matches!(error, AnalysisError::EmptyResponse));
    }
}
