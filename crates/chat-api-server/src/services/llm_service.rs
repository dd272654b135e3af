use crate::config::LlmConfig;
use crate::models::chat::ChatMessage;
use crate::utils::error::ApiError;
use anyhow::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Given the full conversation, produce the model's next message
#[async_trait::async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: Option<String>,
}

/// OpenAI-compatible chat completions client (OpenRouter by default)
#[derive(Clone)]
pub struct LlmService {
    client: Client,
    config: LlmConfig,
}

impl LlmService {
    pub fn new(config: LlmConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ApiError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Generate completion without streaming (wait for full response)
    pub async fn generate_chat(&self, messages: &[ChatMessage]) -> Result<String, ApiError> {
        debug!(
            "Requesting completion from {} with {} messages",
            self.config.model,
            messages.len()
        );

        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let response = self
            .client
            .post(format!(
                "{}/chat/completions",
                self.config.base_url.trim_end_matches('/')
            ))
            .bearer_auth(&self.config.api_token)
            .json(&request)
            .send()
            .await
            .map_err(|e| ApiError::Provider(format!("Failed to call LLM API: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Provider(format!(
                "LLM API error: {} - {}",
                status, body
            )));
        }

        let chat_response: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Provider(format!("Failed to parse LLM response: {}", e)))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ApiError::Provider("No content returned from LLM".to_string()))
    }
}

#[async_trait::async_trait]
impl CompletionClient for LlmService {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        self.generate_chat(messages)
            .await
            .map_err(|e| anyhow::anyhow!(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn service(base_url: String) -> LlmService {
        LlmService::new(LlmConfig {
            base_url,
            api_token: "sk-test".to_string(),
            model: "openrouter/quasar-alpha".to_string(),
            timeout_seconds: 5,
            max_tokens: None,
            temperature: None,
        })
        .unwrap()
    }

    fn conversation() -> Vec<ChatMessage> {
        vec![
            ChatMessage::system("Eres un guia."),
            ChatMessage::user("¿Hay leopardos en la Albufera?"),
        ]
    }

    #[tokio::test]
    async fn test_returns_first_choice_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "openrouter/quasar-alpha",
                "messages": [
                    {"role": "system", "content": "Eres un guia."},
                    {"role": "user", "content": "¿Hay leopardos en la Albufera?"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "No, no hay leopardos."}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = service(server.uri()).complete(&conversation()).await.unwrap();
        assert_eq!(reply, "No, no hay leopardos.");
    }

    #[tokio::test]
    async fn test_http_error_is_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid token"))
            .mount(&server)
            .await;

        let err = service(server.uri())
            .generate_chat(&conversation())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Provider(ref msg) if msg.contains("401")));
    }

    #[tokio::test]
    async fn test_malformed_body_is_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = service(server.uri())
            .generate_chat(&conversation())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Provider(_)));
    }

    #[tokio::test]
    async fn test_empty_choices_is_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let err = service(server.uri())
            .generate_chat(&conversation())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Provider(_)));
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_error() {
        // Nothing listens on the discard port
        let result = service("http://127.0.0.1:9".to_string())
            .complete(&conversation())
            .await;
        assert!(result.is_err());
    }
}
