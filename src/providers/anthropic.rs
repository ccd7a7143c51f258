use crate::config::LlmConfig;
use crate::providers::{CompletionProvider, ProviderResult};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::time::Duration;

const API_VERSION: &str = "2023-06-01";

/// The assistant turn is pre-filled with `{` so the reply starts inside the JSON object.
const JSON_PREFILL: &str = "{";

pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: [Message<'a>; 2],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    message: String,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider from configuration
    pub fn new(config: &LlmConfig) -> Result<Self, Box<dyn Error + Send + Sync>> {
        // Try config first, then fall back to environment variable
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
            .ok_or("ANTHROPIC_API_KEY not found in config or environment")?;

        Ok(AnthropicProvider {
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()?,
            api_key,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| "https://api.anthropic.com".to_string()),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl CompletionProvider for AnthropicProvider {
    fn provider_name(&self) -> &str {
        "anthropic"
    }

    async fn complete(
        &self,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> ProviderResult<String> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens,
            temperature,
            messages: [
                Message {
                    role: "user",
                    content: prompt,
                },
                Message {
                    role: "assistant",
                    content: JSON_PREFILL,
                },
            ],
        };
        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await?;
        let status = response.status();
        let body: MessagesResponse = response.json().await?;

        if let Some(error) = body.error {
            return Err(format!("Anthropic API error ({status}) {}: {}", error.kind, error.message).into());
        }

        let text: String = body.content.into_iter().map(|block| block.text).collect();
        if text.is_empty() {
            return Err("Anthropic response had no text content".into());
        }
        debug!("Anthropic response: {}", text);
        Ok(format!("{JSON_PREFILL}{text}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn provider(url: String, key: &str) -> AnthropicProvider {
        AnthropicProvider::new(&LlmConfig {
            provider: "anthropic".to_string(),
            model: "claude-3-5-haiku-latest".to_string(),
            api_key: Some(key.to_string()),
            base_url: Some(url),
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_prefilled_reply_is_completed() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/messages")
            .match_header("x-api-key", "fake_api_key")
            .match_header("anthropic-version", API_VERSION)
            .match_body(Matcher::PartialJson(serde_json::json!({
                "messages": [{"role": "user"}, {"role": "assistant", "content": "{"}]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"content": [{"type": "text", "text": "\"ingredients\": []}"}]}"#)
            .create_async()
            .await;

        let text = provider(server.url(), "fake_api_key")
            .complete("prompt", 800, 0.1)
            .await
            .unwrap();
        assert_eq!(text, r#"{"ingredients": []}"#);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_body() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/messages")
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(r#"{"type": "error", "error": {"type": "authentication_error", "message": "invalid x-api-key"}}"#)
            .create_async()
            .await;

        let err = provider(server.url(), "bad")
            .complete("prompt", 800, 0.1)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("authentication_error"));
    }
}
