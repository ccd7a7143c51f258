use crate::config::LlmConfig;
use crate::providers::{CompletionProvider, ProviderResult};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::time::Duration;

/// Local models served by Ollama, through its native generate endpoint.
///
/// Requests ask for JSON output (`format: "json"`), which the recipe prompt
/// expects anyway.
pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    format: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
    error: Option<String>,
}

impl OllamaProvider {
    pub fn new(config: &LlmConfig) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| "http://localhost:11434".to_string());

        Ok(OllamaProvider {
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl CompletionProvider for OllamaProvider {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    async fn complete(
        &self,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> ProviderResult<String> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            format: "json",
            stream: false,
            options: GenerateOptions {
                temperature,
                num_predict: max_tokens,
            },
        };
        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await?;
        let status = response.status();
        let body: GenerateResponse = response.json().await?;

        if let Some(error) = body.error {
            return Err(format!("Ollama error ({status}): {error}").into());
        }
        if !status.is_success() {
            return Err(format!("Ollama request failed with status: {status}").into());
        }
        debug!("Ollama response: {}", body.response);
        Ok(body.response)
    }
}
