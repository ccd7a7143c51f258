mod anthropic;
mod factory;
mod ollama;
mod open_ai;
mod prompt;

pub use anthropic::AnthropicProvider;
pub use factory::ProviderFactory;
pub use ollama::OllamaProvider;
pub use open_ai::{OpenAIProvider, WhisperTranscriber};
pub use prompt::{build_extraction_prompt, RECIPE_EXTRACTION_PROMPT};

use async_trait::async_trait;
use std::error::Error;
use std::path::Path;

pub type ProviderResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

/// Generative-text completion capability
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Get the provider name (e.g., "openai", "anthropic")
    fn provider_name(&self) -> &str;

    /// Run one completion and return the model's raw text
    async fn complete(&self, prompt: &str, max_tokens: u32, temperature: f32)
        -> ProviderResult<String>;
}

/// Speech-to-text capability
#[async_trait]
pub trait TranscriptionProvider: Send + Sync {
    async fn transcribe(&self, audio_file: &Path, language_hint: &str) -> ProviderResult<String>;
}
