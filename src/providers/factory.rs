use crate::config::{ExtractConfig, LlmConfig};
use crate::providers::{
    AnthropicProvider, CompletionProvider, OllamaProvider, OpenAIProvider, TranscriptionProvider,
    WhisperTranscriber,
};
use std::error::Error;
use std::sync::Arc;

pub struct ProviderFactory;

impl ProviderFactory {
    /// Create a completion provider instance from configuration
    pub fn create(
        config: &LlmConfig,
    ) -> Result<Arc<dyn CompletionProvider>, Box<dyn Error + Send + Sync>> {
        match config.provider.as_str() {
            "openai" => Ok(Arc::new(OpenAIProvider::new(config)?)),
            "anthropic" => Ok(Arc::new(AnthropicProvider::new(config)?)),
            "ollama" => Ok(Arc::new(OllamaProvider::new(config)?)),
            other => Err(format!("Unknown provider: {}", other).into()),
        }
    }

    /// Create the speech-to-text provider, if audio transcription is enabled
    pub fn create_transcriber(
        config: &ExtractConfig,
    ) -> Result<Option<Arc<dyn TranscriptionProvider>>, Box<dyn Error + Send + Sync>> {
        if !config.video.enabled || !config.video.transcribe_audio {
            return Ok(None);
        }
        let transcriber = WhisperTranscriber::new(
            &config.llm,
            &config.video.transcription_model,
            config.video.timeout(),
        )?;
        Ok(Some(Arc::new(transcriber)))
    }

    /// List all available provider names
    pub fn available_providers() -> Vec<&'static str> {
        vec!["openai", "anthropic", "ollama"]
    }
}
