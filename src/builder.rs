use std::sync::Arc;
use std::time::Duration;

use crate::config::ExtractConfig;
use crate::orchestrator::{Capabilities, Orchestrator};
use crate::providers::{CompletionProvider, TranscriptionProvider};
use crate::url_to_text::fetchers::PageFetcher;
use crate::url_to_text::html::extractors::SchemaOrgScraper;
use crate::video::VideoResolver;
use crate::{ExtractError, Recipe};

/// Completion provider selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    OpenAI,
    Anthropic,
    Ollama,
}

impl LlmProvider {
    /// Convert to provider name string used by the factory
    fn as_str(&self) -> &str {
        match self {
            LlmProvider::OpenAI => "openai",
            LlmProvider::Anthropic => "anthropic",
            LlmProvider::Ollama => "ollama",
        }
    }
}

/// Builder for configuring and running one recipe extraction
#[derive(Default)]
pub struct RecipeExtractorBuilder {
    url: Option<String>,
    config: Option<ExtractConfig>,
    provider: Option<LlmProvider>,
    timeout: Option<Duration>,
    api_key: Option<String>,
    model: Option<String>,
    without_video: bool,
    without_audio: bool,
    fetcher: Option<Arc<dyn PageFetcher>>,
    completion: Option<Arc<dyn CompletionProvider>>,
    transcriber: Option<Arc<dyn TranscriptionProvider>>,
    video_resolver: Option<Arc<dyn VideoResolver>>,
}

impl RecipeExtractorBuilder {
    /// Set the recipe URL (a web page or a video)
    ///
    /// # Example
    /// ```
    /// use recipe_extract::RecipeExtractor;
    ///
    /// let builder = RecipeExtractor::builder()
    ///     .url("https://example.com/recipe");
    /// ```
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Start from an explicit configuration instead of `recipe-extract.toml` + environment
    pub fn config(mut self, config: ExtractConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the completion provider
    ///
    /// # Example
    /// ```
    /// use recipe_extract::{RecipeExtractor, LlmProvider};
    ///
    /// let builder = RecipeExtractor::builder()
    ///     .url("https://example.com/recipe")
    ///     .provider(LlmProvider::Anthropic);
    /// ```
    pub fn provider(mut self, provider: LlmProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set a timeout for page and caption fetches
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Set the API key for the completion provider
    ///
    /// This allows passing the API key directly instead of relying on
    /// environment variables or config files.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the model name for the completion provider
    ///
    /// # Example
    /// ```
    /// use recipe_extract::{RecipeExtractor, LlmProvider};
    ///
    /// let builder = RecipeExtractor::builder()
    ///     .url("https://example.com/recipe")
    ///     .provider(LlmProvider::Anthropic)
    ///     .model("claude-3-5-haiku-20241022");
    /// ```
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Skip the video strategy
    pub fn without_video(mut self) -> Self {
        self.without_video = true;
        self
    }

    /// Keep the video strategy but never download audio for transcription
    pub fn without_audio_transcription(mut self) -> Self {
        self.without_audio = true;
        self
    }

    /// Use a custom page fetcher for pages and caption payloads
    pub fn fetcher(mut self, fetcher: Arc<dyn PageFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Use a custom completion provider instead of building one from configuration
    pub fn completion_provider(mut self, provider: Arc<dyn CompletionProvider>) -> Self {
        self.completion = Some(provider);
        self
    }

    /// Use a custom speech-to-text provider
    pub fn transcriber(mut self, transcriber: Arc<dyn TranscriptionProvider>) -> Self {
        self.transcriber = Some(transcriber);
        self
    }

    /// Use a custom video resolver instead of yt-dlp
    pub fn video_resolver(mut self, resolver: Arc<dyn VideoResolver>) -> Self {
        self.video_resolver = Some(resolver);
        self
    }

    fn resolve_config(&mut self) -> Result<ExtractConfig, ExtractError> {
        let mut config = match self.config.take() {
            Some(config) => config,
            None => ExtractConfig::load()?,
        };
        if let Some(provider) = self.provider {
            config.llm.provider = provider.as_str().to_string();
        }
        if let Some(key) = self.api_key.take() {
            config.llm.api_key = Some(key);
        }
        if let Some(model) = self.model.take() {
            config.llm.model = model;
        }
        if let Some(timeout) = self.timeout {
            config.http.timeout_secs = timeout.as_secs().max(1);
        }
        if self.without_video {
            config.video.enabled = false;
        }
        if self.without_audio {
            config.video.transcribe_audio = false;
        }
        Ok(config)
    }

    /// Build the orchestrator without running it
    pub fn build_orchestrator(mut self) -> Result<Orchestrator, ExtractError> {
        let config = self.resolve_config()?;
        let mut capabilities = Capabilities::from_config(&config)?;

        if let Some(fetcher) = self.fetcher {
            capabilities.scraper =
                Arc::new(SchemaOrgScraper::new(fetcher.clone(), config.http.timeout()));
            capabilities.fetcher = fetcher;
        }
        if let Some(completion) = self.completion {
            capabilities.completion = Some(completion);
        }
        if let Some(transcriber) = self.transcriber {
            capabilities.transcriber = Some(transcriber);
        }
        if let Some(resolver) = self.video_resolver {
            capabilities.video_resolver = resolver;
        }

        Ok(Orchestrator::with_capabilities(&config, capabilities))
    }

    /// Run the extraction
    ///
    /// # Errors
    /// Returns `ExtractError` if:
    /// - No URL was specified, or the URL is blank
    /// - Configuration could not be loaded
    /// - Every strategy failed
    ///
    /// # Example
    /// ```no_run
    /// # use recipe_extract::RecipeExtractor;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let recipe = RecipeExtractor::builder()
    ///     .url("https://example.com/recipe")
    ///     .build()
    ///     .await?;
    /// println!("{}", recipe.title);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn build(mut self) -> Result<Recipe, ExtractError> {
        let url = self.url.take().ok_or_else(|| {
            ExtractError::InvalidUrl("No URL specified. Use .url()".to_string())
        })?;
        self.build_orchestrator()?.extract(&url).await
    }
}

/// Main entry point for the builder API
pub struct RecipeExtractor;

impl RecipeExtractor {
    /// Creates a new builder for extracting a recipe
    ///
    /// # Example
    /// ```
    /// use recipe_extract::RecipeExtractor;
    ///
    /// let builder = RecipeExtractor::builder();
    /// ```
    pub fn builder() -> RecipeExtractorBuilder {
        RecipeExtractorBuilder::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ExtractionMethod;

    #[test]
    fn test_overrides_apply_to_config() {
        let mut builder = RecipeExtractor::builder()
            .config(ExtractConfig::default())
            .provider(LlmProvider::Anthropic)
            .api_key("k")
            .model("claude-3-5-haiku-20241022")
            .timeout(Duration::from_secs(20))
            .without_video()
            .without_audio_transcription();
        let config = builder.resolve_config().unwrap();
        assert_eq!(config.llm.provider, "anthropic");
        assert_eq!(config.llm.api_key.as_deref(), Some("k"));
        assert_eq!(config.llm.model, "claude-3-5-haiku-20241022");
        assert_eq!(config.http.timeout_secs, 20);
        assert!(!config.video.enabled);
        assert!(!config.video.transcribe_audio);
    }

    #[test]
    fn test_strategy_order() {
        let orchestrator = RecipeExtractor::builder()
            .config(ExtractConfig::default())
            .provider(LlmProvider::Ollama)
            .build_orchestrator()
            .unwrap();
        assert_eq!(
            orchestrator.methods(),
            vec![
                ExtractionMethod::StructuredData,
                ExtractionMethod::HtmlHeuristic,
                ExtractionMethod::Video
            ]
        );

        let without_video = RecipeExtractor::builder()
            .config(ExtractConfig::default())
            .provider(LlmProvider::Ollama)
            .without_video()
            .build_orchestrator()
            .unwrap();
        assert_eq!(without_video.methods().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_url() {
        let result = RecipeExtractor::builder()
            .config(ExtractConfig::default())
            .build()
            .await;
        assert!(matches!(result, Err(ExtractError::InvalidUrl(_))));
    }
}
