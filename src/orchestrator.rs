use crate::config::ExtractConfig;
use crate::error::{ExtractError, StrategyError};
use crate::model::{ExtractionAttempt, ExtractionMethod, Recipe};
use crate::providers::{CompletionProvider, ProviderFactory, TranscriptionProvider};
use crate::strategies::{HtmlHeuristicStrategy, Strategy, StructuredDataStrategy, VideoStrategy};
use crate::url_to_text::fetchers::{HttpFetcher, PageFetcher};
use crate::url_to_text::html::extractors::{SchemaOrgScraper, StructuredScraper};
use crate::url_to_text::text::TextExtractor;
use crate::video::{AudioTranscriber, CaptionResolver, VideoResolver, YtDlpResolver};
use log::{error, info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// The external collaborators the strategies are built from.
#[derive(Clone)]
pub struct Capabilities {
    pub fetcher: Arc<dyn PageFetcher>,
    pub scraper: Arc<dyn StructuredScraper>,
    /// Without a model the heuristic and video strategies still run, with empty model fields.
    pub completion: Option<Arc<dyn CompletionProvider>>,
    pub transcriber: Option<Arc<dyn TranscriptionProvider>>,
    pub video_resolver: Arc<dyn VideoResolver>,
}

impl Capabilities {
    /// Default HTTP, schema.org, yt-dlp and configured model providers.
    ///
    /// A model or transcription provider that cannot be set up (usually a
    /// missing API key) is left out with a warning. An unknown provider name
    /// is a configuration mistake and fails with [`ExtractError::Provider`].
    pub fn from_config(config: &ExtractConfig) -> Result<Self, ExtractError> {
        if !ProviderFactory::available_providers().contains(&config.llm.provider.as_str()) {
            return Err(ExtractError::Provider(format!(
                "unknown completion provider '{}', expected one of: {}",
                config.llm.provider,
                ProviderFactory::available_providers().join(", ")
            )));
        }

        let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpFetcher::new());
        let completion = match ProviderFactory::create(&config.llm) {
            Ok(provider) => Some(provider),
            Err(e) => {
                warn!("Completion provider '{}' unavailable: {}", config.llm.provider, e);
                None
            }
        };
        let transcriber = ProviderFactory::create_transcriber(config).unwrap_or_else(|e| {
            warn!("Audio transcription unavailable: {}", e);
            None
        });

        Ok(Self {
            scraper: Arc::new(SchemaOrgScraper::new(fetcher.clone(), config.http.timeout())),
            fetcher,
            completion,
            transcriber,
            video_resolver: Arc::new(YtDlpResolver::new(&config.video.ytdlp_path)),
        })
    }
}

/// Runs strategies in priority order and returns the first recipe.
///
/// Every failed attempt is recorded; when all fail the caller gets
/// [`ExtractError::ExtractionFailed`] carrying the causes in order.
pub struct Orchestrator {
    strategies: Vec<Box<dyn Strategy>>,
    deadline: Option<Duration>,
}

impl Orchestrator {
    pub fn new(strategies: Vec<Box<dyn Strategy>>) -> Self {
        Self {
            strategies,
            deadline: None,
        }
    }

    /// Bound the whole run; the strategy in flight when it elapses is dropped.
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn from_config(config: &ExtractConfig) -> Result<Self, ExtractError> {
        Ok(Self::with_capabilities(config, Capabilities::from_config(config)?))
    }

    /// Structured data, then the HTML heuristic, then video.
    ///
    /// The model is optional: without one the heuristic finds nothing and the
    /// video strategy returns the metadata it resolved.
    pub fn with_capabilities(config: &ExtractConfig, capabilities: Capabilities) -> Self {
        let headers = config.http.headers();
        if capabilities.completion.is_none() {
            warn!("No completion provider; recipe fields from free text will be empty");
        }
        let extractor = TextExtractor::new(capabilities.completion, &config.llm);

        let mut strategies: Vec<Box<dyn Strategy>> = vec![
            Box::new(StructuredDataStrategy::new(capabilities.scraper, headers.clone())),
            Box::new(HtmlHeuristicStrategy::new(
                capabilities.fetcher.clone(),
                extractor.clone(),
                headers,
                config.http.timeout(),
                config.html.max_body_chars,
            )),
        ];

        if config.video.enabled {
            let captions = CaptionResolver::new(
                capabilities.fetcher,
                config.video.caption_languages.clone(),
                config.http.timeout(),
            );
            let audio = capabilities
                .transcriber
                .filter(|_| config.video.transcribe_audio)
                .map(|transcriber| {
                    AudioTranscriber::new(
                        capabilities.video_resolver.clone(),
                        transcriber,
                        config.video.scratch_dir(),
                        config.video.language_hint.clone(),
                    )
                });
            strategies.push(Box::new(VideoStrategy::new(
                config.video.clone(),
                capabilities.video_resolver,
                captions,
                audio,
                extractor,
            )));
        }

        Self::new(strategies).with_deadline(config.request_deadline())
    }

    pub fn methods(&self) -> Vec<ExtractionMethod> {
        self.strategies.iter().map(|s| s.method()).collect()
    }

    pub async fn extract(&self, url: &str) -> Result<Recipe, ExtractError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ExtractError::InvalidUrl("URL is empty".to_string()));
        }

        let started = Instant::now();
        let mut attempts = Vec::with_capacity(self.strategies.len());

        for strategy in &self.strategies {
            let method = strategy.method();
            info!("Trying {} for {}", method, url);

            let outcome = match self.deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_sub(started.elapsed());
                    match tokio::time::timeout(remaining, strategy.attempt(url)).await {
                        Ok(outcome) => outcome,
                        Err(_) => Err(StrategyError::DeadlineExceeded(deadline.as_secs())),
                    }
                }
                None => strategy.attempt(url).await,
            };

            match outcome {
                Ok(recipe) if recipe.is_usable() => {
                    info!("{} succeeded for {}", method, url);
                    return Ok(recipe);
                }
                Ok(_) => {
                    let cause =
                        StrategyError::NoRecipeFound("record has no title and no content".into());
                    warn!("{} failed: {}", method, cause);
                    attempts.push(ExtractionAttempt::failure(method, cause));
                }
                Err(cause) => {
                    warn!("{} failed: {}", method, cause);
                    let out_of_time = matches!(cause, StrategyError::DeadlineExceeded(_));
                    attempts.push(ExtractionAttempt::failure(method, cause));
                    if out_of_time {
                        break;
                    }
                }
            }
        }

        let err = ExtractError::ExtractionFailed { attempts };
        error!("{}", err);
        Err(err)
    }
}
