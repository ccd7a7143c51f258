use super::{clean_lines, Strategy};
use crate::config::VideoConfig;
use crate::error::StrategyError;
use crate::model::{ExtractionMethod, Recipe, VideoInfo};
use crate::url_to_text::text::{truncate_chars, TextExtractor};
use crate::video::{AudioTranscriber, CaptionResolver, CookieJar, VideoOptions, VideoResolver};
use async_trait::async_trait;
use log::{info, warn};
use std::sync::Arc;

/// Resolves video metadata, finds a transcript and asks the model for the recipe.
pub struct VideoStrategy {
    config: VideoConfig,
    resolver: Arc<dyn VideoResolver>,
    captions: CaptionResolver,
    audio: Option<AudioTranscriber>,
    extractor: TextExtractor,
}

impl VideoStrategy {
    pub fn new(
        config: VideoConfig,
        resolver: Arc<dyn VideoResolver>,
        captions: CaptionResolver,
        audio: Option<AudioTranscriber>,
        extractor: TextExtractor,
    ) -> Self {
        Self {
            config,
            resolver,
            captions,
            audio,
            extractor,
        }
    }

    fn options(&self, jar: Option<&CookieJar>) -> VideoOptions {
        VideoOptions {
            user_agent: self.config.user_agent.clone(),
            headers: self.config.extra_headers.clone(),
            cookie_file: jar.map(|j| j.path().to_path_buf()),
            geo_bypass: self.config.geo_bypass,
            timeout: self.config.timeout(),
        }
    }

    /// Captions first, then the audio track. `None` when neither yields text.
    async fn transcript(
        &self,
        url: &str,
        info: &VideoInfo,
        options: &VideoOptions,
    ) -> Option<(&'static str, String)> {
        match self.captions.resolve(info).await {
            Ok(text) => return Some(("captions", text)),
            Err(e) => info!("{}", e),
        }

        let audio = self.audio.as_ref()?;
        match audio.transcribe(url, options).await {
            Ok(text) => Some(("audio transcription", text)),
            Err(e) => {
                warn!("{}", e);
                None
            }
        }
    }
}

#[async_trait]
impl Strategy for VideoStrategy {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::Video
    }

    async fn attempt(&self, url: &str) -> Result<Recipe, StrategyError> {
        // Lives until this call returns; dropping it removes the file.
        let jar = CookieJar::from_config(&self.config)
            .map_err(|e| StrategyError::video(format!("could not prepare cookie jar: {e}")))?;
        let options = self.options(jar.as_ref());

        let info = self
            .resolver
            .resolve(url, &options)
            .await
            .map_err(|e| StrategyError::video(e.to_string()))?;

        let transcript = self.transcript(url, &info, &options).await;
        let title = info.title.trim();
        let description = info.description.trim();
        if transcript.is_none() && description.is_empty() {
            if title.is_empty() {
                return Err(StrategyError::TranscriptUnavailable(
                    "no captions, no audio transcript, no description and no title".into(),
                ));
            }
            info!("No description or transcript for {}, using the title only", url);
        }

        let mut parts = vec![title];
        let mut sources = Vec::new();
        if !description.is_empty() {
            parts.push(description);
            sources.push("description");
        }
        if let Some((source, transcript)) = &transcript {
            parts.push(transcript.trim());
            sources.push(*source);
        }
        if sources.is_empty() {
            sources.push("title");
        }
        parts.retain(|part| !part.is_empty());
        let text = parts.join("\n\n");
        let text = truncate_chars(&text, self.config.max_text_chars);
        let extraction = self.extractor.extract(text).await;

        let mut notes = format!("Extracted from video {}", sources.join(" + "));
        if !info.uploader.is_empty() {
            notes.push_str(&format!(" by {}", info.uploader));
        }
        if !extraction.notes.is_empty() {
            notes.push_str(" • ");
            notes.push_str(&extraction.notes);
        }

        Ok(Recipe {
            title: if title.is_empty() { "Video Recipe" } else { title }.to_string(),
            ingredients: clean_lines(extraction.ingredients),
            instructions: clean_lines(extraction.instructions),
            image: info.thumbnail.clone(),
            recipe_yield: String::new(),
            time: info.duration_minutes(),
            notes,
            source: ExtractionMethod::Video.source_kind(),
            method: ExtractionMethod::Video,
        })
    }
}
