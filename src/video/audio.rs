use super::resolver::{VideoOptions, VideoResolver};
use crate::error::StrategyError;
use crate::providers::TranscriptionProvider;
use log::{debug, info};
use std::path::PathBuf;
use std::sync::Arc;

/// Downloads a video's audio into a private scratch directory and transcribes it.
///
/// The directory and everything in it is removed when this call returns,
/// errors, or is cancelled.
pub struct AudioTranscriber {
    resolver: Arc<dyn VideoResolver>,
    transcriber: Arc<dyn TranscriptionProvider>,
    scratch_dir: PathBuf,
    language_hint: String,
}

impl AudioTranscriber {
    pub fn new(
        resolver: Arc<dyn VideoResolver>,
        transcriber: Arc<dyn TranscriptionProvider>,
        scratch_dir: PathBuf,
        language_hint: impl Into<String>,
    ) -> Self {
        Self {
            resolver,
            transcriber,
            scratch_dir,
            language_hint: language_hint.into(),
        }
    }

    pub async fn transcribe(&self, url: &str, options: &VideoOptions) -> Result<String, StrategyError> {
        let workdir = tempfile::Builder::new()
            .prefix("audio-")
            .tempdir_in(&self.scratch_dir)
            .map_err(|e| StrategyError::TranscriptUnavailable(format!("scratch dir: {e}")))?;

        let audio = self
            .resolver
            .download_audio(url, options, workdir.path())
            .await
            .map_err(|e| StrategyError::TranscriptUnavailable(format!("audio download failed: {e}")))?;
        info!("Transcribing {}", audio.display());

        let transcript = self
            .transcriber
            .transcribe(&audio, &self.language_hint)
            .await
            .map_err(|e| StrategyError::TranscriptUnavailable(format!("transcription failed: {e}")))?;
        debug!("Transcript: {} chars", transcript.len());

        let transcript = transcript.trim().to_string();
        if transcript.is_empty() {
            return Err(StrategyError::TranscriptUnavailable(
                "transcription returned no text".into(),
            ));
        }
        Ok(transcript)
    }
}
