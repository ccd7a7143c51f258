#![allow(dead_code)]

use async_trait::async_trait;
use recipe_extract::model::VideoInfo;
use recipe_extract::providers::{CompletionProvider, ProviderResult, TranscriptionProvider};
use recipe_extract::video::{VideoOptions, VideoResolver};
use recipe_extract::ExtractConfig;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Completion provider that always answers with the same text.
pub struct FakeModel {
    response: String,
    pub prompts: Mutex<Vec<String>>,
}

impl FakeModel {
    pub fn new(response: &str) -> Arc<Self> {
        Arc::new(Self {
            response: response.to_string(),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionProvider for FakeModel {
    fn provider_name(&self) -> &str {
        "fake"
    }

    async fn complete(&self, prompt: &str, _: u32, _: f32) -> ProviderResult<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.response.clone())
    }
}

pub enum AudioBehavior {
    Succeed,
    Fail,
    Panic,
}

/// Video resolver standing in for yt-dlp.
pub struct FakeResolver {
    info: Result<VideoInfo, String>,
    resolve_delay: Option<Duration>,
    audio: AudioBehavior,
    pub cookie_files: Mutex<Vec<PathBuf>>,
    pub downloads: AtomicUsize,
}

impl FakeResolver {
    pub fn new(info: Result<VideoInfo, &str>) -> Self {
        Self {
            info: info.map_err(str::to_string),
            resolve_delay: None,
            audio: AudioBehavior::Succeed,
            cookie_files: Mutex::new(Vec::new()),
            downloads: AtomicUsize::new(0),
        }
    }

    pub fn with_audio(mut self, audio: AudioBehavior) -> Self {
        self.audio = audio;
        self
    }

    pub fn with_resolve_delay(mut self, delay: Duration) -> Self {
        self.resolve_delay = Some(delay);
        self
    }
}

#[async_trait]
impl VideoResolver for FakeResolver {
    async fn resolve(&self, _: &str, options: &VideoOptions) -> ProviderResult<VideoInfo> {
        if let Some(path) = &options.cookie_file {
            assert!(path.exists(), "cookie jar must exist while resolving");
            self.cookie_files.lock().unwrap().push(path.clone());
        }
        if let Some(delay) = self.resolve_delay {
            tokio::time::sleep(delay).await;
        }
        self.info.clone().map_err(|e| e.into())
    }

    async fn download_audio(
        &self,
        _: &str,
        _: &VideoOptions,
        dest_dir: &Path,
    ) -> ProviderResult<PathBuf> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        let path = dest_dir.join("audio.mp3");
        tokio::fs::write(&path, b"ID3 fake audio").await?;
        match self.audio {
            AudioBehavior::Succeed => Ok(path),
            AudioBehavior::Fail => Err("HTTP Error 403: Forbidden".into()),
            AudioBehavior::Panic => panic!("audio extraction crashed"),
        }
    }
}

pub struct FakeTranscriber(pub &'static str);

#[async_trait]
impl TranscriptionProvider for FakeTranscriber {
    async fn transcribe(&self, audio_file: &Path, _: &str) -> ProviderResult<String> {
        assert!(audio_file.exists());
        Ok(self.0.to_string())
    }
}

/// Configuration that keeps every temp artifact inside `scratch`.
pub fn test_config(scratch: &Path) -> ExtractConfig {
    let mut config = ExtractConfig::default();
    config.http.timeout_secs = 5;
    config.video.scratch_dir = Some(scratch.to_path_buf());
    config.video.timeout_secs = 5;
    config
}

pub fn dir_is_empty(dir: &Path) -> bool {
    std::fs::read_dir(dir).unwrap().next().is_none()
}

pub fn recipe_page(json_ld: &str) -> String {
    format!(
        r#"
        <!DOCTYPE html>
        <html>
        <head>
            <title>Recipe Page</title>
            <script type="application/ld+json">
                {json_ld}
            </script>
        </head>
        <body>
            <h1>Recipe</h1>
        </body>
        </html>
        "#
    )
}
