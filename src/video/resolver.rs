use crate::model::{CaptionTrack, VideoInfo};
use crate::providers::ProviderResult;
use async_trait::async_trait;
use log::{debug, info};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Per-request settings for talking to a video platform.
#[derive(Debug, Clone)]
pub struct VideoOptions {
    pub user_agent: String,
    pub headers: HashMap<String, String>,
    /// Netscape cookie file private to this request
    pub cookie_file: Option<PathBuf>,
    pub geo_bypass: bool,
    pub timeout: Duration,
}

/// Video metadata and media capability
#[async_trait]
pub trait VideoResolver: Send + Sync {
    /// Resolve metadata and caption track listings without downloading media.
    ///
    /// Errors carry the provider's raw message text.
    async fn resolve(&self, url: &str, options: &VideoOptions) -> ProviderResult<VideoInfo>;

    /// Download the best audio stream into `dest_dir` and return the file path.
    async fn download_audio(
        &self,
        url: &str,
        options: &VideoOptions,
        dest_dir: &Path,
    ) -> ProviderResult<PathBuf>;
}

/// Resolves videos by shelling out to yt-dlp.
#[derive(Debug, Clone)]
pub struct YtDlpResolver {
    program: String,
}

impl Default for YtDlpResolver {
    fn default() -> Self {
        Self::new("yt-dlp")
    }
}

impl YtDlpResolver {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self, options: &VideoOptions) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("--no-warnings")
            .arg("--no-playlist")
            .arg("--user-agent")
            .arg(&options.user_agent);
        for (name, value) in &options.headers {
            cmd.arg("--add-header").arg(format!("{name}:{value}"));
        }
        if let Some(cookies) = &options.cookie_file {
            cmd.arg("--cookies").arg(cookies);
        }
        if options.geo_bypass {
            cmd.arg("--geo-bypass");
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    async fn run(&self, mut cmd: Command, timeout: Duration) -> ProviderResult<Vec<u8>> {
        let output = tokio::time::timeout(timeout, cmd.output())
            .await
            .map_err(|_| format!("{} timed out after {}s", self.program, timeout.as_secs()))?
            .map_err(|e| format!("failed to run {}: {e}", self.program))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = stderr
                .lines()
                .rev()
                .find(|l| l.contains("ERROR"))
                .unwrap_or_else(|| stderr.trim());
            return Err(if message.is_empty() {
                format!("{} exited with {}", self.program, output.status).into()
            } else {
                message.to_string().into()
            });
        }
        Ok(output.stdout)
    }
}

#[async_trait]
impl VideoResolver for YtDlpResolver {
    async fn resolve(&self, url: &str, options: &VideoOptions) -> ProviderResult<VideoInfo> {
        info!("Resolving video metadata for {}", url);
        let mut cmd = self.command(options);
        cmd.arg("--dump-single-json").arg("--skip-download").arg(url);

        let stdout = self.run(cmd, options.timeout).await?;
        let info: VideoInfo = serde_json::from_slice::<YtDlpInfo>(&stdout)?.into();
        debug!(
            "Resolved '{}': {} subtitle languages, {} automatic",
            info.title,
            info.subtitles.len(),
            info.automatic_captions.len()
        );
        Ok(info)
    }

    async fn download_audio(
        &self,
        url: &str,
        options: &VideoOptions,
        dest_dir: &Path,
    ) -> ProviderResult<PathBuf> {
        info!("Downloading audio for {}", url);
        let template = dest_dir.join("audio.%(ext)s");
        let mut cmd = self.command(options);
        cmd.arg("-f")
            .arg("bestaudio/best")
            .arg("-x")
            .arg("--audio-format")
            .arg("mp3")
            .arg("-o")
            .arg(&template)
            .arg(url);
        self.run(cmd, options.timeout).await?;

        let mut entries = tokio::fs::read_dir(dest_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_audio = path
                .file_stem()
                .is_some_and(|stem| stem == "audio")
                && path.extension().is_some_and(|ext| ext != "part");
            if is_audio {
                return Ok(path);
            }
        }
        Err(format!("{} produced no audio file", self.program).into())
    }
}

/// The subset of yt-dlp's info JSON we read.
#[derive(Debug, Deserialize)]
struct YtDlpInfo {
    title: Option<String>,
    description: Option<String>,
    thumbnail: Option<String>,
    duration: Option<f64>,
    uploader: Option<String>,
    #[serde(default)]
    subtitles: Option<BTreeMap<String, Vec<CaptionTrack>>>,
    #[serde(default)]
    automatic_captions: Option<BTreeMap<String, Vec<CaptionTrack>>>,
}

impl From<YtDlpInfo> for VideoInfo {
    fn from(info: YtDlpInfo) -> Self {
        VideoInfo {
            title: info.title.unwrap_or_default(),
            description: info.description.unwrap_or_default(),
            thumbnail: info.thumbnail.unwrap_or_default(),
            duration: info.duration.unwrap_or_default(),
            uploader: info.uploader.unwrap_or_default(),
            subtitles: info.subtitles.unwrap_or_default(),
            automatic_captions: info.automatic_captions.unwrap_or_default(),
        }
    }
}
