use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration for recipe extraction
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ExtractConfig {
    /// Page fetching
    #[serde(default)]
    pub http: HttpConfig,
    /// Generative model used by the text-to-structure step
    #[serde(default)]
    pub llm: LlmConfig,
    /// HTML heuristic strategy
    #[serde(default)]
    pub html: HtmlConfig,
    /// Video strategy
    #[serde(default)]
    pub video: VideoConfig,
    /// Optional end-to-end deadline for one extraction, in seconds
    #[serde(default)]
    pub request_deadline_secs: Option<u64>,
}

/// Headers and timeout for plain page fetches
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_referer")]
    pub referer: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_http_timeout(),
            user_agent: default_user_agent(),
            referer: default_referer(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Browser-like headers sent with every page request.
    pub fn headers(&self) -> HashMap<String, String> {
        let mut headers = HashMap::new();
        headers.insert("User-Agent".to_string(), self.user_agent.clone());
        if !self.referer.is_empty() {
            headers.insert("Referer".to_string(), self.referer.clone());
        }
        headers
    }
}

/// Configuration for the completion provider
#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    /// Provider name: "openai", "anthropic" or "ollama"
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Model identifier (e.g., "gpt-4o-mini")
    #[serde(default = "default_model")]
    pub model: String,
    /// Temperature for generation (0.0-1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// API key (falls back to the provider's usual environment variable)
    pub api_key: Option<String>,
    /// Base URL for API endpoint (for custom or proxy endpoints)
    pub base_url: Option<String>,
    /// Upper bound on characters of text submitted to the model
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
    /// Timeout for a single completion request, in seconds
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            api_key: None,
            base_url: None,
            max_input_chars: default_max_input_chars(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HtmlConfig {
    /// Page bodies are cut to this many characters before the model sees them
    #[serde(default = "default_max_body_chars")]
    pub max_body_chars: usize,
}

impl Default for HtmlConfig {
    fn default() -> Self {
        Self {
            max_body_chars: default_max_body_chars(),
        }
    }
}

/// Configuration for video metadata, captions and transcription
#[derive(Debug, Deserialize, Clone)]
pub struct VideoConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// yt-dlp executable
    #[serde(default = "default_ytdlp_path")]
    pub ytdlp_path: String,
    #[serde(default = "default_video_timeout")]
    pub timeout_secs: u64,
    /// Caption languages in preference order
    #[serde(default = "default_caption_languages")]
    pub caption_languages: Vec<String>,
    /// Device-identifying user agent presented to video platforms
    #[serde(default = "default_video_user_agent")]
    pub user_agent: String,
    /// Extra headers some platforms expect from their mobile clients
    #[serde(default = "default_video_headers")]
    pub extra_headers: HashMap<String, String>,
    /// Path to a Netscape cookie file for logged-in sessions
    pub cookies_file: Option<PathBuf>,
    /// Netscape cookie content; written to a per-request temp file
    pub cookies: Option<String>,
    #[serde(default = "default_true")]
    pub geo_bypass: bool,
    /// Download audio and transcribe it when no captions exist
    #[serde(default = "default_true")]
    pub transcribe_audio: bool,
    #[serde(default = "default_transcription_model")]
    pub transcription_model: String,
    /// Language hint passed to the transcription service
    #[serde(default = "default_language_hint")]
    pub language_hint: String,
    /// Upper bound on description + transcript characters sent to the model
    #[serde(default = "default_max_text_chars")]
    pub max_text_chars: usize,
    /// Directory for per-request cookie jars and audio downloads (system temp dir if unset)
    pub scratch_dir: Option<PathBuf>,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ytdlp_path: default_ytdlp_path(),
            timeout_secs: default_video_timeout(),
            caption_languages: default_caption_languages(),
            user_agent: default_video_user_agent(),
            extra_headers: default_video_headers(),
            cookies_file: None,
            cookies: None,
            geo_bypass: true,
            transcribe_audio: true,
            transcription_model: default_transcription_model(),
            language_hint: default_language_hint(),
            max_text_chars: default_max_text_chars(),
            scratch_dir: None,
        }
    }
}

impl VideoConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn scratch_dir(&self) -> PathBuf {
        self.scratch_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_http_timeout() -> u64 {
    15
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/130.0 Safari/537.36".to_string()
}

fn default_referer() -> String {
    "https://www.google.com/".to_string()
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.1
}

fn default_max_tokens() -> u32 {
    800
}

// Callers truncate first; this cap sits above `html.max_body_chars`.
fn default_max_input_chars() -> usize {
    20_000
}

fn default_max_text_chars() -> usize {
    14_000
}

fn default_llm_timeout() -> u64 {
    60
}

fn default_max_body_chars() -> usize {
    15_000
}

fn default_ytdlp_path() -> String {
    "yt-dlp".to_string()
}

fn default_video_timeout() -> u64 {
    60
}

fn default_caption_languages() -> Vec<String> {
    vec!["en".to_string(), "en-US".to_string(), "en-GB".to_string()]
}

fn default_video_user_agent() -> String {
    "Instagram 219.0.0.12.117 Android".to_string()
}

fn default_video_headers() -> HashMap<String, String> {
    let mut headers = HashMap::new();
    headers.insert("x-ig-app-id".to_string(), "936619743392459".to_string());
    headers
}

fn default_transcription_model() -> String {
    "whisper-1".to_string()
}

fn default_language_hint() -> String {
    "en".to_string()
}

impl ExtractConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with RECIPE_EXTRACT__ prefix
    /// 2. recipe-extract.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: RECIPE_EXTRACT__LLM__API_KEY
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }

    pub fn request_deadline(&self) -> Option<Duration> {
        self.request_deadline_secs.map(Duration::from_secs)
    }
}

/// Load configuration from file and environment variables
pub fn load_config() -> Result<ExtractConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("recipe-extract").required(false))
        // Use double underscore for nested: RECIPE_EXTRACT__VIDEO__COOKIES_FILE
        .add_source(
            Environment::with_prefix("RECIPE_EXTRACT")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("video.caption_languages"),
        )
        .build()?;

    settings.try_deserialize()
}
