use crate::model::ExtractionAttempt;
use serde_json::{json, Value};
use std::fmt;
use thiserror::Error;

/// Why a video URL could not be resolved, read off the provider's error text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoFailureKind {
    Private,
    LoginRequired,
    RateLimited,
    GeoBlocked,
    Unavailable,
    Other,
}

impl VideoFailureKind {
    /// Classify a raw provider error message by its known substrings.
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("private") {
            VideoFailureKind::Private
        } else if lower.contains("login")
            || lower.contains("log in")
            || lower.contains("sign in")
            || lower.contains("cookies")
        {
            VideoFailureKind::LoginRequired
        } else if lower.contains("rate-limit")
            || lower.contains("rate limit")
            || lower.contains("too many requests")
            || lower.contains("429")
        {
            VideoFailureKind::RateLimited
        } else if lower.contains("geo")
            || lower.contains("not available in your country")
            || lower.contains("your location")
        {
            VideoFailureKind::GeoBlocked
        } else if lower.contains("unavailable")
            || lower.contains("unsupported url")
            || lower.contains("removed")
        {
            VideoFailureKind::Unavailable
        } else {
            VideoFailureKind::Other
        }
    }
}

impl fmt::Display for VideoFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VideoFailureKind::Private => "private content",
            VideoFailureKind::LoginRequired => "login required",
            VideoFailureKind::RateLimited => "rate limited",
            VideoFailureKind::GeoBlocked => "geo-blocked",
            VideoFailureKind::Unavailable => "unavailable",
            VideoFailureKind::Other => "resolution error",
        };
        f.write_str(s)
    }
}

/// Failure of a single strategy attempt.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StrategyError {
    /// Unsupported site, missing schema, or a parse error
    #[error("Structured scrape failed: {0}")]
    StructuredScrapeFailed(String),

    /// Network error or timeout while fetching the page
    #[error("HTML fetch failed: {0}")]
    HtmlFetchFailed(String),

    /// The heuristic pass produced neither ingredients nor instructions
    #[error("No recipe found: {0}")]
    NoRecipeFound(String),

    /// Metadata resolution failed; `message` is the provider's raw text
    #[error("Video resolution failed ({kind}): {message}")]
    VideoResolutionFailed {
        kind: VideoFailureKind,
        message: String,
    },

    /// No caption track and no successful transcription
    #[error("Transcript unavailable: {0}")]
    TranscriptUnavailable(String),

    /// The model response held no decodable JSON object
    #[error("Model extraction failed: {0}")]
    ModelExtractionFailed(String),

    /// The end-to-end deadline elapsed
    #[error("Deadline of {0}s exceeded")]
    DeadlineExceeded(u64),
}

impl StrategyError {
    pub fn video(message: impl Into<String>) -> Self {
        let message = message.into();
        StrategyError::VideoResolutionFailed {
            kind: VideoFailureKind::classify(&message),
            message,
        }
    }
}

/// Errors returned to callers of the extraction API
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The URL was empty after trimming
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Every strategy failed; attempts are kept in the order they ran
    #[error("Could not extract a recipe from this URL{}", format_causes(.attempts))]
    ExtractionFailed { attempts: Vec<ExtractionAttempt> },

    /// A capability (model, transcription) could not be set up
    #[error("Provider error: {0}")]
    Provider(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl ExtractError {
    /// Structured error body for the HTTP front end or CLI.
    pub fn to_json(&self) -> Value {
        match self {
            ExtractError::ExtractionFailed { attempts } => json!({
                "error": "Could not extract a recipe from this URL",
                "causes": attempts
                    .iter()
                    .filter_map(|a| a.cause.as_ref().map(|cause| json!({
                        "strategy": a.strategy.as_str(),
                        "cause": cause.to_string(),
                    })))
                    .collect::<Vec<_>>(),
            }),
            other => json!({ "error": other.to_string(), "causes": [] }),
        }
    }

    /// Whether the failure stems from the request itself rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ExtractError::InvalidUrl(_) | ExtractError::ExtractionFailed { .. }
        )
    }
}

fn format_causes(attempts: &[ExtractionAttempt]) -> String {
    let causes: Vec<String> = attempts
        .iter()
        .filter_map(|a| a.cause.as_ref().map(|c| format!("  {}: {}", a.strategy, c)))
        .collect();
    if causes.is_empty() {
        String::new()
    } else {
        format!(":\n{}", causes.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ExtractionMethod;

    #[test]
    fn test_classify_provider_messages() {
        assert_eq!(
            VideoFailureKind::classify("ERROR: [Instagram] abc: This content is private"),
            VideoFailureKind::Private
        );
        assert_eq!(
            VideoFailureKind::classify("Requested content is not available, rate-limit reached or login required"),
            VideoFailureKind::LoginRequired
        );
        assert_eq!(
            VideoFailureKind::classify("HTTP Error 429: Too Many Requests"),
            VideoFailureKind::RateLimited
        );
        assert_eq!(
            VideoFailureKind::classify("The uploader has not made this video available in your country (geo restricted)"),
            VideoFailureKind::GeoBlocked
        );
        assert_eq!(
            VideoFailureKind::classify("Unsupported URL: https://example.com"),
            VideoFailureKind::Unavailable
        );
        assert_eq!(VideoFailureKind::classify("boom"), VideoFailureKind::Other);
    }

    #[test]
    fn test_video_error_keeps_raw_message() {
        let err = StrategyError::video("ERROR: Video is private");
        match &err {
            StrategyError::VideoResolutionFailed { kind, message } => {
                assert_eq!(*kind, VideoFailureKind::Private);
                assert_eq!(message, "ERROR: Video is private");
            }
            _ => panic!("wrong variant"),
        }
        assert!(err.to_string().contains("ERROR: Video is private"));
    }

    #[test]
    fn test_extraction_failed_lists_causes_in_order() {
        let err = ExtractError::ExtractionFailed {
            attempts: vec![
                ExtractionAttempt::failure(
                    ExtractionMethod::StructuredData,
                    StrategyError::StructuredScrapeFailed("no schema".into()),
                ),
                ExtractionAttempt::failure(
                    ExtractionMethod::HtmlHeuristic,
                    StrategyError::NoRecipeFound("nothing found".into()),
                ),
                ExtractionAttempt::failure(ExtractionMethod::Video, StrategyError::video("private")),
            ],
        };
        let text = err.to_string();
        let a = text.find("structured_data").unwrap();
        let b = text.find("html_heuristic").unwrap();
        let c = text.find("video:").unwrap();
        assert!(a < b && b < c);

        let body = err.to_json();
        assert_eq!(body["causes"].as_array().unwrap().len(), 3);
        assert_eq!(
            body["causes"][2]["cause"],
            "Video resolution failed (private content): private"
        );
        assert!(err.is_client_error());
    }
}
