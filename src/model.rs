use crate::error::StrategyError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Where the recipe came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Website,
    Video,
}

/// Which strategy produced (or failed to produce) a recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    StructuredData,
    HtmlHeuristic,
    Video,
}

impl ExtractionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMethod::StructuredData => "structured_data",
            ExtractionMethod::HtmlHeuristic => "html_heuristic",
            ExtractionMethod::Video => "video",
        }
    }

    pub fn source_kind(&self) -> SourceKind {
        match self {
            ExtractionMethod::StructuredData | ExtractionMethod::HtmlHeuristic => {
                SourceKind::Website
            }
            ExtractionMethod::Video => SourceKind::Video,
        }
    }
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The normalized record handed back to callers.
///
/// `time` is always expressed in whole minutes, `0` when unknown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recipe {
    pub title: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub image: String,
    #[serde(rename = "yield")]
    pub recipe_yield: String,
    pub time: u32,
    pub notes: String,
    pub source: SourceKind,
    pub method: ExtractionMethod,
}

impl Recipe {
    /// A recipe with neither a title nor any ingredients/instructions is not a result.
    pub fn is_usable(&self) -> bool {
        !self.title.trim().is_empty() || self.has_content()
    }

    pub fn has_content(&self) -> bool {
        !self.ingredients.is_empty() || !self.instructions.is_empty()
    }
}

/// Output of the structured-recipe scraping capability, before normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructuredRecipe {
    pub title: String,
    pub ingredients: Vec<String>,
    /// Steps joined with `\n`.
    pub instructions: String,
    pub image: String,
    pub yields: String,
    /// Minutes.
    pub total_time: u32,
}

/// Fields recovered from free text by the model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextExtraction {
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub notes: String,
}

impl TextExtraction {
    pub fn is_empty(&self) -> bool {
        self.ingredients.is_empty() && self.instructions.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CaptionTrack {
    pub url: String,
    #[serde(default)]
    pub ext: Option<String>,
}

/// Metadata resolved for a video URL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoInfo {
    pub title: String,
    pub description: String,
    pub thumbnail: String,
    /// Seconds, as reported by the provider.
    pub duration: f64,
    pub uploader: String,
    /// Uploaded subtitles, keyed by language code.
    pub subtitles: BTreeMap<String, Vec<CaptionTrack>>,
    /// Machine-generated captions, keyed by language code.
    pub automatic_captions: BTreeMap<String, Vec<CaptionTrack>>,
}

impl VideoInfo {
    /// Video duration rounded up to whole minutes.
    pub fn duration_minutes(&self) -> u32 {
        if self.duration.is_finite() && self.duration > 0.0 {
            (self.duration / 60.0).ceil() as u32
        } else {
            0
        }
    }
}

/// Diagnostic record of one strategy invocation.
#[derive(Debug, Clone)]
pub struct ExtractionAttempt {
    pub strategy: ExtractionMethod,
    /// `None` when the strategy produced the recipe.
    pub cause: Option<StrategyError>,
}

impl ExtractionAttempt {
    pub fn success(strategy: ExtractionMethod) -> Self {
        Self {
            strategy,
            cause: None,
        }
    }

    pub fn failure(strategy: ExtractionMethod, cause: StrategyError) -> Self {
        Self {
            strategy,
            cause: Some(cause),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.cause.is_none()
    }
}
