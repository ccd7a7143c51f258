use super::{clean_lines, Strategy};
use crate::error::StrategyError;
use crate::model::{ExtractionMethod, Recipe};
use crate::url_to_text::fetchers::PageFetcher;
use crate::url_to_text::html::PageSummary;
use crate::url_to_text::text::{truncate_chars, TextExtractor};
use async_trait::async_trait;
use log::{debug, info};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Fetches the page and asks the model to find a recipe in its visible text.
pub struct HtmlHeuristicStrategy {
    fetcher: Arc<dyn PageFetcher>,
    extractor: TextExtractor,
    headers: HashMap<String, String>,
    timeout: Duration,
    max_body_chars: usize,
}

impl HtmlHeuristicStrategy {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        extractor: TextExtractor,
        headers: HashMap<String, String>,
        timeout: Duration,
        max_body_chars: usize,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            headers,
            timeout,
            max_body_chars,
        }
    }
}

#[async_trait]
impl Strategy for HtmlHeuristicStrategy {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::HtmlHeuristic
    }

    async fn attempt(&self, url: &str) -> Result<Recipe, StrategyError> {
        let html = self
            .fetcher
            .get(url, &self.headers, self.timeout)
            .await
            .map_err(|e| StrategyError::HtmlFetchFailed(e.to_string()))?;

        let page = PageSummary::from_html(&html);
        let text = truncate_chars(&page.text, self.max_body_chars);
        info!(
            "Page text for {}: {} chars (of {})",
            url,
            text.chars().count(),
            page.text.chars().count()
        );

        let extraction = self.extractor.extract(text).await;
        if extraction.is_empty() {
            return Err(StrategyError::NoRecipeFound(
                "no ingredients or instructions in page text".into(),
            ));
        }
        debug!(
            "Model found {} ingredients, {} steps",
            extraction.ingredients.len(),
            extraction.instructions.len()
        );

        Ok(Recipe {
            title: if page.title.is_empty() {
                "AI Parsed".to_string()
            } else {
                page.title
            },
            ingredients: clean_lines(extraction.ingredients),
            instructions: clean_lines(extraction.instructions),
            image: page.image,
            recipe_yield: String::new(),
            time: 0,
            notes: extraction.notes,
            source: ExtractionMethod::HtmlHeuristic.source_kind(),
            method: ExtractionMethod::HtmlHeuristic,
        })
    }
}
