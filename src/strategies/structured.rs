use super::{clean_lines, Strategy};
use crate::error::StrategyError;
use crate::model::{ExtractionMethod, Recipe, StructuredRecipe};
use crate::url_to_text::html::extractors::StructuredScraper;
use async_trait::async_trait;
use log::debug;
use std::collections::HashMap;
use std::sync::Arc;

pub struct StructuredDataStrategy {
    scraper: Arc<dyn StructuredScraper>,
    headers: HashMap<String, String>,
}

impl StructuredDataStrategy {
    pub fn new(scraper: Arc<dyn StructuredScraper>, headers: HashMap<String, String>) -> Self {
        Self { scraper, headers }
    }
}

#[async_trait]
impl Strategy for StructuredDataStrategy {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::StructuredData
    }

    async fn attempt(&self, url: &str) -> Result<Recipe, StrategyError> {
        let structured = self
            .scraper
            .parse(url, &self.headers)
            .await
            .map_err(|e| StrategyError::StructuredScrapeFailed(e.to_string()))?;
        debug!(
            "Structured markup: '{}', {} ingredients",
            structured.title,
            structured.ingredients.len()
        );
        normalize(structured)
    }
}

fn normalize(structured: StructuredRecipe) -> Result<Recipe, StrategyError> {
    let ingredients = clean_lines(&structured.ingredients);
    let instructions = clean_lines(structured.instructions.lines());
    if ingredients.is_empty() && instructions.is_empty() {
        return Err(StrategyError::StructuredScrapeFailed(
            "recipe markup has no ingredients or instructions".into(),
        ));
    }

    let title = structured.title.trim();
    Ok(Recipe {
        title: if title.is_empty() { "Untitled" } else { title }.to_string(),
        ingredients,
        instructions,
        image: structured.image,
        recipe_yield: structured.yields,
        time: structured.total_time,
        notes: "Scraped successfully".to_string(),
        source: ExtractionMethod::StructuredData.source_kind(),
        method: ExtractionMethod::StructuredData,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url_to_text::html::extractors::ExtractorResult;

    struct FixedScraper(Result<StructuredRecipe, &'static str>);

    #[async_trait]
    impl StructuredScraper for FixedScraper {
        async fn parse(&self, _: &str, headers: &HashMap<String, String>) -> ExtractorResult {
            assert_eq!(headers.get("Referer").map(String::as_str), Some("https://www.google.com/"));
            self.0.clone().map_err(|e| e.into())
        }
    }

    fn strategy(result: Result<StructuredRecipe, &'static str>) -> StructuredDataStrategy {
        StructuredDataStrategy::new(
            Arc::new(FixedScraper(result)),
            HashMap::from([("Referer".to_string(), "https://www.google.com/".to_string())]),
        )
    }

    #[tokio::test]
    async fn test_instructions_split_on_newlines() {
        let recipe = strategy(Ok(StructuredRecipe {
            title: "Flatbread".into(),
            ingredients: vec!["2 cups flour".into(), " ".into(), "1 cup yogurt".into()],
            instructions: "Mix.\n\n  Knead.  \nCook in a hot pan.\n".into(),
            image: "https://img/flat.jpg".into(),
            yields: "4 servings".into(),
            total_time: 25,
        }))
        .attempt("https://example.com/flatbread")
        .await
        .unwrap();

        assert_eq!(recipe.ingredients, vec!["2 cups flour", "1 cup yogurt"]);
        assert_eq!(recipe.instructions, vec!["Mix.", "Knead.", "Cook in a hot pan."]);
        assert_eq!(recipe.recipe_yield, "4 servings");
        assert_eq!(recipe.time, 25);
        assert_eq!(recipe.method, ExtractionMethod::StructuredData);
    }

    #[tokio::test]
    async fn test_missing_title_defaults() {
        let recipe = strategy(Ok(StructuredRecipe {
            ingredients: vec!["salt".into()],
            ..Default::default()
        }))
        .attempt("https://example.com")
        .await
        .unwrap();
        assert_eq!(recipe.title, "Untitled");
        assert!(recipe.instructions.is_empty());
    }

    #[tokio::test]
    async fn test_empty_markup_is_a_failure() {
        let err = strategy(Ok(StructuredRecipe {
            title: "Just a title".into(),
            ..Default::default()
        }))
        .attempt("https://example.com")
        .await
        .unwrap_err();
        assert!(matches!(err, StrategyError::StructuredScrapeFailed(_)));
    }

    #[tokio::test]
    async fn test_scraper_error_is_a_failure() {
        let err = strategy(Err("Request failed with status: 403 Forbidden"))
            .attempt("https://example.com")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            StrategyError::StructuredScrapeFailed("Request failed with status: 403 Forbidden".into())
        );
    }
}
