pub mod builder;
pub mod config;
pub mod error;
pub mod model;
pub mod orchestrator;
pub mod providers;
pub mod strategies;
pub mod url_to_text;
pub mod video;

pub use builder::{LlmProvider, RecipeExtractor, RecipeExtractorBuilder};
pub use config::ExtractConfig;
pub use error::{ExtractError, StrategyError, VideoFailureKind};
pub use model::{ExtractionAttempt, ExtractionMethod, Recipe, SourceKind};
pub use orchestrator::{Capabilities, Orchestrator};

/// Extract a recipe from a web page or video URL
///
/// Configuration comes from `recipe-extract.toml` and `RECIPE_EXTRACT__*`
/// environment variables.
///
/// # Example
/// ```no_run
/// # #[tokio::main]
/// # async fn main() -> Result<(), recipe_extract::ExtractError> {
/// let recipe = recipe_extract::extract_recipe("https://example.com/recipe").await?;
/// println!("{} ({} ingredients)", recipe.title, recipe.ingredients.len());
/// # Ok(())
/// # }
/// ```
pub async fn extract_recipe(url: &str) -> Result<Recipe, ExtractError> {
    let config = ExtractConfig::load()?;
    extract_recipe_with_config(url, &config).await
}

/// Extract a recipe using an explicit configuration
pub async fn extract_recipe_with_config(
    url: &str,
    config: &ExtractConfig,
) -> Result<Recipe, ExtractError> {
    Orchestrator::from_config(config)?.extract(url).await
}
