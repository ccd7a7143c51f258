mod heuristic;
mod structured;
mod video;

pub use heuristic::HtmlHeuristicStrategy;
pub use structured::StructuredDataStrategy;
pub use video::VideoStrategy;

use crate::error::StrategyError;
use crate::model::{ExtractionMethod, Recipe};
use async_trait::async_trait;

/// One way of turning a URL into a recipe.
///
/// Implementations never retry; a failure is reported once and the
/// orchestrator moves on.
#[async_trait]
pub trait Strategy: Send + Sync {
    fn method(&self) -> ExtractionMethod;

    async fn attempt(&self, url: &str) -> Result<Recipe, StrategyError>;
}

/// Trim entries and drop the empty ones, keeping order.
pub(crate) fn clean_lines<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|s| s.as_ref().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
