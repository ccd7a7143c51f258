use crate::model::StructuredRecipe;
use crate::url_to_text::fetchers::PageFetcher;
use async_trait::async_trait;
use html_escape::decode_html_entities;
use log::debug;
use scraper::Html;
use std::collections::HashMap;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

mod json_ld;
mod microdata;

pub use json_ld::JsonLdExtractor;
pub use microdata::MicroDataExtractor;

pub type ExtractorResult = Result<StructuredRecipe, Box<dyn Error + Send + Sync>>;

pub struct ParsingContext {
    pub url: String,
    pub document: Html,
}

pub trait Extractor: Send + Sync {
    fn name(&self) -> &str;
    fn parse(&self, context: &ParsingContext) -> ExtractorResult;
}

pub(crate) fn decode_html_symbols(text: &str) -> String {
    // Some sites double-encode entities (&amp;amp;)
    decode_html_entities(&decode_html_entities(text))
        .trim()
        .to_string()
}

/// Structured-recipe scraping capability
#[async_trait]
pub trait StructuredScraper: Send + Sync {
    async fn parse(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
    ) -> ExtractorResult;
}

/// Fetches a page and reads its schema.org Recipe markup, JSON-LD first.
pub struct SchemaOrgScraper {
    fetcher: Arc<dyn PageFetcher>,
    timeout: Duration,
    extractors: Vec<Box<dyn Extractor>>,
}

impl SchemaOrgScraper {
    pub fn new(fetcher: Arc<dyn PageFetcher>, timeout: Duration) -> Self {
        Self {
            fetcher,
            timeout,
            extractors: vec![Box::new(JsonLdExtractor), Box::new(MicroDataExtractor)],
        }
    }

    /// Run the markup extractors over an already-fetched page.
    pub fn parse_html(&self, url: &str, html: &str) -> ExtractorResult {
        let context = ParsingContext {
            url: url.to_string(),
            document: Html::parse_document(html),
        };

        let mut errors = Vec::new();
        for extractor in &self.extractors {
            match extractor.parse(&context) {
                Ok(recipe) => {
                    debug!("{} extractor matched {}", extractor.name(), url);
                    return Ok(recipe);
                }
                Err(e) => errors.push(format!("{}: {}", extractor.name(), e)),
            }
        }

        Err(format!("No recipe markup found ({})", errors.join("; ")).into())
    }
}

#[async_trait]
impl StructuredScraper for SchemaOrgScraper {
    async fn parse(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
    ) -> ExtractorResult {
        let html = self.fetcher.get(url, headers, self.timeout).await?;
        self.parse_html(url, &html)
    }
}
