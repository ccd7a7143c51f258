use super::json_ld::duration_minutes;
use super::{decode_html_symbols, Extractor, ExtractorResult, ParsingContext};
use crate::model::StructuredRecipe;
use log::debug;
use scraper::{ElementRef, Html, Selector};

/// Reads `itemscope`/`itemprop` schema.org Recipe markup.
pub struct MicroDataExtractor;

fn selector(css: &str) -> Result<Selector, String> {
    Selector::parse(css).map_err(|e| format!("invalid selector {css}: {e}"))
}

fn element_text(el: ElementRef) -> String {
    let text = el.text().collect::<Vec<_>>().join(" ");
    decode_html_symbols(&text.split_whitespace().collect::<Vec<_>>().join(" "))
}

impl MicroDataExtractor {
    fn find_recipe_container<'a>(&self, document: &'a Html) -> Result<Option<ElementRef<'a>>, String> {
        // Look for elements with itemscope and itemtype containing "Recipe"
        let scope = selector("[itemscope]")?;
        Ok(document.select(&scope).find(|element| {
            element.value().attr("itemtype").is_some_and(|itemtype| {
                itemtype.contains("schema.org/Recipe")
                    || itemtype.contains("data-vocabulary.org/Recipe")
            })
        }))
    }

    /// Value of the first matching itemprop: `content`, then `datetime`, then text.
    fn get_itemprop(&self, root: ElementRef, prop: &str) -> Result<Option<String>, String> {
        let sel = selector(&format!("[itemprop='{prop}']"))?;
        Ok(root.select(&sel).next().and_then(|el| {
            let value = el
                .value()
                .attr("content")
                .or_else(|| el.value().attr("datetime"))
                .map(|v| decode_html_symbols(v))
                .unwrap_or_else(|| element_text(el));
            (!value.is_empty()).then_some(value)
        }))
    }

    fn get_itemprop_list(&self, root: ElementRef, prop: &str) -> Result<Vec<String>, String> {
        let sel = selector(&format!("[itemprop='{prop}']"))?;
        Ok(root
            .select(&sel)
            .map(element_text)
            .filter(|text| !text.is_empty())
            .collect())
    }

    fn get_image(&self, root: ElementRef) -> Result<String, String> {
        let sel = selector("[itemprop='image']")?;
        Ok(root
            .select(&sel)
            .next()
            .and_then(|el| {
                el.value()
                    .attr("src")
                    .or_else(|| el.value().attr("content"))
                    .or_else(|| el.value().attr("href"))
                    .map(str::to_string)
            })
            .unwrap_or_default())
    }
}

impl Extractor for MicroDataExtractor {
    fn name(&self) -> &str {
        "microdata"
    }

    fn parse(&self, context: &ParsingContext) -> ExtractorResult {
        debug!("Attempting to extract recipe using MicroData extractor");

        // Only look inside a Recipe container; page-wide itemprops pick up
        // site titles and author bios.
        let container = self
            .find_recipe_container(&context.document)?
            .ok_or("No MicroData Recipe container found")?;

        let title = self.get_itemprop(container, "name")?.unwrap_or_default();

        let mut ingredients = self.get_itemprop_list(container, "recipeIngredient")?;
        if ingredients.is_empty() {
            ingredients = self.get_itemprop_list(container, "ingredients")?;
        }

        let mut steps = self.get_itemprop_list(container, "recipeInstructions")?;
        if steps.is_empty() {
            steps = self.get_itemprop_list(container, "instructions")?;
        }

        if ingredients.is_empty() && steps.is_empty() {
            return Err("Could not extract recipe content".into());
        }

        let total_time = match self.get_itemprop(container, "totalTime")? {
            Some(total) => duration_minutes(&total).unwrap_or(0),
            None => {
                let prep = self.get_itemprop(container, "prepTime")?;
                let cook = self.get_itemprop(container, "cookTime")?;
                [prep, cook]
                    .iter()
                    .flatten()
                    .filter_map(|d| duration_minutes(d))
                    .sum()
            }
        };

        Ok(StructuredRecipe {
            title,
            ingredients,
            instructions: steps.join("\n"),
            image: self.get_image(container)?,
            yields: self
                .get_itemprop(container, "recipeYield")?
                .unwrap_or_default(),
            total_time,
        })
    }
}
