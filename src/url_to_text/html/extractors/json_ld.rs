use super::{decode_html_symbols, Extractor, ExtractorResult, ParsingContext};
use crate::model::StructuredRecipe;
use log::debug;
use scraper::Selector;
use serde::Deserialize;
use serde_json::Value;

/// Reads schema.org `Recipe` objects out of `application/ld+json` scripts.
pub struct JsonLdExtractor;

impl JsonLdExtractor {
    fn convert_to_recipe(&self, recipe: JsonLdRecipe) -> StructuredRecipe {
        let ingredients = match recipe.recipe_ingredient {
            Some(RecipeIngredients::Strings(items)) => items
                .into_iter()
                .map(|i| decode_html_symbols(&i))
                .filter(|i| !i.is_empty())
                .collect(),
            Some(RecipeIngredients::Single(item)) => item
                .lines()
                .map(decode_html_symbols)
                .filter(|i| !i.is_empty())
                .collect(),
            Some(RecipeIngredients::Objects(items)) => items
                .into_iter()
                .filter(|ing| !ing.name.trim().is_empty())
                .map(|ing| {
                    let amount = ing.amount.as_deref().unwrap_or("").trim();
                    let name = decode_html_symbols(&ing.name);
                    if amount.is_empty() {
                        name
                    } else {
                        format!("{amount} {name}")
                    }
                })
                .collect(),
            None => Vec::new(),
        };

        let steps: Vec<String> = match recipe.recipe_instructions {
            Some(instructions) => instructions
                .into_steps()
                .iter()
                .map(|step| decode_html_symbols(step))
                .filter(|step| !step.is_empty())
                .collect(),
            None => Vec::new(),
        };

        let image = match recipe.image {
            Some(ImageType::String(url)) => decode_html_symbols(&url),
            Some(ImageType::Object(obj)) => obj.url,
            Some(ImageType::MultipleStrings(urls)) => urls
                .first()
                .map(|u| decode_html_symbols(u))
                .unwrap_or_default(),
            Some(ImageType::MultipleObjects(objs)) => {
                objs.into_iter().next().map(|o| o.url).unwrap_or_default()
            }
            Some(ImageType::None) | None => String::new(),
        };

        let yields = match recipe.recipe_yield {
            Some(RecipeYield::String(s)) => s,
            Some(RecipeYield::Number(n)) => n.to_string(),
            // Prefer the descriptive entry ("4 servings") over the bare number
            Some(RecipeYield::Array(items)) => items
                .iter()
                .find(|s| s.contains(char::is_alphabetic))
                .or_else(|| items.first())
                .cloned()
                .unwrap_or_default(),
            None => String::new(),
        };

        let total_time = recipe
            .total_time
            .as_deref()
            .and_then(duration_minutes)
            .or_else(|| {
                let prep = recipe.prep_time.as_deref().and_then(duration_minutes);
                let cook = recipe.cook_time.as_deref().and_then(duration_minutes);
                match (prep, cook) {
                    (None, None) => None,
                    (p, c) => Some(p.unwrap_or(0) + c.unwrap_or(0)),
                }
            })
            .unwrap_or(0);

        StructuredRecipe {
            title: recipe
                .name
                .map(|n| decode_html_symbols(&n))
                .unwrap_or_default(),
            ingredients,
            instructions: steps.join("\n"),
            image,
            yields: decode_html_symbols(&yields),
            total_time,
        }
    }
}

#[derive(Debug, Deserialize)]
struct JsonLdRecipe {
    name: Option<String>,
    image: Option<ImageType>,
    #[serde(rename = "recipeIngredient", alias = "ingredients")]
    recipe_ingredient: Option<RecipeIngredients>,
    #[serde(rename = "recipeInstructions")]
    recipe_instructions: Option<RecipeInstructions>,
    #[serde(rename = "recipeYield")]
    recipe_yield: Option<RecipeYield>,
    #[serde(rename = "prepTime")]
    prep_time: Option<String>,
    #[serde(rename = "cookTime")]
    cook_time: Option<String>,
    #[serde(rename = "totalTime")]
    total_time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImageObject {
    url: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ImageType {
    None,
    String(String),
    Object(ImageObject),
    MultipleStrings(Vec<String>),
    MultipleObjects(Vec<ImageObject>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecipeIngredients {
    Strings(Vec<String>),
    Single(String),
    Objects(Vec<IngredientObject>),
}

#[derive(Debug, Deserialize)]
struct IngredientObject {
    name: String,
    amount: Option<String>,
}

/// `recipeInstructions` shows up as a string, a list of strings, a list of
/// HowToStep/HowToSection objects, or lists of those lists.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecipeInstructions {
    String(String),
    Items(Vec<InstructionItem>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InstructionItem {
    Text(String),
    Nested(Vec<InstructionItem>),
    Section(HowToSection),
    Step(HowToStep),
}

#[derive(Debug, Deserialize)]
struct HowToSection {
    #[serde(rename = "itemListElement")]
    item_list_element: Vec<InstructionItem>,
}

#[derive(Debug, Deserialize)]
struct HowToStep {
    text: Option<String>,
    name: Option<String>,
    description: Option<String>,
}

impl RecipeInstructions {
    fn into_steps(self) -> Vec<String> {
        let mut steps = Vec::new();
        match self {
            RecipeInstructions::String(text) => {
                steps.extend(text.lines().map(|l| l.trim().to_string()));
            }
            RecipeInstructions::Items(items) => {
                for item in items {
                    item.collect_into(&mut steps);
                }
            }
        }
        steps
    }
}

impl InstructionItem {
    fn collect_into(self, steps: &mut Vec<String>) {
        match self {
            InstructionItem::Text(text) => steps.push(text),
            InstructionItem::Nested(items) => {
                for item in items {
                    item.collect_into(steps);
                }
            }
            InstructionItem::Section(section) => {
                for item in section.item_list_element {
                    item.collect_into(steps);
                }
            }
            InstructionItem::Step(step) => {
                // Prefer text over name
                if let Some(text) = step.text.or(step.name).or(step.description) {
                    steps.push(text);
                }
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecipeYield {
    String(String),
    Number(f64),
    Array(Vec<String>),
}

/// Convert an ISO 8601 duration (`PT1H30M`, `PT15-20M`, `PT5400.0S`, `P1DT2H`) to minutes.
///
/// Ranges resolve to their upper bound. Returns `None` for anything unparseable.
pub(crate) fn duration_minutes(duration: &str) -> Option<u32> {
    let duration = duration.trim();
    let rest = duration.strip_prefix('P').or_else(|| duration.strip_prefix('p'))?;
    let mut seconds = 0.0f64;
    let mut number = String::new();
    let mut in_time = false;
    let mut matched = false;

    for c in rest.chars() {
        match c.to_ascii_uppercase() {
            'T' => in_time = true,
            '0'..='9' | '.' => number.push(c),
            '-' => number.clear(),
            unit @ ('D' | 'H' | 'M' | 'S' | 'W') => {
                let value: f64 = number.parse().ok()?;
                number.clear();
                seconds += match unit {
                    'W' => value * 7.0 * 86_400.0,
                    'D' => value * 86_400.0,
                    'H' => value * 3_600.0,
                    'M' if in_time => value * 60.0,
                    // Months are meaningless for cooking times
                    'M' => return None,
                    _ => value,
                };
                matched = true;
            }
            _ => return None,
        }
    }

    if !matched {
        return None;
    }
    Some((seconds / 60.0).round() as u32)
}

fn is_recipe_type(value: &Value) -> bool {
    match value.get("@type") {
        Some(Value::String(t)) => t.eq_ignore_ascii_case("recipe"),
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .any(|t| t.eq_ignore_ascii_case("recipe")),
        _ => false,
    }
}

/// Find the first Recipe node in a JSON-LD value: root, array, or `@graph`.
fn find_recipe(value: &Value) -> Option<&Value> {
    if is_recipe_type(value) {
        return Some(value);
    }
    if let Some(items) = value.as_array() {
        return items.iter().find_map(find_recipe);
    }
    if let Some(graph) = value.get("@graph") {
        return find_recipe(graph);
    }
    None
}

impl Extractor for JsonLdExtractor {
    fn name(&self) -> &str {
        "json_ld"
    }

    fn parse(&self, context: &ParsingContext) -> ExtractorResult {
        debug!("JsonLdExtractor: Starting parse for URL: {}", context.url);
        let selector = Selector::parse("script[type='application/ld+json']")
            .map_err(|e| format!("invalid selector: {e}"))?;

        let scripts: Vec<_> = context.document.select(&selector).collect();
        debug!(
            "JsonLdExtractor: Found {} JSON-LD script tags",
            scripts.len()
        );

        for (index, script) in scripts.iter().enumerate() {
            let raw_json: String = script.text().collect();
            let cleaned_json = sanitize_json(&raw_json);

            let json_ld = match serde_json::from_str::<Value>(&cleaned_json) {
                Ok(json_ld) => json_ld,
                Err(e) => {
                    debug!("JsonLdExtractor: Failed to parse JSON-LD {}: {}", index, e);
                    continue;
                }
            };

            let Some(recipe) = find_recipe(&json_ld) else {
                debug!("JsonLdExtractor: No recipe in JSON-LD {}", index);
                continue;
            };

            match serde_json::from_value::<JsonLdRecipe>(recipe.clone()) {
                Ok(recipe) => return Ok(self.convert_to_recipe(recipe)),
                Err(e) => {
                    debug!("JsonLdExtractor: Failed to convert to JsonLdRecipe: {}", e);
                }
            }
        }

        Err("No valid recipe found in any JSON-LD script".into())
    }
}

/// Repair the most common JSON-LD breakage: HTML comment/CDATA wrappers,
/// raw control characters inside strings, and trailing commas.
fn sanitize_json(json_str: &str) -> String {
    let trimmed = json_str
        .trim()
        .trim_start_matches("<!--")
        .trim_end_matches("-->")
        .trim()
        .trim_start_matches("//<![CDATA[")
        .trim_end_matches("//]]>")
        .trim();

    let mut out = String::with_capacity(trimmed.len());
    let mut in_string = false;
    let mut escaped = false;
    let chars: Vec<char> = trimmed.chars().collect();

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            match c {
                _ if escaped => {
                    escaped = false;
                    out.push(c);
                }
                '\\' => {
                    escaped = true;
                    out.push(c);
                }
                '"' => {
                    in_string = false;
                    out.push(c);
                }
                '\n' | '\r' | '\t' => out.push(' '),
                _ => out.push(c),
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            ',' => {
                let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
                if !matches!(next, Some(']') | Some('}')) {
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
    }

    out
}
