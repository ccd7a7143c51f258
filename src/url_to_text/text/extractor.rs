use crate::config::LlmConfig;
use crate::error::StrategyError;
use crate::model::TextExtraction;
use crate::providers::{build_extraction_prompt, CompletionProvider};
use log::{debug, info, warn};
use serde_json::Value;
use std::sync::Arc;

/// Turns free text into ingredients, instructions and notes with one model call.
///
/// Extraction is best-effort: every failure (no model configured, empty input,
/// provider error, undecodable response) degrades to an empty [`TextExtraction`].
#[derive(Clone)]
pub struct TextExtractor {
    provider: Option<Arc<dyn CompletionProvider>>,
    max_input_chars: usize,
    max_tokens: u32,
    temperature: f32,
}

impl TextExtractor {
    pub fn new(provider: Option<Arc<dyn CompletionProvider>>, config: &LlmConfig) -> Self {
        Self {
            provider,
            max_input_chars: config.max_input_chars,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    pub fn max_input_chars(&self) -> usize {
        self.max_input_chars
    }

    pub fn has_model(&self) -> bool {
        self.provider.is_some()
    }

    pub async fn extract(&self, text: &str) -> TextExtraction {
        match self.try_extract(text).await {
            Ok(extraction) => extraction,
            Err(e) => {
                warn!("{}", e);
                TextExtraction::default()
            }
        }
    }

    async fn try_extract(&self, text: &str) -> Result<TextExtraction, StrategyError> {
        let text = truncate_chars(text.trim(), self.max_input_chars);
        if text.is_empty() {
            return Ok(TextExtraction::default());
        }
        let Some(provider) = &self.provider else {
            return Err(StrategyError::ModelExtractionFailed(
                "no completion provider configured".into(),
            ));
        };

        info!(
            "Extracting recipe structure from {} chars with {}",
            text.chars().count(),
            provider.provider_name()
        );
        let prompt = build_extraction_prompt(text);
        let response = provider
            .complete(&prompt, self.max_tokens, self.temperature)
            .await
            .map_err(|e| StrategyError::ModelExtractionFailed(e.to_string()))?;
        debug!("Model response: {}", response);

        parse_response(&response)
    }
}

/// Decode the first JSON object found in a model response.
fn parse_response(response: &str) -> Result<TextExtraction, StrategyError> {
    let json = locate_json_object(response)
        .ok_or_else(|| StrategyError::ModelExtractionFailed("no JSON object in response".into()))?;
    let value: Value = serde_json::from_str(json)
        .map_err(|e| StrategyError::ModelExtractionFailed(e.to_string()))?;

    Ok(TextExtraction {
        ingredients: string_list(&value["ingredients"]),
        instructions: string_list(&value["instructions"]),
        notes: match &value["notes"] {
            Value::String(s) => s.trim().to_string(),
            Value::Array(items) => string_list(&Value::Array(items.clone())).join("\n"),
            _ => String::new(),
        },
    })
}

/// Normalize a list the model returned: strings, `{quantity, unit, name}`
/// ingredient objects, `{text}` step objects, or one newline-separated string.
fn string_list(value: &Value) -> Vec<String> {
    let items: Vec<String> = match value {
        Value::Array(items) => items.iter().filter_map(item_text).collect(),
        Value::String(s) => s.lines().map(str::to_string).collect(),
        _ => Vec::new(),
    };
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn item_text(item: &Value) -> Option<String> {
    match item {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(obj) => {
            if let Some(text) = obj.get("text").and_then(Value::as_str) {
                return Some(text.to_string());
            }
            let parts: Vec<String> = ["quantity", "unit", "name"]
                .iter()
                .filter_map(|key| match obj.get(*key) {
                    Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
                    Some(Value::Number(n)) => Some(n.to_string()),
                    _ => None,
                })
                .collect();
            (!parts.is_empty()).then(|| parts.join(" "))
        }
        _ => None,
    }
}

/// Locate the first JSON object in `text`, tolerating prose and code fences around it.
///
/// Prefers the first balanced `{...}` span; falls back to the span from the
/// first `{` to the last `}` when the balanced one does not decode.
pub fn locate_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let balanced = balanced_span(&text[start..]).map(|len| &text[start..start + len]);
    if let Some(candidate) = balanced {
        if serde_json::from_str::<Value>(candidate).is_ok() {
            return Some(candidate);
        }
    }
    let end = text.rfind('}')?;
    if end < start {
        return balanced;
    }
    Some(&text[start..=end])
}

/// Byte length of the balanced object starting at `text[0] == '{'`.
fn balanced_span(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// Cut `text` to at most `max_chars` characters on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
