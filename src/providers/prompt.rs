/// Instructions sent ahead of the text whenever a recipe is recovered from free text.
///
/// The prompt is loaded from `prompt.txt` at compile time using the
/// `include_str!` macro, making it easy to edit without dealing with
/// Rust string syntax.
pub const RECIPE_EXTRACTION_PROMPT: &str = include_str!("prompt.txt");

/// Build the full completion prompt for a block of source text.
pub fn build_extraction_prompt(text: &str) -> String {
    format!("{}\n{}", RECIPE_EXTRACTION_PROMPT.trim_end(), text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_is_embedded() {
        assert!(!RECIPE_EXTRACTION_PROMPT.is_empty());
        assert!(RECIPE_EXTRACTION_PROMPT.contains("\"ingredients\""));
        assert!(RECIPE_EXTRACTION_PROMPT.contains("\"instructions\""));
        assert!(RECIPE_EXTRACTION_PROMPT.contains("\"notes\""));
        assert!(RECIPE_EXTRACTION_PROMPT.contains("ONLY a JSON object"));
    }

    #[test]
    fn test_build_extraction_prompt_appends_text() {
        let prompt = build_extraction_prompt("2 eggs, whisk");
        assert!(prompt.starts_with(RECIPE_EXTRACTION_PROMPT.trim_end()));
        assert!(prompt.ends_with("Text:\n2 eggs, whisk"));
    }
}
