mod extractor;

pub use extractor::{locate_json_object, truncate_chars, TextExtractor};
