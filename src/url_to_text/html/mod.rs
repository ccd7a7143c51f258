pub mod extractors;
mod page;

pub use page::{visible_text, PageSummary};
