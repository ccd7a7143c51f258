mod request;

pub use request::{HttpFetcher, PageFetcher};
