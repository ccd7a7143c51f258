use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use std::collections::HashMap;
use std::error::Error;
use std::time::Duration;

/// Generic HTTP fetch capability
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn get(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
        timeout: Duration,
    ) -> Result<String, Box<dyn Error + Send + Sync>>;
}

/// Fetches pages with reqwest; one client is shared across requests.
#[derive(Clone, Default)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

fn to_header_map(headers: &HashMap<String, String>) -> Result<HeaderMap, Box<dyn Error + Send + Sync>> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        map.insert(
            HeaderName::from_bytes(name.as_bytes())?,
            HeaderValue::from_str(value)?,
        );
    }
    Ok(map)
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn get(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
        timeout: Duration,
    ) -> Result<String, Box<dyn Error + Send + Sync>> {
        debug!("Fetching {} (timeout {:?})", url, timeout);
        let response = self
            .client
            .get(url)
            .headers(to_header_map(headers)?)
            .timeout(timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(format!("Request failed with status: {}", response.status()).into());
        }

        let body = response.text().await?;
        Ok(body)
    }
}
