// src/scraper/fetcher.rs
use crate::scraper::ScraperError;
use reqwest::blocking::Client;
use std::time::Duration;

const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0 Safari/537.36";

/// Anything that can turn a URL into a page body.
pub trait Fetcher: Sync {
    fn fetch(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, ScraperError>;
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, ScraperError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .cookie_store(true)
            .build()
            .map_err(|e| ScraperError::Network(e.to_string()))?;

        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, ScraperError> {
        tracing::debug!("Performing request for {url}");

        let resp = self.client.get(url).timeout(timeout).send()?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ScraperError::Network(format!("HTTP {status} for {url}")));
        }

        let body = resp.bytes()?;
        Ok(body.to_vec())
    }
}
