// src/ingest/http.rs
//! Shared HTTP client with a browser-like header set.

use reqwest::header::ACCEPT;
use reqwest::Client;
use std::time::Duration;

use crate::config::HttpConfig;
use crate::error::{FetchError, FetchResult};

const JSON_ACCEPT: &str = "application/json, text/plain, */*";

#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    feed_accept: String,
}

impl HttpClient {
    pub fn new(cfg: &HttpConfig) -> FetchResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .user_agent(cfg.user_agent.clone())
            .build()
            .map_err(|e| FetchError::Configuration(format!("building HTTP client: {e}")))?;
        Ok(Self {
            client,
            feed_accept: cfg.feed_accept.clone(),
        })
    }

    /// GET an RSS/Atom document.
    pub async fn get_feed(&self, url: &str) -> FetchResult<String> {
        self.get_text(url, &self.feed_accept).await
    }

    /// GET a JSON API payload as text.
    pub async fn get_json(&self, url: &str) -> FetchResult<String> {
        self.get_text(url, JSON_ACCEPT).await
    }

    async fn get_text(&self, url: &str, accept: &str) -> FetchResult<String> {
        let resp = self.client.get(url).header(ACCEPT, accept).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(resp.text().await?)
    }
}
