// src/ingest/providers/google_news.rs
use async_trait::async_trait;
use reqwest::Url;
use std::collections::HashSet;
use std::sync::Arc;

use crate::blocklist::Blocklist;
use crate::config::GoogleNewsConfig;
use crate::error::{FetchError, FetchResult};
use crate::ingest::feed::parse_feed;
use crate::ingest::http::HttpClient;
use crate::ingest::types::SourceProvider;
use crate::ingest::{clean_title, now_unix, title_or_untitled, Admission};
use crate::item::{Item, SourceTag};

/// Search-aggregator RSS for a fixed query.
pub struct GoogleNewsProvider {
    cfg: GoogleNewsConfig,
    client: HttpClient,
    admission: Admission,
}

impl GoogleNewsProvider {
    pub fn new(cfg: GoogleNewsConfig, client: HttpClient, blocklist: Arc<Blocklist>) -> Self {
        let admission = Admission::new(blocklist, cfg.max_age_hours);
        Self {
            cfg,
            client,
            admission,
        }
    }

    pub fn search_url(&self) -> FetchResult<String> {
        if self.cfg.query.trim().is_empty() {
            return Err(FetchError::Configuration(
                "google news source needs a non-empty query".to_string(),
            ));
        }
        Url::parse_with_params(
            &self.cfg.base_url,
            &[
                ("q", self.cfg.query.as_str()),
                ("hl", "en-US"),
                ("gl", "US"),
                ("ceid", "US:en"),
            ],
        )
        .map(String::from)
        .map_err(|e| FetchError::Configuration(format!("base_url `{}`: {e}", self.cfg.base_url)))
    }

    pub fn parse_items(&self, body: &str, now: i64) -> FetchResult<Vec<Item>> {
        let entries = parse_feed(body)?;
        let tag = self.tag();
        let mut seen = HashSet::new();
        let mut out = Vec::new();

        for (idx, entry) in entries.into_iter().take(self.cfg.limit).enumerate() {
            let Some(link) = entry.link else {
                continue;
            };
            let key = entry.id.unwrap_or_else(|| link.clone());
            if !seen.insert(key.clone()) {
                continue;
            }
            if self.admission.too_old(now, entry.published_at) {
                continue;
            }
            let title = strip_publisher(
                &title_or_untitled(entry.title.as_deref()),
                entry.publisher.as_deref(),
            );
            if self.admission.blocked(&tag, &title) {
                continue;
            }

            out.push(Item {
                id: format!("gnews:{key}"),
                title,
                source: tag.clone(),
                engagement_score: self.cfg.fallback_score,
                comment_count: 0,
                url: link.clone(),
                created_at: entry.published_at,
                permalink: link,
                source_rank: (idx + 1) as u32,
                trending: false,
                trending_count: None,
            });
        }
        Ok(out)
    }
}

#[async_trait]
impl SourceProvider for GoogleNewsProvider {
    async fn fetch_latest(&self) -> FetchResult<Vec<Item>> {
        let url = self.search_url()?;
        let body = self.client.get_feed(&url).await?;
        self.parse_items(&body, now_unix())
    }

    fn tag(&self) -> SourceTag {
        SourceTag::GoogleNews
    }

    fn quota(&self) -> usize {
        self.cfg.quota
    }
}

/// Drop the trailing ` - Publisher` the search feed appends to headlines.
fn strip_publisher(title: &str, publisher: Option<&str>) -> String {
    if let Some(p) = publisher.map(clean_title).filter(|p| !p.is_empty()) {
        if let Some(stripped) = title.strip_suffix(&format!(" - {p}")) {
            return stripped.trim().to_string();
        }
    }
    title.to_string()
}
