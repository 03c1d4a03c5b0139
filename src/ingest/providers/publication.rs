// src/ingest/providers/publication.rs
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;

use crate::blocklist::Blocklist;
use crate::config::PublicationConfig;
use crate::error::FetchResult;
use crate::ingest::feed::parse_feed;
use crate::ingest::http::HttpClient;
use crate::ingest::types::SourceProvider;
use crate::ingest::{now_unix, title_or_untitled, Admission};
use crate::item::{Item, SourceTag};

/// Editorial RSS/Atom feed. No engagement data; every item gets `fallback_score`.
pub struct PublicationProvider {
    cfg: PublicationConfig,
    client: HttpClient,
    admission: Admission,
}

impl PublicationProvider {
    pub fn new(cfg: PublicationConfig, client: HttpClient, blocklist: Arc<Blocklist>) -> Self {
        let admission = Admission::new(blocklist, cfg.max_age_hours);
        Self {
            cfg,
            client,
            admission,
        }
    }

    pub fn parse_items(&self, body: &str, now: i64) -> FetchResult<Vec<Item>> {
        let entries = parse_feed(body)?;
        let tag = self.tag();
        let slug = slug(&self.cfg.name);
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
            let title = title_or_untitled(entry.title.as_deref());
            if self.admission.blocked(&tag, &title) {
                continue;
            }

            out.push(Item {
                id: format!("pub:{slug}:{key}"),
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
impl SourceProvider for PublicationProvider {
    async fn fetch_latest(&self) -> FetchResult<Vec<Item>> {
        let body = self.client.get_feed(&self.cfg.feed_url).await?;
        self.parse_items(&body, now_unix())
    }

    fn tag(&self) -> SourceTag {
        SourceTag::Publication(self.cfg.name.clone())
    }

    fn quota(&self) -> usize {
        self.cfg.quota
    }
}

fn slug(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
