// src/ingest/providers/hacker_news.rs
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;

use crate::blocklist::Blocklist;
use crate::config::HackerNewsConfig;
use crate::error::FetchResult;
use crate::ingest::http::HttpClient;
use crate::ingest::types::SourceProvider;
use crate::ingest::{is_on_domains, now_unix, title_or_untitled, Admission};
use crate::item::{Item, SourceTag};

const ITEM_URL: &str = "https://news.ycombinator.com/item?id=";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "objectID")]
    object_id: String,
    title: Option<String>,
    url: Option<String>,
    points: Option<i64>,
    num_comments: Option<i64>,
    #[serde(default)]
    created_at_i: i64,
}

/// Link-aggregator front page via the Algolia search API.
pub struct HackerNewsProvider {
    cfg: HackerNewsConfig,
    client: HttpClient,
    admission: Admission,
    own_domains: Vec<String>,
}

impl HackerNewsProvider {
    pub fn new(cfg: HackerNewsConfig, client: HttpClient, blocklist: Arc<Blocklist>) -> Self {
        let admission = Admission::new(blocklist, cfg.max_age_hours);
        Self {
            cfg,
            client,
            admission,
            own_domains: vec!["news.ycombinator.com".to_string()],
        }
    }

    pub fn front_page_url(&self) -> String {
        format!(
            "{}?tags=front_page&hitsPerPage={}",
            self.cfg.endpoint, self.cfg.limit
        )
    }

    pub fn parse_hits(&self, body: &str, now: i64) -> FetchResult<Vec<Item>> {
        let resp: SearchResponse = serde_json::from_str(body)?;
        let tag = self.tag();
        let mut seen = HashSet::new();
        let mut out = Vec::new();

        for (idx, hit) in resp.hits.into_iter().take(self.cfg.limit).enumerate() {
            if !seen.insert(hit.object_id.clone()) {
                continue;
            }
            let permalink = format!("{ITEM_URL}{}", hit.object_id);
            // Ask/Show threads without a link are discussion-only.
            let external = hit
                .url
                .filter(|u| !u.is_empty() && !is_on_domains(u, &self.own_domains));
            if external.is_none() && !self.cfg.allow_self_posts {
                continue;
            }
            let points = hit.points.and_then(|p| u64::try_from(p).ok()).unwrap_or(0);
            if points < self.cfg.min_points {
                continue;
            }
            if self.admission.too_old(now, hit.created_at_i) {
                continue;
            }
            let title = title_or_untitled(hit.title.as_deref());
            if self.admission.blocked(&tag, &title) {
                continue;
            }

            out.push(Item {
                id: format!("hn:{}", hit.object_id),
                title,
                source: tag.clone(),
                engagement_score: points,
                comment_count: hit
                    .num_comments
                    .and_then(|c| u64::try_from(c).ok())
                    .unwrap_or(0),
                url: external.unwrap_or_else(|| permalink.clone()),
                created_at: hit.created_at_i,
                permalink,
                source_rank: (idx + 1) as u32,
                trending: false,
                trending_count: None,
            });
        }
        Ok(out)
    }
}

#[async_trait]
impl SourceProvider for HackerNewsProvider {
    async fn fetch_latest(&self) -> FetchResult<Vec<Item>> {
        let body = self.client.get_json(&self.front_page_url()).await?;
        self.parse_hits(&body, now_unix())
    }

    fn tag(&self) -> SourceTag {
        SourceTag::HackerNews
    }

    fn quota(&self) -> usize {
        self.cfg.quota
    }
}
