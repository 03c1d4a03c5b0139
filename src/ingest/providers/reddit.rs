// src/ingest/providers/reddit.rs
//! Community sub-forum provider.
//!
//! Strategies run in configured order (JSON listing, then Atom feed by default).
//! The first one that returns a non-empty payload wins, even when admission leaves
//! nothing of it; the next strategy only runs after a failure or an empty listing. The Atom feed only carries the thread link,
//! so the external article URL is dug out of the entry body.

use async_trait::async_trait;
use once_cell::sync::OnceCell;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;

use crate::blocklist::Blocklist;
use crate::config::{RedditStrategy, SubredditConfig};
use crate::error::{FetchError, FetchResult};
use crate::ingest::feed::parse_feed;
use crate::ingest::http::HttpClient;
use crate::ingest::types::SourceProvider;
use crate::ingest::{host_of, is_http_url, is_on_domains, now_unix, title_or_untitled, Admission};
use crate::item::{Item, SourceTag};

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: Post,
}

#[derive(Debug, Deserialize)]
struct Post {
    id: String,
    title: Option<String>,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    num_comments: i64,
    url: Option<String>,
    #[serde(default)]
    created_utc: f64,
    #[serde(default)]
    permalink: String,
    #[serde(default)]
    is_self: bool,
    #[serde(default)]
    stickied: bool,
}

/// Admitted items plus how many entries the payload carried before admission.
struct Parsed {
    raw: usize,
    items: Vec<Item>,
}

pub struct RedditProvider {
    cfg: SubredditConfig,
    client: HttpClient,
    admission: Admission,
    own_domains: Vec<String>,
}

impl RedditProvider {
    pub fn new(cfg: SubredditConfig, client: HttpClient, blocklist: Arc<Blocklist>) -> Self {
        let admission = Admission::new(blocklist, cfg.max_age_hours);
        let mut own_domains = vec!["reddit.com".to_string(), "redd.it".to_string()];
        if let Some(host) = host_of(&cfg.base_url) {
            if !own_domains.contains(&host) {
                own_domains.push(host);
            }
        }
        Self {
            cfg,
            client,
            admission,
            own_domains,
        }
    }

    fn base(&self) -> &str {
        self.cfg.base_url.trim_end_matches('/')
    }

    pub fn json_url(&self) -> String {
        format!(
            "{}/r/{}/top.json?t=day&limit={}",
            self.base(),
            self.cfg.name,
            self.cfg.limit
        )
    }

    pub fn rss_url(&self) -> String {
        format!("{}/r/{}/top/.rss?t=day", self.base(), self.cfg.name)
    }

    async fn fetch_strategy(&self, strategy: RedditStrategy) -> FetchResult<Parsed> {
        let now = now_unix();
        match strategy {
            RedditStrategy::Json => {
                let body = self.client.get_json(&self.json_url()).await?;
                self.listing(&body, now)
            }
            RedditStrategy::Rss => {
                let body = self.client.get_feed(&self.rss_url()).await?;
                self.feed(&body, now)
            }
        }
    }

    /// Map a `top.json` listing to items.
    pub fn parse_listing(&self, body: &str, now: i64) -> FetchResult<Vec<Item>> {
        self.listing(body, now).map(|p| p.items)
    }

    fn listing(&self, body: &str, now: i64) -> FetchResult<Parsed> {
        let listing: Listing = serde_json::from_str(body)?;
        let tag = self.tag();
        let raw = listing.data.children.len();
        let mut seen = HashSet::new();
        let mut out = Vec::new();

        for (idx, child) in listing
            .data
            .children
            .into_iter()
            .take(self.cfg.limit)
            .enumerate()
        {
            let post = child.data;
            if post.stickied || !seen.insert(post.id.clone()) {
                continue;
            }
            let permalink = self.absolute_permalink(&post.permalink);
            // Relative urls (crossposts, galleries) point back into the forum.
            let external = post.url.filter(|u| {
                !post.is_self && is_http_url(u) && !is_on_domains(u, &self.own_domains)
            });
            if external.is_none() && !self.cfg.allow_self_posts {
                continue;
            }
            let score = u64::try_from(post.score).unwrap_or(0);
            if score < self.cfg.min_score {
                continue;
            }
            let created_at = post.created_utc as i64;
            if self.admission.too_old(now, created_at) {
                continue;
            }
            let title = title_or_untitled(post.title.as_deref());
            if self.admission.blocked(&tag, &title) {
                continue;
            }

            out.push(Item {
                id: format!("reddit:{}", post.id),
                title,
                source: tag.clone(),
                engagement_score: score,
                comment_count: u64::try_from(post.num_comments).unwrap_or(0),
                url: external.unwrap_or_else(|| permalink.clone()),
                created_at,
                permalink,
                source_rank: (idx + 1) as u32,
                trending: false,
                trending_count: None,
            });
        }
        Ok(Parsed { raw, items: out })
    }

    /// Map the Atom feed to items, extracting article links from entry bodies.
    pub fn parse_feed(&self, body: &str, now: i64) -> FetchResult<Vec<Item>> {
        self.feed(body, now).map(|p| p.items)
    }

    fn feed(&self, body: &str, now: i64) -> FetchResult<Parsed> {
        let entries = parse_feed(body)?;
        let raw = entries.len();
        // Feed entries carry no score; every one of them sits at fallback_score.
        if self.cfg.fallback_score < self.cfg.min_score {
            tracing::debug!(
                target: "ingest",
                source = %self.tag(),
                fallback_score = self.cfg.fallback_score,
                min_score = self.cfg.min_score,
                "feed entries below score threshold"
            );
            return Ok(Parsed {
                raw,
                items: Vec::new(),
            });
        }
        let tag = self.tag();
        let mut seen = HashSet::new();
        let mut out = Vec::new();

        for (idx, entry) in entries.into_iter().take(self.cfg.limit).enumerate() {
            let permalink = entry.link.clone().unwrap_or_default();
            let Some(post_id) = post_id(entry.id.as_deref(), &permalink) else {
                continue;
            };
            if !seen.insert(post_id.clone()) {
                continue;
            }
            let external = entry
                .body
                .as_deref()
                .and_then(|html| extract_external_link(html, &self.own_domains));
            if external.is_none() && !self.cfg.allow_self_posts {
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
                id: format!("reddit:{post_id}"),
                title,
                source: tag.clone(),
                engagement_score: self.cfg.fallback_score,
                comment_count: 0,
                url: external.unwrap_or_else(|| permalink.clone()),
                created_at: entry.published_at,
                permalink,
                source_rank: (idx + 1) as u32,
                trending: false,
                trending_count: None,
            });
        }
        Ok(Parsed { raw, items: out })
    }

    fn absolute_permalink(&self, permalink: &str) -> String {
        if permalink.starts_with("http") {
            permalink.to_string()
        } else {
            format!("{}{}", self.base(), permalink)
        }
    }
}

#[async_trait]
impl SourceProvider for RedditProvider {
    async fn fetch_latest(&self) -> FetchResult<Vec<Item>> {
        let mut last_err: Option<FetchError> = None;
        let mut any_ok = false;

        for &strategy in &self.cfg.strategies {
            match self.fetch_strategy(strategy).await {
                Ok(parsed) if parsed.raw > 0 => {
                    tracing::debug!(
                        target: "ingest",
                        source = %self.tag(),
                        ?strategy,
                        raw = parsed.raw,
                        admitted = parsed.items.len(),
                        "strategy answered"
                    );
                    return Ok(parsed.items);
                }
                Ok(_) => {
                    any_ok = true;
                    tracing::debug!(target: "ingest", source = %self.tag(), ?strategy, "strategy returned an empty listing");
                }
                Err(e) => {
                    tracing::debug!(target: "ingest", source = %self.tag(), ?strategy, error = %e, "strategy failed");
                    last_err = Some(e);
                }
            }
        }

        match last_err {
            Some(e) if !any_ok => Err(e),
            _ => Ok(Vec::new()),
        }
    }

    fn tag(&self) -> SourceTag {
        SourceTag::Subreddit(self.cfg.name.clone())
    }

    fn quota(&self) -> usize {
        self.cfg.quota
    }
}

/// Post id from an Atom `<id>` (`t3_` prefix) or from the `comments/<id>` path.
fn post_id(atom_id: Option<&str>, link: &str) -> Option<String> {
    if let Some(id) = atom_id.and_then(|s| s.strip_prefix("t3_")) {
        if !id.is_empty() {
            return Some(id.to_string());
        }
    }
    static RE_COMMENTS: OnceCell<Regex> = OnceCell::new();
    let re = RE_COMMENTS.get_or_init(|| Regex::new(r"(?i)comments/([a-z0-9]+)").unwrap());
    if let Some(c) = re.captures(link) {
        return Some(c[1].to_string());
    }
    atom_id
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .or_else(|| (!link.is_empty()).then(|| link.to_string()))
}

/// Find the article URL in an entry's HTML body.
///
/// First an anchor whose text is `[link]`, then the first `href` that leaves
/// `own_domains`. Either candidate must be an absolute http(s) URL off-site.
pub fn extract_external_link(html: &str, own_domains: &[String]) -> Option<String> {
    static RE_LINK_ANCHOR: OnceCell<Regex> = OnceCell::new();
    static RE_HREF: OnceCell<Regex> = OnceCell::new();
    let re_anchor = RE_LINK_ANCHOR.get_or_init(|| {
        Regex::new(r#"(?is)<a\s[^>]*?href\s*=\s*["']([^"']+)["'][^>]*>\s*\[link\]\s*</a>"#)
            .unwrap()
    });
    let re_href =
        RE_HREF.get_or_init(|| Regex::new(r#"(?i)href\s*=\s*["']([^"']+)["']"#).unwrap());

    let external = |raw: &str| -> Option<String> {
        let href = html_escape::decode_html_entities(raw.trim()).to_string();
        (is_http_url(&href) && !is_on_domains(&href, own_domains)).then_some(href)
    };

    if let Some(href) = re_anchor
        .captures(html)
        .and_then(|c| external(&c[1]))
    {
        return Some(href);
    }
    re_href.captures_iter(html).find_map(|c| external(&c[1]))
}
