// src/ingest/mod.rs
pub mod feed;
pub mod http;
pub mod providers;
pub mod types;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, histogram};
use once_cell::sync::OnceCell;
use std::sync::Arc;

use crate::blocklist::Blocklist;
use crate::config::{AggregatorConfig, SourceConfig};
use crate::error::FetchError;
use crate::ingest::http::HttpClient;
use crate::ingest::providers::{
    google_news::GoogleNewsProvider, hacker_news::HackerNewsProvider,
    publication::PublicationProvider, reddit::RedditProvider,
};
use crate::ingest::types::SourceProvider;
use crate::item::{Item, SourceTag};

/// One-time metrics registration (so series show up once an exporter is installed).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "aggregate_items_fetched_total",
            "Items admitted by source providers."
        );
        describe_counter!(
            "aggregate_items_blocked_total",
            "Items rejected by the keyword blocklist."
        );
        describe_counter!(
            "aggregate_provider_errors_total",
            "Provider fetch/parse/config errors."
        );
        describe_histogram!("aggregate_fetch_ms", "Per-source fetch time in milliseconds.");
        describe_counter!(
            "aggregate_dedup_dropped_total",
            "Items removed as URL or topic duplicates."
        );
        describe_counter!(
            "aggregate_backfill_total",
            "Items appended from the leftover pool."
        );
        describe_gauge!(
            "aggregate_trending_topics",
            "Topics seen in two or more sources during the last cycle."
        );
    });
}

/// Clean a headline: decode entities, strip tags, fold quotes and whitespace.
pub fn clean_title(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Title used when a source gives none.
pub const UNTITLED: &str = "Untitled";

/// Cleaned title, or [`UNTITLED`] when nothing is left.
pub fn title_or_untitled(raw: Option<&str>) -> String {
    let t = clean_title(raw.unwrap_or_default());
    if t.is_empty() {
        UNTITLED.to_string()
    } else {
        t
    }
}

/// Absolute http(s) URL. Relative paths and other schemes are not links out.
pub fn is_http_url(url: &str) -> bool {
    let u = url.trim_start();
    u.starts_with("http://") || u.starts_with("https://")
}

/// Recency window and blocklist shared by all providers.
#[derive(Debug, Clone)]
pub struct Admission {
    pub blocklist: Arc<Blocklist>,
    pub max_age_secs: i64,
}

impl Admission {
    pub fn new(blocklist: Arc<Blocklist>, max_age_hours: u64) -> Self {
        Self {
            blocklist,
            max_age_secs: i64::try_from(max_age_hours.saturating_mul(3600)).unwrap_or(i64::MAX),
        }
    }

    /// Unknown timestamps (0) are never too old.
    pub fn too_old(&self, now: i64, created_at: i64) -> bool {
        created_at > 0 && now.saturating_sub(created_at) > self.max_age_secs
    }

    pub fn blocked(&self, source: &SourceTag, title: &str) -> bool {
        match self.blocklist.find_match(title) {
            Some((category, keyword)) => {
                tracing::debug!(
                    target: "ingest",
                    source = %source,
                    category,
                    keyword,
                    title,
                    "blocked by keyword"
                );
                counter!("aggregate_items_blocked_total").increment(1);
                true
            }
            None => false,
        }
    }
}

/// Result of running one provider for one cycle.
pub struct Collected {
    pub tag: SourceTag,
    pub quota: usize,
    pub items: Vec<Item>,
    /// Only configuration errors are kept; transport/parse errors become an
    /// empty contribution.
    pub config_error: Option<FetchError>,
}

/// Run one provider, absorbing transport and parse failures.
pub async fn collect(provider: &dyn SourceProvider) -> Collected {
    ensure_metrics_described();
    let tag = provider.tag();
    let quota = provider.quota();

    let t0 = std::time::Instant::now();
    let res = provider.fetch_latest().await;
    histogram!("aggregate_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);

    match res {
        Ok(items) => {
            tracing::info!(target: "ingest", source = %tag, count = items.len(), "source fetched");
            counter!("aggregate_items_fetched_total").increment(items.len() as u64);
            Collected {
                tag,
                quota,
                items,
                config_error: None,
            }
        }
        Err(e) => {
            counter!("aggregate_provider_errors_total").increment(1);
            let config_error = if e.is_configuration() {
                tracing::error!(target: "ingest", source = %tag, error = %e, "source unusable");
                Some(e)
            } else {
                tracing::warn!(target: "ingest", source = %tag, error = %e, "source failed; contributing nothing");
                None
            };
            Collected {
                tag,
                quota,
                items: Vec::new(),
                config_error,
            }
        }
    }
}

/// Build one provider per configured source. Sources whose config does not
/// validate are returned as errors instead.
pub fn build_providers(
    cfg: &AggregatorConfig,
    client: &HttpClient,
) -> (Vec<Box<dyn SourceProvider>>, Vec<(SourceTag, FetchError)>) {
    let blocklist = Arc::new(cfg.blocklist.clone());
    let mut providers: Vec<Box<dyn SourceProvider>> = Vec::with_capacity(cfg.sources.len());
    let mut errors = Vec::new();

    for source in &cfg.sources {
        if let Err(e) = source.validate() {
            tracing::error!(target: "ingest", source = %source.tag(), error = %e, "invalid source config");
            errors.push((source.tag(), e));
            continue;
        }
        let provider: Box<dyn SourceProvider> = match source {
            SourceConfig::Subreddit(c) => Box::new(RedditProvider::new(
                c.clone(),
                client.clone(),
                blocklist.clone(),
            )),
            SourceConfig::HackerNews(c) => Box::new(HackerNewsProvider::new(
                c.clone(),
                client.clone(),
                blocklist.clone(),
            )),
            SourceConfig::Publication(c) => Box::new(PublicationProvider::new(
                c.clone(),
                client.clone(),
                blocklist.clone(),
            )),
            SourceConfig::GoogleNews(c) => Box::new(GoogleNewsProvider::new(
                c.clone(),
                client.clone(),
                blocklist.clone(),
            )),
        };
        providers.push(provider);
    }

    (providers, errors)
}

/// Host of `url` without a leading `www.`, lowercased.
pub fn host_of(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_ascii_lowercase();
    Some(host.strip_prefix("www.").unwrap_or(&host).to_string())
}

/// Whether `url` points at one of `domains` or a subdomain of it.
pub fn is_on_domains(url: &str, domains: &[String]) -> bool {
    match host_of(url) {
        Some(host) => domains
            .iter()
            .any(|d| host == *d || host.ends_with(&format!(".{d}"))),
        None => false,
    }
}

pub(crate) fn now_unix() -> i64 {
    chrono::Utc::now().timestamp()
}
