// src/config.rs
//! Aggregator configuration: target size, HTTP client settings, per-source configs
//! and the keyword blocklist.
//!
//! Resolution order for [`load_config_default`]:
//! 1) `$AGGREGATOR_CONFIG_PATH` (must exist)
//! 2) `config/aggregator.toml`
//! 3) `config/aggregator.json`
//! 4) built-in defaults
//!
//! `$AGGREGATOR_TARGET_COUNT` overrides `target_count` afterwards.

use anyhow::{anyhow, Context, Result};
use reqwest::Url;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::blocklist::Blocklist;
use crate::error::FetchError;
use crate::item::SourceTag;

pub const ENV_CONFIG_PATH: &str = "AGGREGATOR_CONFIG_PATH";
pub const ENV_TARGET_COUNT: &str = "AGGREGATOR_TARGET_COUNT";
pub const DEFAULT_TARGET_COUNT: usize = 25;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const FEED_ACCEPT: &str = "application/rss+xml, application/xml, text/xml, */*";

#[derive(Debug, Clone, Deserialize)]
pub struct AggregatorConfig {
    #[serde(default = "default_target_count")]
    pub target_count: usize,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default = "default_sources")]
    pub sources: Vec<SourceConfig>,
    #[serde(default)]
    pub blocklist: Blocklist,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            target_count: DEFAULT_TARGET_COUNT,
            http: HttpConfig::default(),
            sources: default_sources(),
            blocklist: Blocklist::default_seed(),
        }
    }
}

impl AggregatorConfig {
    /// Reject configs the assembler cannot run with. Per-source problems are not
    /// checked here; they surface as that source's configuration error.
    pub fn validate(&self) -> Result<()> {
        if self.target_count == 0 {
            return Err(anyhow!("target_count must be at least 1"));
        }
        let quota_total: usize = self.sources.iter().map(SourceConfig::quota).sum();
        if quota_total < self.target_count {
            tracing::warn!(
                quota_total,
                target = self.target_count,
                "source quotas sum below target; result relies on backfill"
            );
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_feed_accept")]
    pub feed_accept: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            feed_accept: default_feed_accept(),
        }
    }
}

/// One configured source. Each case carries what its provider needs.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    Subreddit(SubredditConfig),
    HackerNews(HackerNewsConfig),
    Publication(PublicationConfig),
    GoogleNews(GoogleNewsConfig),
}

impl SourceConfig {
    pub fn tag(&self) -> SourceTag {
        match self {
            SourceConfig::Subreddit(c) => SourceTag::Subreddit(c.name.clone()),
            SourceConfig::HackerNews(_) => SourceTag::HackerNews,
            SourceConfig::Publication(c) => SourceTag::Publication(c.name.clone()),
            SourceConfig::GoogleNews(_) => SourceTag::GoogleNews,
        }
    }

    pub fn quota(&self) -> usize {
        match self {
            SourceConfig::Subreddit(c) => c.quota,
            SourceConfig::HackerNews(c) => c.quota,
            SourceConfig::Publication(c) => c.quota,
            SourceConfig::GoogleNews(c) => c.quota,
        }
    }

    pub fn validate(&self) -> Result<(), FetchError> {
        match self {
            SourceConfig::Subreddit(c) => {
                let ok = !c.name.is_empty()
                    && c.name.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_');
                if !ok {
                    return Err(FetchError::Configuration(format!(
                        "invalid subreddit name `{}`",
                        c.name
                    )));
                }
                if c.strategies.is_empty() {
                    return Err(FetchError::Configuration(format!(
                        "r/{} has no fetch strategies",
                        c.name
                    )));
                }
                check_url("base_url", &c.base_url)
            }
            SourceConfig::HackerNews(c) => check_url("endpoint", &c.endpoint),
            SourceConfig::Publication(c) => {
                if c.name.trim().is_empty() {
                    return Err(FetchError::Configuration(
                        "publication without a name".to_string(),
                    ));
                }
                check_url("feed_url", &c.feed_url)
            }
            SourceConfig::GoogleNews(c) => {
                if c.query.trim().is_empty() {
                    return Err(FetchError::Configuration(
                        "google news source needs a non-empty query".to_string(),
                    ));
                }
                check_url("base_url", &c.base_url)
            }
        }
    }
}

fn check_url(field: &str, raw: &str) -> Result<(), FetchError> {
    Url::parse(raw)
        .map(|_| ())
        .map_err(|e| FetchError::Configuration(format!("{field} `{raw}`: {e}")))
}

/// Ordered fetch strategies for a sub-forum; the first non-empty result wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedditStrategy {
    Json,
    Rss,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubredditConfig {
    pub name: String,
    #[serde(default = "default_reddit_base")]
    pub base_url: String,
    #[serde(default = "default_subreddit_quota")]
    pub quota: usize,
    #[serde(default = "default_subreddit_limit")]
    pub limit: usize,
    #[serde(default)]
    pub min_score: u64,
    #[serde(default = "default_max_age_hours")]
    pub max_age_hours: u64,
    #[serde(default)]
    pub allow_self_posts: bool,
    /// Engagement assigned when the strategy exposes no score (RSS).
    #[serde(default)]
    pub fallback_score: u64,
    #[serde(default = "default_strategies")]
    pub strategies: Vec<RedditStrategy>,
}

impl SubredditConfig {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            base_url: default_reddit_base(),
            quota: default_subreddit_quota(),
            limit: default_subreddit_limit(),
            min_score: 0,
            max_age_hours: default_max_age_hours(),
            allow_self_posts: false,
            fallback_score: 0,
            strategies: default_strategies(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HackerNewsConfig {
    #[serde(default = "default_hn_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_hn_quota")]
    pub quota: usize,
    #[serde(default = "default_hn_limit")]
    pub limit: usize,
    #[serde(default = "default_hn_min_points")]
    pub min_points: u64,
    #[serde(default = "default_max_age_hours")]
    pub max_age_hours: u64,
    #[serde(default)]
    pub allow_self_posts: bool,
}

impl Default for HackerNewsConfig {
    fn default() -> Self {
        Self {
            endpoint: default_hn_endpoint(),
            quota: default_hn_quota(),
            limit: default_hn_limit(),
            min_points: default_hn_min_points(),
            max_age_hours: default_max_age_hours(),
            allow_self_posts: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PublicationConfig {
    pub name: String,
    pub feed_url: String,
    #[serde(default = "default_feed_quota")]
    pub quota: usize,
    #[serde(default = "default_feed_limit")]
    pub limit: usize,
    #[serde(default = "default_max_age_hours")]
    pub max_age_hours: u64,
    #[serde(default = "default_publication_score")]
    pub fallback_score: u64,
}

impl PublicationConfig {
    pub fn new(name: &str, feed_url: &str) -> Self {
        Self {
            name: name.to_string(),
            feed_url: feed_url.to_string(),
            quota: default_feed_quota(),
            limit: default_feed_limit(),
            max_age_hours: default_max_age_hours(),
            fallback_score: default_publication_score(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleNewsConfig {
    pub query: String,
    #[serde(default = "default_gnews_base")]
    pub base_url: String,
    #[serde(default = "default_feed_quota")]
    pub quota: usize,
    #[serde(default = "default_feed_limit")]
    pub limit: usize,
    #[serde(default = "default_gnews_max_age_hours")]
    pub max_age_hours: u64,
    #[serde(default = "default_gnews_score")]
    pub fallback_score: u64,
}

impl GoogleNewsConfig {
    pub fn new(query: &str) -> Self {
        Self {
            query: query.to_string(),
            base_url: default_gnews_base(),
            quota: default_feed_quota(),
            limit: default_feed_limit(),
            max_age_hours: default_gnews_max_age_hours(),
            fallback_score: default_gnews_score(),
        }
    }
}

fn default_target_count() -> usize {
    DEFAULT_TARGET_COUNT
}
fn default_timeout_secs() -> u64 {
    15
}
fn default_user_agent() -> String {
    BROWSER_USER_AGENT.to_string()
}
fn default_feed_accept() -> String {
    FEED_ACCEPT.to_string()
}
fn default_reddit_base() -> String {
    "https://www.reddit.com".to_string()
}
fn default_subreddit_quota() -> usize {
    3
}
fn default_subreddit_limit() -> usize {
    6
}
fn default_max_age_hours() -> u64 {
    48
}
fn default_strategies() -> Vec<RedditStrategy> {
    vec![RedditStrategy::Json, RedditStrategy::Rss]
}
fn default_hn_endpoint() -> String {
    "https://hn.algolia.com/api/v1/search".to_string()
}
fn default_hn_quota() -> usize {
    6
}
fn default_hn_limit() -> usize {
    30
}
fn default_hn_min_points() -> u64 {
    50
}
fn default_feed_quota() -> usize {
    3
}
fn default_feed_limit() -> usize {
    10
}
fn default_publication_score() -> u64 {
    100
}
fn default_gnews_base() -> String {
    "https://news.google.com/rss/search".to_string()
}
fn default_gnews_max_age_hours() -> u64 {
    24
}
fn default_gnews_score() -> u64 {
    80
}

/// Built-in source list: nine tech sub-forums, the link aggregator, two
/// publications and one search feed.
pub fn default_sources() -> Vec<SourceConfig> {
    let mut out: Vec<SourceConfig> = [
        "technology",
        "programming",
        "technews",
        "MachineLearning",
        "artificial",
        "netsec",
        "futurology",
        "cybersecurity",
        "gadgets",
    ]
    .into_iter()
    .map(|name| SourceConfig::Subreddit(SubredditConfig::new(name)))
    .collect();

    out.push(SourceConfig::HackerNews(HackerNewsConfig::default()));
    out.push(SourceConfig::Publication(PublicationConfig::new(
        "TechCrunch",
        "https://techcrunch.com/feed/",
    )));
    out.push(SourceConfig::Publication(PublicationConfig::new(
        "The Verge",
        "https://www.theverge.com/rss/index.xml",
    )));
    out.push(SourceConfig::GoogleNews(GoogleNewsConfig::new(
        "technology OR AI OR software when:1d",
    )));
    out
}

/// Load config from an explicit path. Supports TOML or JSON.
pub fn load_config_from(path: &Path) -> Result<AggregatorConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading aggregator config from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_config(&content, ext.as_str())
        .with_context(|| format!("parsing aggregator config {}", path.display()))
}

/// Load config via env var + fallbacks, then apply env overrides.
pub fn load_config_default() -> Result<AggregatorConfig> {
    let mut cfg = resolve_config()?;
    if let Some(n) = parse_target_env(std::env::var(ENV_TARGET_COUNT).ok()) {
        cfg.target_count = n;
    }
    cfg.validate()?;
    Ok(cfg)
}

fn resolve_config() -> Result<AggregatorConfig> {
    if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_config_from(&pb);
        }
        return Err(anyhow!(
            "{ENV_CONFIG_PATH} points to non-existent path {}",
            pb.display()
        ));
    }
    let toml_p = PathBuf::from("config/aggregator.toml");
    if toml_p.exists() {
        return load_config_from(&toml_p);
    }
    let json_p = PathBuf::from("config/aggregator.json");
    if json_p.exists() {
        return load_config_from(&json_p);
    }
    Ok(AggregatorConfig::default())
}

fn parse_target_env(raw: Option<String>) -> Option<usize> {
    raw.and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|n| *n > 0)
}

fn parse_config(s: &str, hint_ext: &str) -> Result<AggregatorConfig> {
    if hint_ext == "json" || s.trim_start().starts_with('{') {
        return serde_json::from_str(s).context("invalid JSON config");
    }
    toml::from_str(s).context("invalid TOML config")
}
