// src/assemble.rs
//! Balancer / assembler: the one entry point the storage layer calls.
//!
//! Order of operations:
//! 1) fetch every source concurrently (failures contribute nothing)
//! 2) per source, sort by weighted engagement and take the quota slice
//! 3) trending detection over the combined slices
//! 4) sort trending first (higher count first), then by weighted engagement
//! 5) dedupe, truncate to target
//! 6) backfill from the full fetched pool until target or exhaustion

use futures::future::join_all;
use serde::Serialize;
use std::cmp::Ordering;
use tracing::{debug, info};

use crate::config::{load_config_default, AggregatorConfig};
use crate::dedup::{dedupe, Offer, TopicSet};
use crate::ingest::{build_providers, collect, http::HttpClient, types::SourceProvider, Collected};
use crate::item::{Item, SourceTag};
use crate::trending::detect_trending;

/// A source that could not run this cycle because of its configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFailure {
    pub source: SourceTag,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AssemblyReport {
    pub items: Vec<Item>,
    pub config_errors: Vec<SourceFailure>,
    /// Items admitted across all sources before quotas.
    pub fetched: usize,
    pub backfilled: usize,
}

fn by_engagement_desc(a: &Item, b: &Item) -> Ordering {
    b.weighted_score().cmp(&a.weighted_score())
}

fn by_trending_then_engagement(a: &Item, b: &Item) -> Ordering {
    b.trending
        .cmp(&a.trending)
        .then(b.trending_count.unwrap_or(0).cmp(&a.trending_count.unwrap_or(0)))
        .then_with(|| by_engagement_desc(a, b))
        .then(b.created_at.cmp(&a.created_at))
}

/// Fetch all providers concurrently and assemble up to `target` items.
pub async fn assemble(providers: &[Box<dyn SourceProvider>], target: usize) -> AssemblyReport {
    let collected = join_all(providers.iter().map(|p| collect(p.as_ref()))).await;
    balance(collected, target)
}

/// Quota, trending, dedup and backfill over already collected source results.
pub fn balance(collected: Vec<Collected>, target: usize) -> AssemblyReport {
    let mut config_errors = Vec::new();
    let mut slices: Vec<Item> = Vec::new();
    let mut pool: Vec<Item> = Vec::new();

    for c in collected {
        if let Some(e) = c.config_error {
            config_errors.push(SourceFailure {
                source: c.tag.clone(),
                error: e.to_string(),
            });
        }
        let mut items = c.items;
        items.sort_by(by_engagement_desc);
        let take = c.quota.min(items.len());
        debug!(target: "assemble", source = %c.tag, available = items.len(), take, "quota slice");
        slices.extend(items.iter().take(take).cloned());
        pool.extend(items);
    }
    let fetched = pool.len();

    let mut ranked = detect_trending(&slices);
    ranked.sort_by(by_trending_then_engagement);

    let mut kept = dedupe(ranked);
    kept.truncate(target);

    let mut backfilled = 0usize;
    if kept.len() < target {
        let mut set = TopicSet::new();
        for item in kept {
            set.offer(item);
        }

        pool.retain(|item| !set.contains_id(&item.id));
        pool.sort_by(|a, b| by_engagement_desc(a, b).then(b.created_at.cmp(&a.created_at)));

        for item in pool {
            if set.len() >= target {
                break;
            }
            if set.offer(item) == Offer::Kept {
                backfilled += 1;
            }
        }
        metrics::counter!("aggregate_backfill_total").increment(backfilled as u64);
        kept = set.into_items();
    }

    info!(
        target: "assemble",
        fetched,
        slice = slices.len(),
        kept = kept.len(),
        backfilled,
        trending = kept.iter().filter(|i| i.trending).count(),
        target,
        "assembled"
    );

    AssemblyReport {
        items: kept,
        config_errors,
        fetched,
        backfilled,
    }
}

/// Configured set of providers plus the target size.
pub struct Aggregator {
    providers: Vec<Box<dyn SourceProvider>>,
    target_count: usize,
    config_errors: Vec<SourceFailure>,
}

impl Aggregator {
    pub fn new(providers: Vec<Box<dyn SourceProvider>>, target_count: usize) -> Self {
        Self {
            providers,
            target_count,
            config_errors: Vec::new(),
        }
    }

    /// Build providers from config. Sources with invalid config are skipped and
    /// reported with every run.
    pub fn from_config(cfg: &AggregatorConfig) -> anyhow::Result<Self> {
        cfg.validate()?;
        let client = HttpClient::new(&cfg.http)?;
        let (providers, errors) = build_providers(cfg, &client);
        Ok(Self {
            providers,
            target_count: cfg.target_count,
            config_errors: errors
                .into_iter()
                .map(|(source, e)| SourceFailure {
                    source,
                    error: e.to_string(),
                })
                .collect(),
        })
    }

    pub fn target_count(&self) -> usize {
        self.target_count
    }

    pub fn source_count(&self) -> usize {
        self.providers.len()
    }

    /// One full cycle, with the per-source configuration failures.
    pub async fn run(&self) -> AssemblyReport {
        let mut report = assemble(&self.providers, self.target_count).await;
        let mut errors = self.config_errors.clone();
        errors.append(&mut report.config_errors);
        report.config_errors = errors;
        report
    }

    /// The ordered, deduplicated, quota-balanced list for this cycle.
    pub async fn fetch_aggregated_items(&self) -> Vec<Item> {
        self.run().await.items
    }
}

/// Load the default configuration and run one cycle.
pub async fn fetch_aggregated_items() -> anyhow::Result<Vec<Item>> {
    let cfg = load_config_default()?;
    let aggregator = Aggregator::from_config(&cfg)?;
    Ok(aggregator.fetch_aggregated_items().await)
}
