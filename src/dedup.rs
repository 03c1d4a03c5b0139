// src/dedup.rs
//! Topic + URL deduplication.
//!
//! Items are visited trending-first, then by ascending `source_rank`; the sort is
//! stable so the caller's order breaks remaining ties. The first item of each topic
//! is kept unless a later trending item arrives for a topic whose kept
//! representatives are all non-trending; in that case they are replaced.

use crate::item::Item;
use crate::topic::{normalize, signatures_match};
use std::collections::HashSet;
use tracing::debug;

struct Kept {
    signature: String,
    item: Item,
}

/// Outcome of offering one item to a [`TopicSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offer {
    Kept,
    DuplicateUrl,
    DuplicateTopic,
    /// Kept after evicting this many non-trending representatives of its topic.
    Replaced(usize),
}

/// Representatives kept so far, one per topic and one per URL, in keep order.
#[derive(Default)]
pub struct TopicSet {
    kept: Vec<Kept>,
    seen_urls: HashSet<String>,
}

impl TopicSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.kept.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kept.is_empty()
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.kept.iter().any(|k| k.item.id == id)
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.kept.iter().map(|k| &k.item)
    }

    pub fn into_items(self) -> Vec<Item> {
        self.kept.into_iter().map(|k| k.item).collect()
    }

    /// Keep `item` unless its URL or topic is already represented. A trending item
    /// replaces matching representatives when none of them is trending.
    pub fn offer(&mut self, item: Item) -> Offer {
        if self.seen_urls.contains(&item.url) {
            return Offer::DuplicateUrl;
        }

        let signature = normalize(&item.title);
        let matched: Vec<usize> = self
            .kept
            .iter()
            .enumerate()
            .filter(|(_, k)| signatures_match(&signature, &k.signature))
            .map(|(i, _)| i)
            .collect();

        if matched.is_empty() {
            self.keep(signature, item);
            return Offer::Kept;
        }

        let upgrade = item.trending && matched.iter().all(|&i| !self.kept[i].item.trending);
        if !upgrade {
            debug!(
                target: "dedup",
                dropped = %item.id,
                representative = %self.kept[matched[0]].item.id,
                "topic duplicate"
            );
            return Offer::DuplicateTopic;
        }

        // Highest index first so earlier positions stay valid.
        for &idx in matched.iter().rev() {
            let old = self.kept.remove(idx);
            self.seen_urls.remove(&old.item.url);
            debug!(
                target: "dedup",
                evicted = %old.item.id,
                kept = %item.id,
                "trending item replaces representative"
            );
        }
        self.keep(signature, item);
        Offer::Replaced(matched.len())
    }

    fn keep(&mut self, signature: String, item: Item) {
        self.seen_urls.insert(item.url.clone());
        self.kept.push(Kept { signature, item });
    }
}

/// Priority order used by [`dedupe`].
pub fn sort_by_priority(items: &mut [Item]) {
    items.sort_by(|a, b| {
        b.trending
            .cmp(&a.trending)
            .then(a.source_rank.cmp(&b.source_rank))
    });
}

/// Collapse `items` to at most one per topic and one per URL.
pub fn dedupe(items: Vec<Item>) -> Vec<Item> {
    let mut sorted = items;
    sort_by_priority(&mut sorted);

    let mut set = TopicSet::new();
    let mut dropped = 0u64;
    for item in sorted {
        match set.offer(item) {
            Offer::Kept => {}
            Offer::Replaced(n) => dropped += n as u64,
            Offer::DuplicateUrl | Offer::DuplicateTopic => dropped += 1,
        }
    }

    metrics::counter!("aggregate_dedup_dropped_total").increment(dropped);
    set.into_items()
}
