// src/trending.rs
//! Cross-source trending detection.
//!
//! Pass 1 groups items by topic in input order. Each group is keyed by the signature
//! of its first member and compared against that member's title; a group accepts at
//! most one item per source. Pass 2 relabels: every input item whose title matches
//! the key of a group with two or more members is marked trending with that group's
//! member count.

use crate::item::{Item, SourceTag};
use crate::topic::{normalize, same_topic};
use tracing::debug;

#[derive(Debug)]
struct TopicGroup<'a> {
    key: String,
    representative_title: &'a str,
    sources: Vec<&'a SourceTag>,
}

/// A topic reported by at least two distinct sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendingTopic {
    pub key: String,
    pub count: u32,
}

/// Topics from `items` that appear in two or more distinct sources, in first-seen order.
pub fn trending_topics(items: &[Item]) -> Vec<TrendingTopic> {
    let mut groups: Vec<TopicGroup<'_>> = Vec::new();

    for item in items {
        match groups
            .iter_mut()
            .find(|g| same_topic(&item.title, g.representative_title))
        {
            Some(group) => {
                // Same-source repeats neither join nor open a group.
                if !group.sources.contains(&&item.source) {
                    group.sources.push(&item.source);
                }
            }
            None => groups.push(TopicGroup {
                key: normalize(&item.title),
                representative_title: &item.title,
                sources: vec![&item.source],
            }),
        }
    }

    groups
        .into_iter()
        .filter(|g| g.sources.len() >= 2)
        .map(|g| TrendingTopic {
            key: g.key,
            count: g.sources.len() as u32,
        })
        .collect()
}

/// Annotate `items` with trending flags. Returns fresh copies in input order.
pub fn detect_trending(items: &[Item]) -> Vec<Item> {
    let topics = trending_topics(items);
    metrics::gauge!("aggregate_trending_topics").set(topics.len() as f64);
    for t in &topics {
        debug!(target: "trending", key = %t.key, count = t.count, "trending topic");
    }

    items
        .iter()
        .map(|item| {
            match topics.iter().find(|t| same_topic(&item.title, &t.key)) {
                Some(t) => item.with_trending(t.count),
                None => item.clone(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn it(id: &str, title: &str, source: SourceTag) -> Item {
        Item {
            id: id.into(),
            title: title.into(),
            source,
            engagement_score: 0,
            comment_count: 0,
            url: format!("https://example.com/{id}"),
            created_at: 0,
            permalink: format!("https://example.com/{id}"),
            source_rank: 1,
            trending: false,
            trending_count: None,
        }
    }

    fn sub(name: &str) -> SourceTag {
        SourceTag::Subreddit(name.into())
    }

    #[test]
    fn cross_source_pair_is_trending() {
        let items = vec![
            it("a", "Company X launches new AI chip", sub("technology")),
            it("b", "company x launches new ai chip today", SourceTag::HackerNews),
            it("c", "Kernel maintainers discuss memory safety", sub("programming")),
        ];
        let out = detect_trending(&items);
        assert!(out[0].trending && out[1].trending);
        assert_eq!(out[0].trending_count, Some(2));
        assert_eq!(out[1].trending_count, Some(2));
        assert!(!out[2].trending);
        assert_eq!(out[2].trending_count, None);
    }

    #[test]
    fn same_source_repeats_do_not_count() {
        let items = vec![
            it("a", "Company X launches new AI chip", sub("technology")),
            it("b", "Company X launches new AI chip today", sub("technology")),
        ];
        let out = detect_trending(&items);
        assert!(out.iter().all(|i| !i.trending));
    }

    #[test]
    fn relabel_covers_non_members() {
        // "b" is skipped as a same-source repeat during grouping but still matches
        // the trending key in the relabel pass.
        let items = vec![
            it("a", "Company X launches new AI chip", sub("technology")),
            it("b", "Company X launches new AI chip today", sub("technology")),
            it("c", "Company X launches AI chip", SourceTag::HackerNews),
        ];
        let out = detect_trending(&items);
        assert!(out.iter().all(|i| i.trending));
        assert!(out.iter().all(|i| i.trending_count == Some(2)));
    }

    #[test]
    fn counts_distinct_sources() {
        let items = vec![
            it("a", "Massive outage takes down cloud provider", sub("technology")),
            it("b", "Cloud provider outage massive", SourceTag::HackerNews),
            it("c", "Massive cloud provider outage explained", SourceTag::GoogleNews),
        ];
        let topics = trending_topics(&items);
        assert_eq!(topics.len(), 1);
        assert_eq!(topics[0].count, 3);
        assert_eq!(topics[0].key, normalize("Massive outage takes down cloud provider"));
    }

    #[test]
    fn input_is_not_mutated() {
        let items = vec![
            it("a", "Company X launches new AI chip", sub("technology")),
            it("b", "company x launches new ai chip today", SourceTag::HackerNews),
        ];
        let _ = detect_trending(&items);
        assert!(items.iter().all(|i| !i.trending));
    }
}
