// src/item.rs
//! The unit flowing through the aggregation pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Origin of an item. Distinct sub-forums count as distinct sources for
/// cross-source trending.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum SourceTag {
    Subreddit(String),
    HackerNews,
    Publication(String),
    GoogleNews,
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceTag::Subreddit(name) => write!(f, "r/{name}"),
            SourceTag::HackerNews => f.write_str("hackernews"),
            SourceTag::Publication(name) => f.write_str(name),
            SourceTag::GoogleNews => f.write_str("googlenews"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub title: String,
    pub source: SourceTag,
    pub engagement_score: u64,
    pub comment_count: u64,
    pub url: String,
    /// Unix seconds; 0 when the source did not say.
    pub created_at: i64,
    pub permalink: String,
    /// 1-based position within the item's own source listing.
    pub source_rank: u32,
    #[serde(default)]
    pub trending: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trending_count: Option<u32>,
}

impl Item {
    /// `engagement + comments * 2`, used for ranking within and across sources.
    pub fn weighted_score(&self) -> u64 {
        self.engagement_score
            .saturating_add(self.comment_count.saturating_mul(2))
    }

    /// Copy of this item carrying a trending annotation.
    pub fn with_trending(&self, count: u32) -> Item {
        Item {
            trending: true,
            trending_count: Some(count),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> Item {
        Item {
            id: "reddit:abc".into(),
            title: "Some title".into(),
            source: SourceTag::Subreddit("technology".into()),
            engagement_score: 10,
            comment_count: 4,
            url: "https://example.com/a".into(),
            created_at: 1_700_000_000,
            permalink: "https://www.reddit.com/r/technology/comments/abc/".into(),
            source_rank: 1,
            trending: false,
            trending_count: None,
        }
    }

    #[test]
    fn weighted_score_counts_comments_twice() {
        assert_eq!(item().weighted_score(), 18);
    }

    #[test]
    fn with_trending_leaves_original_untouched() {
        let base = item();
        let t = base.with_trending(3);
        assert!(t.trending);
        assert_eq!(t.trending_count, Some(3));
        assert!(!base.trending);
        assert_eq!(base.trending_count, None);
    }

    #[test]
    fn source_tag_display() {
        assert_eq!(SourceTag::Subreddit("netsec".into()).to_string(), "r/netsec");
        assert_eq!(SourceTag::HackerNews.to_string(), "hackernews");
        assert_eq!(SourceTag::Publication("TechCrunch".into()).to_string(), "TechCrunch");
    }
}
