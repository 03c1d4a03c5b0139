// src/blocklist.rs
//! # Keyword blocklist
//!
//! Rejects titles that mention noise topics (politics, crypto, celebrity gossip).
//!
//! - Data is a mapping from category name to literal keywords; it comes from config
//!   and falls back to `default_seed()`.
//! - Matching is a case-insensitive substring test; any single keyword blocks.

use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "BTreeMap<String, Vec<String>>")]
pub struct Blocklist {
    categories: BTreeMap<String, Vec<String>>,
}

impl From<BTreeMap<String, Vec<String>>> for Blocklist {
    fn from(raw: BTreeMap<String, Vec<String>>) -> Self {
        Self::new(raw)
    }
}

impl Default for Blocklist {
    fn default() -> Self {
        Self::default_seed()
    }
}

impl Blocklist {
    /// Build from raw category data. Keywords are lowercased and trimmed; empty ones
    /// are dropped because an empty needle would match every title.
    pub fn new(raw: BTreeMap<String, Vec<String>>) -> Self {
        let categories = raw
            .into_iter()
            .map(|(cat, words)| {
                let words = words
                    .into_iter()
                    .map(|w| w.trim().to_lowercase())
                    .filter(|w| !w.is_empty())
                    .collect();
                (cat, words)
            })
            .collect();
        Self { categories }
    }

    /// A blocklist that blocks nothing.
    pub fn empty() -> Self {
        Self {
            categories: BTreeMap::new(),
        }
    }

    pub fn is_blocked(&self, title: &str) -> bool {
        self.find_match(title).is_some()
    }

    /// First `(category, keyword)` found in `title`, if any.
    pub fn find_match(&self, title: &str) -> Option<(&str, &str)> {
        let lower = title.to_lowercase();
        self.categories.iter().find_map(|(cat, words)| {
            words
                .iter()
                .find(|w| lower.contains(w.as_str()))
                .map(|w| (cat.as_str(), w.as_str()))
        })
    }

    pub fn keyword_count(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }

    /// Built-in seed used when no blocklist is configured.
    pub fn default_seed() -> Self {
        let mut raw: BTreeMap<String, Vec<String>> = BTreeMap::new();
        raw.insert(
            "politics".into(),
            [
                "trump",
                "biden",
                "harris",
                "election",
                "republican",
                "democrat",
                "congress",
                "senate",
                "white house",
                "supreme court",
                "impeach",
            ]
            .map(String::from)
            .to_vec(),
        );
        raw.insert(
            "crypto".into(),
            [
                "bitcoin",
                "crypto",
                "ethereum",
                "nft",
                "dogecoin",
                "blockchain",
                "memecoin",
                "solana",
                "web3",
            ]
            .map(String::from)
            .to_vec(),
        );
        raw.insert(
            "celebrity".into(),
            [
                "kardashian",
                "celebrity",
                "taylor swift",
                "royal family",
                "influencer",
                "red carpet",
                "horoscope",
            ]
            .map(String::from)
            .to_vec(),
        );
        Self::new(raw)
    }
}
