// src/topic.rs
//! Title signatures and topic matching.
//!
//! A signature is the lowercase alphanumeric words of a title longer than three
//! characters, first eight only, sorted and space-joined. Two titles share a topic
//! when their signatures are equal or when at least 60% of the smaller word set
//! also appears in the other one.

use once_cell::sync::OnceCell;
use regex::Regex;
use std::collections::HashSet;

const MIN_WORD_LEN: usize = 4;
const MAX_SIGNATURE_WORDS: usize = 8;
const OVERLAP_THRESHOLD: f64 = 0.6;

/// Canonical word signature of a title.
///
/// An empty or all-short-word title yields an empty signature.
pub fn normalize(title: &str) -> String {
    static RE_STRIP: OnceCell<Regex> = OnceCell::new();
    let re_strip = RE_STRIP.get_or_init(|| Regex::new(r"[^a-z0-9\s]").unwrap());

    let lower = title.to_lowercase();
    let stripped = re_strip.replace_all(&lower, "");

    let mut words: Vec<&str> = stripped
        .split_whitespace()
        .filter(|w| w.len() >= MIN_WORD_LEN)
        .take(MAX_SIGNATURE_WORDS)
        .collect();
    words.sort_unstable();
    words.join(" ")
}

/// Whether two titles denote the same story.
pub fn same_topic(a: &str, b: &str) -> bool {
    signatures_match(&normalize(a), &normalize(b))
}

/// Same as [`same_topic`] for already computed signatures.
pub fn signatures_match(sig_a: &str, sig_b: &str) -> bool {
    if sig_a == sig_b {
        return true;
    }

    let words_a: HashSet<&str> = sig_a.split(' ').filter(|w| !w.is_empty()).collect();
    let words_b: HashSet<&str> = sig_b.split(' ').filter(|w| !w.is_empty()).collect();

    let min_size = words_a.len().min(words_b.len());
    if min_size == 0 {
        return false;
    }
    let matches = words_a.intersection(&words_b).count();
    matches as f64 / min_size as f64 >= OVERLAP_THRESHOLD
}
