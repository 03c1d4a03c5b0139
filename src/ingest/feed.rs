// src/ingest/feed.rs
//! RSS 2.0 / Atom parsing into a flat entry list, in document order.

use quick_xml::de::from_str;
use serde::Deserialize;
use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::{OffsetDateTime, UtcOffset};

use crate::error::{FetchError, FetchResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub id: Option<String>,
    pub title: Option<String>,
    pub link: Option<String>,
    /// Unix seconds; 0 when absent or unparseable.
    pub published_at: i64,
    /// HTML body (Atom content/summary, RSS description).
    pub body: Option<String>,
    /// RSS `<source>` text, set by search aggregators.
    pub publisher: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Text {
    #[serde(rename = "$text", default)]
    value: String,
}

impl Text {
    fn into_opt(self) -> Option<String> {
        let v = self.value.trim();
        (!v.is_empty()).then(|| v.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
struct RssItem {
    title: Option<Text>,
    link: Option<String>,
    guid: Option<Text>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<Text>,
    source: Option<Text>,
}

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entry: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    id: Option<String>,
    title: Option<Text>,
    #[serde(rename = "link", default)]
    link: Vec<AtomLink>,
    published: Option<String>,
    updated: Option<String>,
    content: Option<Text>,
    summary: Option<Text>,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href")]
    href: Option<String>,
    #[serde(rename = "@rel")]
    rel: Option<String>,
}

/// Parse an RSS 2.0 or Atom document.
pub fn parse_feed(xml: &str) -> FetchResult<Vec<FeedEntry>> {
    let xml = scrub_html_entities_for_xml(xml);
    if xml.contains("<rss") {
        let rss: Rss = from_str(&xml)?;
        Ok(rss.channel.item.into_iter().map(rss_entry).collect())
    } else if xml.contains("<feed") {
        let feed: AtomFeed = from_str(&xml)?;
        Ok(feed.entry.into_iter().map(atom_entry).collect())
    } else {
        Err(FetchError::Parse(
            "document is neither RSS nor Atom".to_string(),
        ))
    }
}

fn rss_entry(it: RssItem) -> FeedEntry {
    FeedEntry {
        id: it.guid.and_then(Text::into_opt),
        title: it.title.and_then(Text::into_opt),
        link: it.link.map(|l| l.trim().to_string()).filter(|l| !l.is_empty()),
        published_at: it.pub_date.as_deref().map(parse_timestamp).unwrap_or(0),
        body: it.description.and_then(Text::into_opt),
        publisher: it.source.and_then(Text::into_opt),
    }
}

fn atom_entry(e: AtomEntry) -> FeedEntry {
    let link = e
        .link
        .iter()
        .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
        .or_else(|| e.link.first())
        .and_then(|l| l.href.clone());
    let stamp = e.published.as_deref().or(e.updated.as_deref());
    FeedEntry {
        id: e.id.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
        title: e.title.and_then(Text::into_opt),
        link,
        published_at: stamp.map(parse_timestamp).unwrap_or(0),
        body: e
            .content
            .and_then(Text::into_opt)
            .or_else(|| e.summary.and_then(Text::into_opt)),
        publisher: None,
    }
}

/// RFC 2822 (RSS) or RFC 3339 (Atom) to unix seconds; 0 if neither parses.
pub fn parse_timestamp(ts: &str) -> i64 {
    let ts = ts.trim();
    OffsetDateTime::parse(ts, &Rfc2822)
        .or_else(|_| OffsetDateTime::parse(ts, &Rfc3339))
        .map(|dt| dt.to_offset(UtcOffset::UTC).unix_timestamp())
        .ok()
        .or_else(|| {
            chrono::DateTime::parse_from_rfc2822(ts)
                .ok()
                .map(|dt| dt.timestamp())
        })
        .unwrap_or(0)
}

// quick-xml only knows the five XML entities.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
        .replace("&hellip;", "...")
}
