// tests/providers_fixtures.rs
use std::fs;
use std::sync::Arc;

use trend_aggregator::assemble::balance;
use trend_aggregator::config::{
    GoogleNewsConfig, HackerNewsConfig, HttpConfig, PublicationConfig, SubredditConfig,
};
use trend_aggregator::ingest::http::HttpClient;
use trend_aggregator::ingest::providers::{
    google_news::GoogleNewsProvider, hacker_news::HackerNewsProvider,
    publication::PublicationProvider, reddit::RedditProvider,
};
use trend_aggregator::ingest::types::SourceProvider;
use trend_aggregator::ingest::Collected;
use trend_aggregator::{Blocklist, Item};

// 2024-10-15T13:46:40Z, a few hours after the fixture timestamps.
const NOW: i64 = 1_729_000_000;

fn fixture(name: &str) -> String {
    fs::read_to_string(format!("tests/fixtures/{name}")).expect("fixture")
}

fn client() -> HttpClient {
    HttpClient::new(&HttpConfig::default()).expect("client")
}

fn seed() -> Arc<Blocklist> {
    Arc::new(Blocklist::default_seed())
}

fn reddit() -> RedditProvider {
    let mut cfg = SubredditConfig::new("technology");
    cfg.limit = 25;
    cfg.min_score = 10;
    cfg.fallback_score = 25;
    RedditProvider::new(cfg, client(), seed())
}

fn hacker_news() -> HackerNewsProvider {
    HackerNewsProvider::new(HackerNewsConfig::default(), client(), seed())
}

fn techcrunch() -> PublicationProvider {
    PublicationProvider::new(
        PublicationConfig::new("TechCrunch", "https://techcrunch.com/feed/"),
        client(),
        seed(),
    )
}

fn verge() -> PublicationProvider {
    PublicationProvider::new(
        PublicationConfig::new("The Verge", "https://www.theverge.com/rss/index.xml"),
        client(),
        seed(),
    )
}

fn google_news() -> GoogleNewsProvider {
    GoogleNewsProvider::new(GoogleNewsConfig::new("technology"), client(), seed())
}

fn ids(items: &[Item]) -> Vec<&str> {
    items.iter().map(|i| i.id.as_str()).collect()
}

#[test]
fn reddit_listing_applies_admission_rules() {
    let items = reddit()
        .parse_listing(&fixture("reddit_top.json"), NOW)
        .expect("listing parses");

    // stickied, self, blocked, gallery, low score and stale posts are all dropped
    assert_eq!(ids(&items), vec!["reddit:chip01", "reddit:lnx612"]);

    let chip = &items[0];
    assert_eq!(chip.url, "https://news.example.com/chip");
    assert_eq!(
        chip.permalink,
        "https://www.reddit.com/r/technology/comments/chip01/company_x_launches/"
    );
    assert_eq!(chip.engagement_score, 1_500);
    assert_eq!(chip.comment_count, 300);
    assert_eq!(chip.created_at, 1_728_990_000);
    assert_eq!(chip.source_rank, 2);
    assert_eq!(items[1].source_rank, 8);
    assert!(items.iter().all(|i| !i.trending && i.trending_count.is_none()));
}

#[test]
fn reddit_listing_respects_limit() {
    let mut cfg = SubredditConfig::new("technology");
    cfg.limit = 3;
    let p = RedditProvider::new(cfg, client(), seed());
    let items = p.parse_listing(&fixture("reddit_top.json"), NOW).unwrap();
    assert_eq!(ids(&items), vec!["reddit:chip01"]);
}

#[test]
fn blocked_title_never_survives_even_with_top_score() {
    let items = reddit()
        .parse_listing(&fixture("reddit_top.json"), NOW)
        .unwrap();
    assert!(items.iter().all(|i| !i.title.to_lowercase().contains("bitcoin")));

    let open = RedditProvider::new(
        {
            let mut cfg = SubredditConfig::new("technology");
            cfg.limit = 25;
            cfg
        },
        client(),
        Arc::new(Blocklist::empty()),
    );
    let unfiltered = open
        .parse_listing(&fixture("reddit_top.json"), NOW)
        .unwrap();
    assert!(unfiltered.iter().any(|i| i.id == "reddit:btc001"));
}

#[test]
fn reddit_feed_extracts_article_links() {
    let items = reddit()
        .parse_feed(&fixture("reddit_top.rss"), NOW)
        .expect("feed parses");

    assert_eq!(ids(&items), vec!["reddit:aaa111", "reddit:ccc333"]);
    assert_eq!(items[0].url, "https://news.example.com/chip");
    assert_eq!(
        items[0].permalink,
        "https://www.reddit.com/r/technology/comments/aaa111/company_x/"
    );
    assert_eq!(items[0].created_at, 1_728_986_400);
    assert_eq!(items[0].engagement_score, 25);
    assert_eq!(items[1].url, "https://science.example/brain-map?ref=rss&x=1");
    assert_eq!(items[1].source_rank, 3);
}

#[test]
fn hacker_news_hits() {
    let items = hacker_news()
        .parse_hits(&fixture("hn_front.json"), NOW)
        .expect("hits parse");

    assert_eq!(ids(&items), vec!["hn:41000001", "hn:41000004"]);
    assert_eq!(items[0].permalink, "https://news.ycombinator.com/item?id=41000001");
    assert_eq!(items[0].engagement_score, 420);
    assert_eq!(items[0].comment_count, 210);
    assert_eq!(items[1].comment_count, 0);
    assert_eq!(items[1].source_rank, 4);
}

#[test]
fn publication_rss_and_atom() {
    let tc = techcrunch()
        .parse_items(&fixture("techcrunch.xml"), NOW)
        .expect("rss parses");
    assert_eq!(
        ids(&tc),
        vec![
            "pub:techcrunch:https://techcrunch.com/?p=1001",
            "pub:techcrunch:https://techcrunch.com/?p=1004",
        ]
    );
    assert!(tc.iter().all(|i| i.engagement_score == 100));
    assert_eq!(tc[0].title, "Chip startup raises $200M to take on incumbents");
    assert_eq!(tc[0].url, "https://techcrunch.com/2024/10/15/chip-startup-raises/");

    let verge = verge()
        .parse_items(&fixture("verge.xml"), NOW)
        .expect("atom parses");
    assert_eq!(verge.len(), 2);
    assert_eq!(verge[0].title, "Company X's new AI chip is official");
    assert_eq!(verge[0].url, "https://www.theverge.com/2024/10/15/company-x-chip");
    // 07:00 at -04:00
    assert_eq!(verge[0].created_at, 1_728_990_000);
}

#[test]
fn google_news_strips_publisher_and_blocks() {
    let items = google_news()
        .parse_items(&fixture("gnews.xml"), NOW)
        .expect("rss parses");
    assert_eq!(ids(&items), vec!["gnews:CBMiA1", "gnews:CBMiC3"]);
    assert_eq!(items[0].title, "Company X launches new AI chip for data centers");
    assert_eq!(items[0].engagement_score, 80);
    assert_eq!(items[1].source_rank, 3);
}

#[test]
fn google_news_search_url_encodes_query() {
    let url = google_news().search_url().unwrap();
    assert!(url.starts_with("https://news.google.com/rss/search?q=technology&"));
    assert!(url.contains("ceid=US%3Aen"));

    let empty = GoogleNewsProvider::new(GoogleNewsConfig::new(" "), client(), seed());
    assert!(empty.search_url().unwrap_err().is_configuration());
}

#[test]
fn same_story_across_fixture_sources_trends() {
    let r = reddit();
    let h = hacker_news();
    let t = techcrunch();
    let v = verge();
    let g = google_news();

    let collected = vec![
        Collected {
            tag: r.tag(),
            quota: r.quota(),
            items: r.parse_listing(&fixture("reddit_top.json"), NOW).unwrap(),
            config_error: None,
        },
        Collected {
            tag: h.tag(),
            quota: h.quota(),
            items: h.parse_hits(&fixture("hn_front.json"), NOW).unwrap(),
            config_error: None,
        },
        Collected {
            tag: t.tag(),
            quota: t.quota(),
            items: t.parse_items(&fixture("techcrunch.xml"), NOW).unwrap(),
            config_error: None,
        },
        Collected {
            tag: v.tag(),
            quota: v.quota(),
            items: v.parse_items(&fixture("verge.xml"), NOW).unwrap(),
            config_error: None,
        },
        Collected {
            tag: g.tag(),
            quota: g.quota(),
            items: g.parse_items(&fixture("gnews.xml"), NOW).unwrap(),
            config_error: None,
        },
    ];

    let report = balance(collected, 25);
    assert_eq!(report.items.len(), 7);
    assert_eq!(report.items[0].id, "hn:41000001");
    assert!(report.items[0].trending);
    assert_eq!(report.items[0].trending_count, Some(4));
    assert_eq!(report.items.iter().filter(|i| i.trending).count(), 1);
}
