// tests/trending_dedup.rs
use trend_aggregator::dedup::{dedupe, Offer, TopicSet};
use trend_aggregator::trending::{detect_trending, trending_topics};
use trend_aggregator::{Item, SourceTag};

fn item(id: &str, title: &str, source: SourceTag, rank: u32) -> Item {
    Item {
        id: id.to_string(),
        title: title.to_string(),
        source,
        engagement_score: 100,
        comment_count: 10,
        url: format!("https://news.example/{id}"),
        created_at: 1_728_990_000,
        permalink: format!("https://discuss.example/{id}"),
        source_rank: rank,
        trending: false,
        trending_count: None,
    }
}

fn tech() -> SourceTag {
    SourceTag::Subreddit("technology".to_string())
}

#[test]
fn cross_source_story_is_trending_and_kept_once() {
    let items = vec![
        item("a", "Company X launches new AI chip", tech(), 2),
        item("b", "company x launches new ai chip today", SourceTag::HackerNews, 1),
    ];

    let annotated = detect_trending(&items);
    assert!(annotated.iter().all(|i| i.trending));
    assert!(annotated.iter().all(|i| i.trending_count == Some(2)));

    let kept = dedupe(annotated);
    assert_eq!(kept.len(), 1);
    // Both trending; lower source rank wins.
    assert_eq!(kept[0].id, "b");
}

#[test]
fn dedupe_is_deterministic_on_equal_priority() {
    let items = vec![
        item("first", "Browser engine ships faster layout", tech(), 1),
        item("second", "Faster layout ships in browser engine", SourceTag::HackerNews, 1),
    ];
    let kept = dedupe(items.clone());
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].id, "first");
    assert_eq!(dedupe(items)[0].id, "first");
}

#[test]
fn three_sources_count_three_and_same_source_does_not_inflate() {
    let pubs = SourceTag::Publication("The Verge".to_string());
    let items = vec![
        item("a", "Company X launches new AI chip", tech(), 1),
        item("a2", "Company X launches new AI chip again", tech(), 2),
        item("b", "Company X launches new AI chip today", SourceTag::HackerNews, 1),
        item("c", "Company X new AI chip launches", pubs, 1),
    ];
    let topics = trending_topics(&items);
    assert_eq!(topics.len(), 1);
    assert_eq!(topics[0].count, 3);

    let annotated = detect_trending(&items);
    assert!(annotated.iter().all(|i| i.trending_count == Some(3)));
}

#[test]
fn single_source_topic_is_not_trending() {
    let items = vec![
        item("a", "Kernel maintainers debate memory safety", tech(), 1),
        item("b", "Kernel maintainers debate memory safety again", tech(), 2),
    ];
    assert!(trending_topics(&items).is_empty());
    assert!(detect_trending(&items).iter().all(|i| !i.trending));
}

#[test]
fn duplicate_url_is_dropped_even_with_distinct_titles() {
    let mut a = item("a", "Quantum computer hits milestone", tech(), 1);
    let mut b = item("b", "Satellite broadband expands coverage", SourceTag::HackerNews, 2);
    a.url = "https://same.example/story".to_string();
    b.url = a.url.clone();

    let mut set = TopicSet::new();
    assert_eq!(set.offer(a), Offer::Kept);
    assert_eq!(set.offer(b), Offer::DuplicateUrl);
    assert_eq!(set.len(), 1);
}

#[test]
fn trending_item_replaces_plain_representative() {
    let plain = item("plain", "Company X launches new AI chip", tech(), 1);
    let trending = item("hot", "Company X launches new AI chip today", SourceTag::HackerNews, 3)
        .with_trending(2);

    let mut set = TopicSet::new();
    assert_eq!(set.offer(plain), Offer::Kept);
    assert_eq!(set.offer(trending), Offer::Replaced(1));
    let ids: Vec<&str> = set.items().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["hot"]);
}

#[test]
fn output_has_no_pairwise_topic_or_url_duplicates() {
    let titles = [
        "Company X launches new AI chip",
        "Company X launches new AI chip today",
        "Kernel maintainers debate memory safety",
        "Memory safety debate among kernel maintainers",
        "Browser engine ships faster layout",
        "Open source database adds vector search",
        "Vector search added to open source database",
        "Satellite broadband expands coverage",
    ];
    let sources = [tech(), SourceTag::HackerNews, SourceTag::GoogleNews];
    let items: Vec<Item> = titles
        .iter()
        .enumerate()
        .map(|(i, t)| item(&format!("i{i}"), t, sources[i % 3].clone(), (i + 1) as u32))
        .collect();

    let kept = dedupe(detect_trending(&items));
    for (i, a) in kept.iter().enumerate() {
        for b in kept.iter().skip(i + 1) {
            assert_ne!(a.url, b.url);
            assert!(
                !trend_aggregator::same_topic(&a.title, &b.title),
                "{} / {}",
                a.title,
                b.title
            );
        }
    }
    assert_eq!(kept.len(), 5);
    assert_eq!(kept.iter().filter(|i| i.trending).count(), 3);
}
