// src/ingest/types.rs
use async_trait::async_trait;

use crate::error::FetchResult;
use crate::item::{Item, SourceTag};

/// One feed/API the aggregator pulls from.
///
/// `fetch_latest` issues live requests on every call and returns items in the
/// source's own order, already filtered by that source's admission rules.
#[async_trait]
pub trait SourceProvider: Send + Sync {
    async fn fetch_latest(&self) -> FetchResult<Vec<Item>>;

    fn tag(&self) -> SourceTag;

    /// How many items this source may place in the quota slice.
    fn quota(&self) -> usize;
}
