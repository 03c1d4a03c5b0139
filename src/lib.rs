// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod assemble;
pub mod blocklist;
pub mod config;
pub mod dedup;
pub mod error;
pub mod ingest;
pub mod item;
pub mod topic;
pub mod trending;

// ---- Re-exports for stable public API ----
pub use crate::assemble::{assemble, fetch_aggregated_items, Aggregator, AssemblyReport};
pub use crate::blocklist::Blocklist;
pub use crate::config::{AggregatorConfig, SourceConfig};
pub use crate::error::FetchError;
pub use crate::item::{Item, SourceTag};
pub use crate::topic::{normalize, same_topic};
