// src/ingest/providers/mod.rs
pub mod google_news;
pub mod hacker_news;
pub mod publication;
pub mod reddit;
