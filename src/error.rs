// src/error.rs
use thiserror::Error;

/// Failures a source can report for one fetch cycle.
///
/// `Transport`, `Status` and `Parse` are absorbed at the ingest boundary (the source
/// contributes nothing). `Configuration` is surfaced to the caller because the
/// source cannot work for any cycle until its config is fixed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl FetchError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, FetchError::Configuration(_))
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Parse(e.to_string())
    }
}

impl From<quick_xml::DeError> for FetchError {
    fn from(e: quick_xml::DeError) -> Self {
        FetchError::Parse(e.to_string())
    }
}

pub type FetchResult<T> = std::result::Result<T, FetchError>;
