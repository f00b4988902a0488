//! Error types for metadata fetching

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no OMDb API key configured (set OMDB_API_KEY or add it in settings)")]
    MissingApiKey,
    #[error("request failed: {0}")]
    Http(String),
    #[error("HTTP error: {0}")]
    Status(u16),
    #[error("invalid response: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("metadata service error: {0}")]
    Api(String),
}

impl From<ureq::Error> for FetchError {
    fn from(e: ureq::Error) -> Self {
        match e {
            ureq::Error::StatusCode(code) => FetchError::Status(code),
            other => FetchError::Http(other.to_string()),
        }
    }
}

pub type FetchResult<T> = Result<T, FetchError>;
