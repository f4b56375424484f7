/// Error types shared across the collage
///
/// Errors that travel through iced messages must be `Clone`, so transport
/// failures keep their rendered message rather than the source error.
use thiserror::Error;

/// A payload from the backend or the cache that does not have the expected shape
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PayloadError {
    #[error("malformed JSON: {0}")]
    Json(String),

    #[error("expected a list of image URLs")]
    NotAList,

    #[error("entry {index} is not a valid image URL: {url:?}")]
    InvalidUrl { index: usize, url: String },

    #[error("config is missing a non-empty title")]
    MissingTitle,
}

impl From<serde_json::Error> for PayloadError {
    fn from(err: serde_json::Error) -> Self {
        PayloadError::Json(err.to_string())
    }
}

/// Failure of a REST call to the backend
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("network error: {0}")]
    Transport(String),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("invalid response: {0}")]
    Payload(#[from] PayloadError),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => FetchError::Status(status.as_u16()),
            None => FetchError::Transport(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Payload(err.into())
    }
}

/// Failure to load one candidate URL of a tile
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    #[error("network error: {0}")]
    Transport(String),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("not a decodable image: {0}")]
    Decode(String),
}

/// Failure reading or writing the local cache
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cache value is corrupt: {0}")]
    Corrupt(#[from] PayloadError),
}

/// Failure of the push channel
#[derive(Error, Debug)]
pub enum PushError {
    #[error("websocket error: {0}")]
    Socket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("handshake failed: {0}")]
    Handshake(String),

    #[error("malformed frame: {0:?}")]
    Frame(String),
}
