use thiserror::Error;

/// Structural faults raised while canonicalizing a provider response.
///
/// Any of these aborts the whole request; nothing is recovered locally.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizeError {
    #[error("missing key `{0}`")]
    MissingKey(String),

    #[error("missing index {0}")]
    MissingIndex(usize),

    #[error("unexpected shape at {at}: expected {expected}")]
    UnexpectedShape { at: String, expected: &'static str },

    #[error("invalid count marker: {0}")]
    InvalidCount(String),

    #[error("invalid field `{field}`: {reason}")]
    InvalidField { field: String, reason: String },
}

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("normalization fault: {0}")]
    Normalize(#[from] NormalizeError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
