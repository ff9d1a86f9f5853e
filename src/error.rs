//! Unified SDK error types.

use thiserror::Error;

/// Top-level SDK error.
#[derive(Error, Debug)]
pub enum SdkError {
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    #[error("WebSocket error: {0}")]
    Ws(#[from] WsError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Invalid series: {0}")]
    Series(#[from] InvalidSeriesError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// HTTP-layer errors.
#[derive(Error, Debug)]
pub enum HttpError {
    #[cfg(feature = "http")]
    #[error("Request failed: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Server error {status}: {body}")]
    ServerError { status: u16, body: String },

    #[error("Rate limited (retry after {retry_after_ms:?}ms)")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Timeout")]
    Timeout,

    #[error("Max retries exceeded after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded { attempts: u32, last_error: String },
}

/// WebSocket errors.
#[derive(Error, Debug)]
pub enum WsError {
    #[error("Not connected")]
    NotConnected,

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Connection closed: code={code:?} reason={reason}")]
    Closed {
        code: Option<u16>,
        reason: String,
    },
}

/// Field-level conversion failures from wire payloads.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid decimal: {0}")]
    Decimal(String),

    #[error("invalid timestamp: {0}")]
    Timestamp(String),

    #[error("unknown interval: {0}")]
    Interval(String),

    #[error("missing field: {0}")]
    MissingField(&'static str),
}

impl From<ParseError> for WsError {
    fn from(err: ParseError) -> Self {
        WsError::Deserialization(err.to_string())
    }
}

/// A candle sequence that is not strictly ordered by time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("candle at index {index} has time {time}, not after previous time {previous}")]
pub struct InvalidSeriesError {
    pub index: usize,
    pub previous: i64,
    pub time: i64,
}
