use thiserror::Error;

/// Everything that can go wrong crossing the network boundary.
///
/// Callers match on the variant; nothing here is fatal to the process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataError {
    #[error("request timed out")]
    RequestTimeout,
    /// HTTP 429. `retry_after` is the `Retry-After` header in seconds, if the server sent one.
    #[error("too many requests")]
    TooManyRequests { retry_after: Option<u64> },
    #[error("no internet connection")]
    NoInternet,
    #[error("server error (HTTP {0})")]
    ServerError(u16),
    #[error("could not decode response")]
    Serialization,
    #[error("unknown error")]
    Unknown,
}

/// Success/error wrapper around any network result.
pub type Envelope<T> = Result<T, DataError>;

impl DataError {
    /// Maps a non-2xx status code.
    pub fn from_status(status: u16, retry_after: Option<u64>) -> Self {
        match status {
            429 => DataError::TooManyRequests { retry_after },
            500..=599 => DataError::ServerError(status),
            _ => DataError::Unknown,
        }
    }

    /// Maps a reqwest failure that happened before a usable response was read.
    pub fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            DataError::RequestTimeout
        } else if err.is_decode() {
            DataError::Serialization
        } else if let Some(status) = err.status() {
            DataError::from_status(status.as_u16(), None)
        } else if err.is_connect() || err.is_request() || err.is_body() {
            DataError::NoInternet
        } else {
            DataError::Unknown
        }
    }
}

impl From<serde_json::Error> for DataError {
    fn from(_: serde_json::Error) -> Self {
        DataError::Serialization
    }
}
