use alloy_primitives::Address;
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("No allocation found for {0}")]
    NotFound(Address),
    #[error("Transient service failure: {0}")]
    Transient(String),
    #[error("Malformed allocation data: {0}")]
    Malformed(String),
    #[error("{field} does not fit in uint{bits}: {value}")]
    EncodingOverflow {
        field: &'static str,
        bits: u16,
        value: String,
    },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    #[error("JSON-RPC error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("io Error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Only transient failures may be retried by the caller; everything else
    /// will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Transient(_))
    }

    /// Maps a non-success HTTP status from `service` to an error kind.
    /// Timeouts, rate limiting and server errors are transient.
    pub fn from_status(status: StatusCode, service: &str) -> Self {
        match status {
            StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS => {
                Error::Transient(format!("{} answered {}", service, status))
            }
            s if s.is_server_error() => Error::Transient(format!("{} answered {}", service, s)),
            s => Error::Malformed(format!("{} answered unexpected status {}", service, s)),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() || err.is_redirect() {
            Error::InvalidConfig(err.to_string())
        } else if err.is_decode() {
            Error::Malformed(err.to_string())
        } else {
            Error::Transient(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
