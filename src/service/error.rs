use std::time::Duration;

use thiserror::Error;

use crate::histogram::HistogramError;

pub type Result<T> = std::result::Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("service returned HTTP {code}: {message}")]
    Status { code: u16, message: String },

    #[error("request timed out after {} ms", .0.as_millis())]
    Timeout(Duration),

    #[error("service rejected the request: {0}")]
    Rejected(String),

    #[error("malformed service response: {0}")]
    Malformed(String),

    #[error("response decode failure: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("histogram failure: {0}")]
    Histogram(#[from] HistogramError),
}

impl ServiceError {
    /// True when the remote side answered and explicitly refused the request.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}
