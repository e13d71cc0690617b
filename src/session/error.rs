use thiserror::Error;

use crate::history::HistoryBoundsError;
use crate::model::ValidationError;
use crate::service::ServiceError;

pub type Result<T> = std::result::Result<T, EditError>;

/// Every variant is recoverable; the session stays usable after any of them.
#[derive(Debug, Error)]
pub enum EditError {
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("another operation is already in progress")]
    Concurrency,

    #[error("no image loaded")]
    NoImage,

    #[error("network failure: {0}")]
    Network(ServiceError),

    #[error("processing service error: {0}")]
    Service(String),

    #[error("history: {0}")]
    HistoryBounds(#[from] HistoryBoundsError),
}

impl From<ServiceError> for EditError {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::Rejected(message) => Self::Service(message),
            other => Self::Network(other),
        }
    }
}
