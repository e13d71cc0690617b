use thiserror::Error;

use crate::histogram::HistogramError;
use crate::model::ValidationError;
use crate::service::ServiceError;
use crate::session::EditError;
use crate::workflow::ScriptError;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("configuration I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration JSON failure: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("configuration YAML failure: {0}")]
    SerdeYaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("edit session error: {0}")]
    Edit(#[from] EditError),

    #[error("service error: {0}")]
    Service(#[from] ServiceError),

    #[error("edit script error: {0}")]
    Script(#[from] ScriptError),

    #[error("histogram error: {0}")]
    Histogram(#[from] HistogramError),

    #[error("unknown operation `{0}`; see `imagelab ops list`")]
    UnknownOperation(String),

    #[error("parameter error: {0}")]
    Validation(#[from] ValidationError),

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("output serialization failure: {0}")]
    Output(#[from] serde_json::Error),
}
