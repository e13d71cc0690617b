use thiserror::Error;

pub type Result<T> = std::result::Result<T, ValidationError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("missing parameter `{param}` for `{operation}`")]
    MissingParam {
        operation: &'static str,
        param: String,
    },

    #[error("unknown parameter `{param}` for `{operation}`")]
    UnknownParam {
        operation: &'static str,
        param: String,
    },

    #[error("parameter `{param}` must be {expected}")]
    WrongType {
        param: String,
        expected: &'static str,
    },

    #[error("parameter `{param}` must be a finite number")]
    NotFinite { param: String },

    #[error("parameter `{param}` = {value} is outside [{min}, {max}]")]
    OutOfRange {
        param: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("parameter `{param}` = `{value}` is not one of {allowed:?}")]
    InvalidChoice {
        param: String,
        value: String,
        allowed: &'static [&'static str],
    },

    #[error("inconsistent parameters: {0}")]
    Inconsistent(String),

    #[error("invalid image handle: {0}")]
    InvalidHandle(String),

    #[error("invalid dimensions `{0}`, expected `W × H`")]
    InvalidDimensions(String),
}
