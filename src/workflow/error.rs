use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScriptError>;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("edit script parse failure: {0}")]
    Parse(String),

    #[error("edit script I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("edit script serialization failure: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("edit script YAML serialization failure: {0}")]
    SerdeYaml(#[from] serde_yaml::Error),
}
