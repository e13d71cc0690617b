use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::session::SessionOptions;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub service_url: String,
    pub request_timeout_ms: u64,
    pub debounce_ms: u64,
    pub log_filter: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            service_url: "http://localhost:5000".to_string(),
            request_timeout_ms: 30_000,
            debounce_ms: 300,
            log_filter: "imagelab=info".to_string(),
        }
    }
}

impl EngineConfig {
    /// Reads a YAML (`.yaml`/`.yml`) or JSON file. Missing fields keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let config = if matches!(extension.as_str(), "yaml" | "yml") {
            serde_yaml::from_str::<Self>(&raw)?
        } else {
            serde_json::from_str::<Self>(&raw)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_url.trim().is_empty() {
            return Err(ConfigError::Invalid("service_url must not be empty".to_string()));
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.debounce_ms == 0 {
            return Err(ConfigError::Invalid(
                "debounce_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            request_timeout: self.request_timeout(),
            debounce: Duration::from_millis(self.debounce_ms),
        }
    }
}
