mod config;
mod context;
mod error;
mod logging;


pub use config::EngineConfig;
pub use context::AppContext;
pub use error::{AppError, ConfigError, Result};
pub use logging::init_logging;
