pub mod app_config;
pub mod search;

pub use app_config::Config;
pub use search::{SearchCriteria, SearchRequest};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),
}

pub type CoreResult<T> = Result<T, CoreError>;
