use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Store backend not available: {0}")]
    BackendNotAvailable(String),
    #[error("Invalid configuration: {0}")]
    Parse(String),
}
