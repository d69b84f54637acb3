use crate::app::config::ConfigError;
use crate::app::logging_system::LoggingError;
use thiserror::Error;

/// Top-level error type for starting and running the front end.
#[derive(Error, Debug)]
pub enum VizError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),

    #[error("Backend client error: {0}")]
    Client(#[from] crate::backend::ClientError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
