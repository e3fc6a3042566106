use thiserror::Error;

use crate::core::models::error::{ConfigError, SystemError};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid setup: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("System validation failed: {source}")]
    System {
        #[from]
        source: SystemError,
    },

    #[error("Failed to build molecule type {type_id}: {source}")]
    TypeConstruction {
        type_id: usize,
        #[source]
        source: ConfigError,
    },
}
