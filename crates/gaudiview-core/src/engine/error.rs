use std::io;
use thiserror::Error;

use super::config::ConfigError;
use crate::core::io::gaudi::GaudiError;
use crate::core::models::result_set::TableError;
use crate::core::structure::LoaderError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Malformed results file: {0}")]
    Format(GaudiError),

    #[error("Objective schemas differ: expected {expected:?}, found {found:?}")]
    SchemaMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Could not resolve structures for '{key}': {source}")]
    StructureResolution { key: String, source: LoaderError },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),
}

impl From<TableError> for EngineError {
    fn from(err: TableError) -> Self {
        match err {
            TableError::SchemaMismatch { expected, found } => {
                EngineError::SchemaMismatch { expected, found }
            }
            other => EngineError::InvalidOperation(other.to_string()),
        }
    }
}

impl From<GaudiError> for EngineError {
    fn from(err: GaudiError) -> Self {
        match err {
            GaudiError::Io(e) => EngineError::Io(e),
            other => EngineError::Format(other),
        }
    }
}
