//! Error handling for warehouse transformation runs.
//!
//! Every error here is fatal at the granularity of one transformer run:
//! the orchestrator retries whole tasks, so there is no per-row recovery.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Source object missing or unreadable: {key}")]
    SourceMissing { key: String },

    #[error("Expected column '{column}' not found in source: {key}")]
    MissingColumn { column: String, key: String },

    #[error("Spreadsheet format error in {key}: {reason}")]
    SpreadsheetFormat { key: String, reason: String },

    #[error("Referential integrity violation: no neighborhood name for region codes {codes:?}")]
    ReferentialIntegrity { codes: Vec<i64> },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl EtlError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn source_missing(key: impl Into<String>) -> Self {
        Self::SourceMissing { key: key.into() }
    }

    pub fn missing_column(column: impl Into<String>, key: impl Into<String>) -> Self {
        Self::MissingColumn {
            column: column.into(),
            key: key.into(),
        }
    }

    pub fn spreadsheet_format(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SpreadsheetFormat {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
