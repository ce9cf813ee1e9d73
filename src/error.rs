//! Error taxonomy.
//!
//! Per-file problems (unreadable or unparsable input) are recoverable and
//! degrade to report diagnostics; registry and ignore-file problems are
//! fatal at startup because silently continuing would give false
//! confidence in the results.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("failed to read {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("invalid rule configuration: {0}")]
    RuleConfig(String),

    #[error("failed to load ignore file {path}: {message}")]
    SuppressionLoad { path: String, message: String },
}

impl ScanError {
    /// Fatal errors abort the run before any file is scanned and map to
    /// the dedicated "scan could not run" exit code.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ScanError::RuleConfig(_) | ScanError::SuppressionLoad { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
