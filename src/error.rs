// ⚠️ Error taxonomy
// Fatal conditions (missing snapshot, unwritable outputs) vs. isolated ones (per-yard)

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JalopyError {
    /// No prior baseline: the run must stop before touching any output
    #[error("snapshot file not found: {}", .0.display())]
    SnapshotNotFound(PathBuf),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Mail error: {0}")]
    Mail(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, JalopyError>;
