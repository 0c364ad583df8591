//! # Error Types Module
//!
//! Defines every error the optimizer can surface.
//!
//! ## Categories:
//! - `Io`: plain filesystem errors (permissions, missing files, ...)
//! - `Decode`: the intermediate image could not be decoded (per-file)
//! - `Conversion`: vtfcmd exited abnormally or wrote no output (per-file)
//! - `Traversal`: a directory could not be listed (per-subtree)
//! - `MissingDependency`: vtfcmd could not be located
//! - `Validation`: invalid configuration or input
//!
//! Per-file and per-subtree errors are recorded in the run report and never
//! abort the batch. Only startup errors propagate out of `main`.
//!
//! ## Example:
//! ```rust,ignore
//! if !tool.exists() {
//!     return Err(OptimizeError::MissingDependency("vtfcmd".to_string()));
//! }
//! ```

use std::path::PathBuf;

/// Custom error types for texture optimization
#[derive(thiserror::Error, Debug)]
pub enum OptimizeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Conversion failed for {}: {reason}", path.display())]
    Conversion { path: PathBuf, reason: String },

    #[error("Cannot traverse {}: {reason}", path.display())]
    Traversal { path: PathBuf, reason: String },

    #[error("Dependency missing: {0}")]
    MissingDependency(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl OptimizeError {
    /// Short failure label used in operator-facing output
    pub fn kind(&self) -> &'static str {
        match self {
            OptimizeError::Io(_) => "io",
            OptimizeError::Decode { .. } => "decode",
            OptimizeError::Conversion { .. } => "conversion",
            OptimizeError::Traversal { .. } => "traversal",
            OptimizeError::MissingDependency(_) => "missing-dependency",
            OptimizeError::Validation(_) => "validation",
        }
    }
}
