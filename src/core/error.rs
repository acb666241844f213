//! Engine error taxonomy
//!
//! Only `NoRootSet` and `InvalidRoot` abort a whole operation. The file-scoped kinds are
//! recovered by bulk operations (logged and skipped) and surface only from single-file calls.

use std::path::PathBuf;
use thiserror::Error;

use crate::core::paths::format_size;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("No project root set")]
    NoRootSet,

    #[error("Path {reason}: {}", .path.display())]
    InvalidRoot { path: PathBuf, reason: &'static str },

    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("File too large: {} ({}, limit {} bytes)", .path.display(), format_size(*.size), .limit)]
    TooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("Permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("Cannot parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Path is outside the project root: {}", .0.display())]
    OutsideRoot(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Whether this error aborts an entire operation rather than a single file
    pub fn is_fatal(&self) -> bool {
        matches!(self, EngineError::NoRootSet | EngineError::InvalidRoot { .. })
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
