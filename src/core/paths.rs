//! Path classification and normalization utilities
//!
//! Maps file names to categories (and their tree icons), formats byte counts, and keeps
//! all emitted paths relative to the root with '/' as separator.

use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

use crate::core::config::EngineConfig;

/// Broad category of a file, decided from its name alone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Source,
    Config,
    Doc,
    Manifest,
    Other,
}

impl FileCategory {
    /// Classify a file name. Extension checks win over manifest names, so
    /// `requirements.txt` is a doc and `pyproject.toml` is config.
    pub fn classify(name: &str, config: &EngineConfig) -> Self {
        let suffix = suffix_lower(name);
        let has = |list: &[String]| suffix.as_deref().is_some_and(|s| list.iter().any(|e| e == s));

        if has(&config.source_extensions) {
            FileCategory::Source
        } else if has(&config.config_extensions) {
            FileCategory::Config
        } else if has(&config.doc_extensions) {
            FileCategory::Doc
        } else if config.is_manifest_name(name) {
            FileCategory::Manifest
        } else {
            FileCategory::Other
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            FileCategory::Source => "🐍",
            FileCategory::Config => "⚙️",
            FileCategory::Doc => "📝",
            FileCategory::Manifest => "📦",
            FileCategory::Other => "📄",
        }
    }
}

pub const DIR_ICON: &str = "📁";
pub const DENIED_ICON: &str = "❌";

/// Lower-cased final extension including the dot (`.py`), `None` for dotfiles and bare names
fn suffix_lower(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
}

/// Format a byte count as a human readable size with one decimal (`12.0B`, `1.5KB`)
pub fn format_size(size: u64) -> String {
    let mut value = size as f64;
    for unit in ["B", "KB", "MB", "GB"] {
        if value < 1024.0 {
            return format!("{:.1}{}", value, unit);
        }
        value /= 1024.0;
    }
    format!("{:.1}TB", value)
}

/// Normalize a path to use '/' as separator (for cross-platform consistency)
pub fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Make a path relative to the root directory
pub fn make_relative(path: &Path, root: &Path) -> Option<String> {
    path.strip_prefix(root).ok().map(normalize_path)
}

/// Check if a path is hidden (starts with '.')
pub fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Resolve `.` and `..` components without touching the filesystem
pub fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Validate that a path is within the root directory (prevent path traversal)
pub fn is_within_root(path: &Path, root: &Path) -> bool {
    path.canonicalize()
        .ok()
        .and_then(|p| root.canonicalize().ok().map(|r| p.starts_with(r)))
        .unwrap_or(false)
}
