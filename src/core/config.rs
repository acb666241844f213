//! Engine configuration
//!
//! The constants that form the contract surface of the engine: which files count as source,
//! which manifests are recognized, which directories are never entered, and the caps that
//! bound file reads and rendered output.

use serde::{Deserialize, Serialize};

/// Default maximum readable file size in bytes (1 MB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024;

/// Source-file extensions (leading dot included)
pub const SOURCE_EXTENSIONS: &[&str] = &[".py", ".pyx", ".pyi"];

/// Configuration-file extensions, used for icons only
pub const CONFIG_EXTENSIONS: &[&str] = &[".toml", ".cfg", ".ini", ".yaml", ".yml", ".json"];

/// Documentation-file extensions
pub const DOC_EXTENSIONS: &[&str] = &[".md", ".rst", ".txt"];

/// Recognized dependency manifests, checked only at the project root
pub const MANIFEST_FILES: &[&str] = &[
    "requirements.txt",
    "requirements-dev.txt",
    "pyproject.toml",
    "setup.py",
    "setup.cfg",
    "Pipfile",
];

/// Directory names that are never traversed or indexed
pub const EXCLUDED_DIRS: &[&str] = &[
    "__pycache__",
    ".git",
    ".svn",
    ".hg",
    ".bzr",
    ".tox",
    ".pytest_cache",
    ".mypy_cache",
    ".coverage",
    "node_modules",
    ".venv",
    "venv",
    "env",
    ".env",
    "build",
    "dist",
    ".egg-info",
    ".eggs",
    "htmlcov",
];

/// File whose presence marks a directory as a package
pub const PACKAGE_MARKER: &str = "__init__.py";

fn owned(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Configuration shared by every engine component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub source_extensions: Vec<String>,
    pub config_extensions: Vec<String>,
    pub doc_extensions: Vec<String>,
    pub manifest_files: Vec<String>,
    pub excluded_dirs: Vec<String>,
    pub package_marker: String,

    /// Files larger than this are refused by the reader (bytes)
    pub max_file_size: u64,

    /// Search matches shown before "... and N more"
    pub search_display_cap: usize,

    /// Dependencies shown per manifest
    pub manifest_display_cap: usize,

    /// Imported modules shown in the tally
    pub import_display_cap: usize,

    /// Packages listed in the overview
    pub package_display_cap: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            source_extensions: owned(SOURCE_EXTENSIONS),
            config_extensions: owned(CONFIG_EXTENSIONS),
            doc_extensions: owned(DOC_EXTENSIONS),
            manifest_files: owned(MANIFEST_FILES),
            excluded_dirs: owned(EXCLUDED_DIRS),
            package_marker: PACKAGE_MARKER.to_string(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            search_display_cap: 50,
            manifest_display_cap: 10,
            import_display_cap: 20,
            package_display_cap: 5,
        }
    }
}

impl EngineConfig {
    /// Override the maximum readable file size
    pub fn with_max_file_size(mut self, max_file_size: u64) -> Self {
        self.max_file_size = max_file_size;
        self
    }

    /// Whether a directory (or any path component) name is excluded
    pub fn is_excluded(&self, name: &str) -> bool {
        self.excluded_dirs.iter().any(|d| d == name)
    }

    /// Whether a file name carries one of the source extensions
    pub fn is_source_name(&self, name: &str) -> bool {
        self.source_extensions.iter().any(|ext| name.ends_with(ext.as_str()))
    }

    /// Whether a file name is a recognized manifest
    pub fn is_manifest_name(&self, name: &str) -> bool {
        self.manifest_files.iter().any(|m| m == name)
    }
}
