//! Source file index
//!
//! Discovers every source file under the root, pruning excluded directories wherever they
//! occur. The sorted list is recomputed on every call; search, import tallying and the
//! overview all consume it, so its order is what makes their output deterministic.

use globset::{GlobBuilder, GlobMatcher};
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::core::config::EngineConfig;
use crate::core::paths::{format_size, make_relative, FileCategory};
use crate::core::render::TextReport;

/// All source files under `root`, sorted by path.
///
/// Paths are compared component by component, so `pkg/mod.py` sorts before `pkg.py`.
pub fn list_source_files(root: &Path, config: &EngineConfig) -> Vec<PathBuf> {
    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0 || !config.is_excluded(&entry.file_name().to_string_lossy())
        });

    let mut files: Vec<PathBuf> = walker
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(err) => {
                tracing::debug!(error = %err, "skipping unreadable entry");
                None
            }
        })
        .filter(|entry| {
            // symlinked directories are not descended into, symlinked files are indexed
            entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file())
        })
        .filter(|entry| config.is_source_name(&entry.file_name().to_string_lossy()))
        .map(|entry| entry.into_path())
        .filter(|path| !has_excluded_component(path, root, config))
        .collect();

    files.sort();
    files.dedup();
    files
}

fn has_excluded_component(path: &Path, root: &Path, config: &EngineConfig) -> bool {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .any(|c| config.is_excluded(&c.as_os_str().to_string_lossy()))
}

/// Shell-style wildcard matched against a file name (not its path).
///
/// Backslashes are ordinary characters. A pattern that does not compile as a glob (an
/// unclosed `[`, say) has its brackets and braces taken literally instead, keeping `*` and
/// `?` as wildcards, so a malformed pattern narrows the selection rather than failing it.
#[derive(Debug, Clone)]
pub struct NameFilter {
    matcher: NameMatcher,
}

#[derive(Debug, Clone)]
enum NameMatcher {
    Glob(GlobMatcher),
    Literal(String),
}

fn compile_glob(pattern: &str) -> std::result::Result<GlobMatcher, globset::Error> {
    GlobBuilder::new(pattern)
        .literal_separator(false)
        .backslash_escape(false)
        .build()
        .map(|glob| glob.compile_matcher())
}

/// Wrap `[ ] { }` in single-character classes so they match themselves
fn escape_brackets(pattern: &str) -> String {
    let mut escaped = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        match c {
            '[' | ']' | '{' | '}' => {
                escaped.push('[');
                escaped.push(c);
                escaped.push(']');
            }
            _ => escaped.push(c),
        }
    }
    escaped
}

impl NameFilter {
    pub fn new(pattern: &str) -> Self {
        let matcher = match compile_glob(pattern) {
            Ok(m) => NameMatcher::Glob(m),
            Err(err) => {
                tracing::debug!(pattern, error = %err, "matching brackets in pattern literally");
                match compile_glob(&escape_brackets(pattern)) {
                    Ok(m) => NameMatcher::Glob(m),
                    Err(_) => NameMatcher::Literal(pattern.to_string()),
                }
            }
        };
        Self { matcher }
    }

    /// Build a filter only when a non-empty pattern was supplied
    pub fn optional(pattern: Option<&str>) -> Option<Self> {
        pattern.filter(|p| !p.is_empty()).map(Self::new)
    }

    pub fn matches(&self, path: &Path) -> bool {
        let Some(name) = path.file_name() else {
            return false;
        };
        match &self.matcher {
            NameMatcher::Glob(m) => m.is_match(name),
            NameMatcher::Literal(text) => name.to_string_lossy() == text.as_str(),
        }
    }
}

/// A listed source file
#[derive(Debug, Clone, Serialize)]
pub struct ListedFile {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// Result of a filtered source file lookup
#[derive(Debug, Clone, Serialize)]
pub struct SourceListing {
    pub pattern: Option<String>,
    pub include_tests: bool,
    pub files: Vec<ListedFile>,
}

impl TextReport for SourceListing {
    fn to_text(&self) -> String {
        if self.files.is_empty() {
            return "No Python files found matching criteria".to_string();
        }

        let mut out = format!("Found {} Python files:\n", self.files.len());
        for file in &self.files {
            let size = file.size.map(format_size).unwrap_or_else(|| "?".to_string());
            out.push_str(&format!(
                "\n  {} {} ({})",
                FileCategory::Source.icon(),
                file.path,
                size
            ));
        }
        out
    }
}

/// Source files filtered by name pattern, optionally without test files.
///
/// A file counts as a test when any component of its relative path starts with `test`.
pub fn find_source_files(
    root: &Path,
    config: &EngineConfig,
    pattern: Option<&str>,
    include_tests: bool,
) -> SourceListing {
    let filter = NameFilter::optional(pattern);

    let files = list_source_files(root, config)
        .into_iter()
        .filter(|path| filter.as_ref().map_or(true, |f| f.matches(path)))
        .filter_map(|path| {
            let relative = path.strip_prefix(root).ok()?.to_path_buf();
            if !include_tests && is_test_path(&relative) {
                return None;
            }
            Some(ListedFile {
                path: make_relative(&path, root)?,
                size: std::fs::metadata(&path).ok().map(|m| m.len()),
            })
        })
        .collect();

    SourceListing {
        pattern: pattern.map(str::to_string),
        include_tests,
        files,
    }
}

fn is_test_path(relative: &Path) -> bool {
    relative
        .components()
        .any(|c| c.as_os_str().to_string_lossy().starts_with("test"))
}
