//! Code search
//!
//! Plain substring search over the source index, line by line. Matches keep discovery
//! order (files as indexed, then ascending line number). Only the first matches up to the
//! display cap are kept, but the total is always exact.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::core::file_reader::{text_lines, SafeFileReader};
use crate::core::paths::make_relative;
use crate::core::render::TextReport;
use crate::engine::index::NameFilter;

/// One matching line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchMatch {
    pub file: String,
    pub line: usize,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    pub query: String,
    pub case_sensitive: bool,
    pub total: usize,
    pub matches: Vec<SearchMatch>,
}

impl SearchReport {
    pub fn truncated(&self) -> bool {
        self.total > self.matches.len()
    }
}

impl TextReport for SearchReport {
    fn to_text(&self) -> String {
        if self.total == 0 {
            return format!("No matches found for '{}'", self.query);
        }

        let mut out = format!("Found {} matches for '{}':\n\n", self.total, self.query);
        let lines: Vec<String> = self
            .matches
            .iter()
            .map(|m| format!("{}:{}: {}", m.file, m.line, m.content))
            .collect();
        out.push_str(&lines.join("\n"));

        if self.truncated() {
            out.push_str(&format!(
                "\n\n... and {} more matches",
                self.total - self.matches.len()
            ));
        }
        out
    }
}

/// Line matcher honoring case sensitivity
#[derive(Debug, Clone)]
struct LineMatcher {
    needle: String,
    case_sensitive: bool,
}

impl LineMatcher {
    fn new(query: &str, case_sensitive: bool) -> Self {
        let needle = if case_sensitive {
            query.to_string()
        } else {
            query.to_lowercase()
        };
        Self {
            needle,
            case_sensitive,
        }
    }

    fn is_match(&self, line: &str) -> bool {
        if self.case_sensitive {
            line.contains(&self.needle)
        } else {
            line.to_lowercase().contains(&self.needle)
        }
    }
}

/// Search `files` for `query`, keeping at most `cap` matches.
pub fn search_files(
    root: &Path,
    files: &[PathBuf],
    query: &str,
    case_sensitive: bool,
    name_filter: Option<&NameFilter>,
    reader: &SafeFileReader,
    cap: usize,
) -> SearchReport {
    let matcher = LineMatcher::new(query, case_sensitive);
    let mut matches = Vec::new();
    let mut total = 0;

    let candidates = files
        .iter()
        .filter(|path| name_filter.map_or(true, |f| f.matches(path)));

    for path in candidates {
        let content = match reader.read_text(path) {
            Ok(c) => c,
            Err(err) => {
                tracing::warn!("Error searching in {}: {}", path.display(), err);
                continue;
            }
        };

        let relative = make_relative(path, root).unwrap_or_else(|| path.display().to_string());

        for (idx, line) in text_lines(&content).enumerate() {
            if !matcher.is_match(line) {
                continue;
            }
            total += 1;
            if matches.len() < cap {
                matches.push(SearchMatch {
                    file: relative.clone(),
                    line: idx + 1,
                    content: line.trim().to_string(),
                });
            }
        }
    }

    tracing::debug!(query, total, shown = matches.len(), "search finished");

    SearchReport {
        query: query.to_string(),
        case_sensitive,
        total,
        matches,
    }
}
