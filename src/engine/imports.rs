//! Import tallying
//!
//! Counts `import x` and `from x import ...` statements across the source index, keyed by
//! the top-level module name. Lines are matched after trimming, so indented imports inside
//! functions count too.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::core::file_reader::{text_lines, SafeFileReader};

/// Static regex for `import <module>`
pub static IMPORT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^import\s+([^\s,]+)").expect("Invalid IMPORT_RE regex"));

/// Static regex for `from <module> import`
pub static FROM_IMPORT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^from\s+([^\s,]+)\s+import").expect("Invalid FROM_IMPORT_RE regex"));

/// Exact occurrence counts per top-level module
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ImportTally {
    counts: HashMap<String, usize>,
}

impl ImportTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, module: &str) {
        *self.counts.entry(module.to_string()).or_insert(0) += 1;
    }

    pub fn count(&self, module: &str) -> usize {
        self.counts.get(module).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Count every import statement in one file's text
    pub fn add_source(&mut self, content: &str) {
        for line in text_lines(content) {
            if let Some(module) = imported_module(line.trim()) {
                self.record(module);
            }
        }
    }

    /// The `n` most imported modules, by descending count then name
    pub fn top(&self, n: usize) -> Vec<(String, usize)> {
        let mut ranked: Vec<(String, usize)> = self
            .counts
            .iter()
            .map(|(module, count)| (module.clone(), *count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(n);
        ranked
    }
}

/// Top-level module referenced by a trimmed line, if it is an import statement.
///
/// The top-level module is the text before the first `.`, so relative imports
/// (`from . import x`, `from .sub import y`) are all counted under the empty name.
pub fn imported_module(line: &str) -> Option<&str> {
    let caps = IMPORT_RE
        .captures(line)
        .or_else(|| FROM_IMPORT_RE.captures(line))?;
    let module = caps.get(1)?.as_str();
    module.split('.').next()
}

/// Tally imports across `files`. Unreadable files are logged and skipped.
pub fn tally_imports(files: &[PathBuf], reader: &SafeFileReader) -> ImportTally {
    let mut tally = ImportTally::new();

    for path in files {
        match reader.read_text(path) {
            Ok(content) => tally.add_source(&content),
            Err(err) => {
                tracing::warn!("Error analyzing imports in {}: {}", path.display(), err);
            }
        }
    }

    tracing::debug!(files = files.len(), modules = tally.len(), "import tally finished");
    tally
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_imported_module() {
        assert_eq!(imported_module("import os"), Some("os"));
        assert_eq!(imported_module("import os.path as p"), Some("os"));
        assert_eq!(imported_module("import json, sys"), Some("json"));
        assert_eq!(imported_module("from collections.abc import Mapping"), Some("collections"));
        assert_eq!(imported_module("from . import sibling"), Some(""));
        assert_eq!(imported_module("from .models import User"), Some(""));
        assert_eq!(imported_module("from ..pkg.models import User"), Some(""));
        assert_eq!(imported_module("# import os"), None);
        assert_eq!(imported_module("important = 1"), None);
        assert_eq!(imported_module("from_date = today"), None);
    }

    #[test]
    fn test_os_counted_twice() {
        let mut tally = ImportTally::new();
        tally.add_source("import os\nfrom os.path import join\n");
        assert_eq!(tally.count("os"), 2);
        assert_eq!(tally.len(), 1);
    }

    #[test]
    fn test_relative_imports_share_empty_name() {
        let mut tally = ImportTally::new();
        tally.add_source("from . import views\nfrom .models import User\nimport os\n");
        assert_eq!(tally.count(""), 2);
        assert_eq!(tally.count("os"), 1);
    }

    #[test]
    fn test_carriage_return_line_endings() {
        let mut tally = ImportTally::new();
        tally.add_source("import os\rimport sys\r\nfrom json import loads\r");
        assert_eq!(tally.count("os"), 1);
        assert_eq!(tally.count("sys"), 1);
        assert_eq!(tally.count("json"), 1);
    }

    #[test]
    fn test_indented_imports_count() {
        let mut tally = ImportTally::new();
        tally.add_source("def f():\n    import json\n    return json\n");
        assert_eq!(tally.count("json"), 1);
    }

    #[test]
    fn test_top_orders_by_count_then_name() {
        let mut tally = ImportTally::new();
        for module in ["sys", "os", "os", "re", "abc", "abc"] {
            tally.record(module);
        }
        assert_eq!(
            tally.top(3),
            vec![
                ("abc".to_string(), 2),
                ("os".to_string(), 2),
                ("re".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_tally_across_files_skips_unreadable() {
        let temp = tempdir().unwrap();
        let a = temp.path().join("a.py");
        let b = temp.path().join("b.py");
        let big = temp.path().join("big.py");
        fs::write(&a, "import requests\nimport os\n").unwrap();
        fs::write(&b, "from requests import get\n").unwrap();
        fs::write(&big, format!("import numpy\n{}", "#".repeat(200))).unwrap();

        let files = vec![a, b, big, temp.path().join("missing.py")];
        let tally = tally_imports(&files, &SafeFileReader::new(100));

        assert_eq!(tally.count("requests"), 2);
        assert_eq!(tally.count("os"), 1);
        assert_eq!(tally.count("numpy"), 0);
    }
}
