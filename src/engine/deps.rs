//! Dependency analysis report
//!
//! Combines declared dependencies (manifests) with observed ones (import tally).

use serde::Serialize;

use crate::core::render::TextReport;
use crate::engine::imports::ImportTally;
use crate::engine::manifest::ManifestEntry;

#[derive(Debug, Clone, Serialize)]
pub struct DependencyReport {
    pub manifests: Vec<ManifestEntry>,

    /// Full, uncapped tally; `None` when imports were not requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imports: Option<ImportTally>,

    #[serde(skip)]
    pub manifest_display_cap: usize,

    #[serde(skip)]
    pub import_display_cap: usize,
}

impl TextReport for DependencyReport {
    fn to_text(&self) -> String {
        let mut out = format!("Project Dependencies Analysis\n{}\n\n", "=".repeat(35));

        if !self.manifests.is_empty() {
            out.push_str("Dependencies from requirements files:\n");
            for entry in &self.manifests {
                out.push_str(&format!("\n{}:\n", entry.file));
                for dep in entry.dependencies.iter().take(self.manifest_display_cap) {
                    out.push_str(&format!("  - {}\n", dep));
                }
                if entry.dependencies.len() > self.manifest_display_cap {
                    out.push_str(&format!(
                        "  ... and {} more\n",
                        entry.dependencies.len() - self.manifest_display_cap
                    ));
                }
            }
        }

        if let Some(tally) = self.imports.as_ref().filter(|t| !t.is_empty()) {
            out.push_str(&format!(
                "\nImported modules (top {}):\n",
                self.import_display_cap
            ));
            for (module, count) in tally.top(self.import_display_cap) {
                out.push_str(&format!("  - {} (used {} times)\n", module, count));
            }
        }

        out.trim_end().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(file: &str, deps: &[&str]) -> ManifestEntry {
        ManifestEntry {
            file: file.to_string(),
            dependencies: deps.iter().map(|d| d.to_string()).collect(),
        }
    }

    #[test]
    fn test_manifest_display_cap() {
        let deps: Vec<String> = (0..12).map(|i| format!("pkg{i}")).collect();
        let deps: Vec<&str> = deps.iter().map(String::as_str).collect();
        let report = DependencyReport {
            manifests: vec![entry("requirements.txt", &deps)],
            imports: None,
            manifest_display_cap: 10,
            import_display_cap: 20,
        };

        let text = report.to_text();
        assert!(text.starts_with("Project Dependencies Analysis\n==="));
        assert!(text.contains("\nrequirements.txt:\n  - pkg0\n"));
        assert!(text.contains("  - pkg9\n"));
        assert!(!text.contains("pkg10"));
        assert!(text.ends_with("  ... and 2 more"));
        assert!(!text.contains("Imported modules"));
    }

    #[test]
    fn test_import_section() {
        let mut tally = ImportTally::new();
        tally.add_source("import os\nimport os\nimport sys\n");
        let report = DependencyReport {
            manifests: vec![],
            imports: Some(tally),
            manifest_display_cap: 10,
            import_display_cap: 1,
        };

        let text = report.to_text();
        assert!(!text.contains("Dependencies from requirements files"));
        assert!(text.ends_with("Imported modules (top 1):\n  - os (used 2 times)"));
    }

    #[test]
    fn test_json_keeps_full_tally() {
        let mut tally = ImportTally::new();
        tally.add_source("import a\nimport b\nimport c\n");
        let report = DependencyReport {
            manifests: vec![entry("setup.py", &["a"])],
            imports: Some(tally),
            manifest_display_cap: 10,
            import_display_cap: 1,
        };

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["imports"].as_object().unwrap().len(), 3);
        assert_eq!(value["manifests"][0]["file"], "setup.py");
        assert!(value.get("import_display_cap").is_none());
    }
}
