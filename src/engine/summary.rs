//! Project overview
//!
//! Composes the index, manifest scan and a few root-level probes into one report. A
//! directory with no Python indicators still gets a well-formed overview, flagged as such.

use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::core::config::EngineConfig;
use crate::core::file_reader::SafeFileReader;
use crate::core::paths::{FileCategory, DIR_ICON};
use crate::core::render::TextReport;
use crate::engine::index::list_source_files;
use crate::engine::manifest::{analyze_manifests, present_manifests};

/// Packages directly under `root`: directories holding the package marker, sorted by name
pub fn find_packages(root: &Path, config: &EngineConfig) -> Vec<String> {
    let mut packages: Vec<String> = match fs::read_dir(root) {
        Ok(rd) => rd
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_dir() && path.join(&config.package_marker).exists())
            .filter_map(|path| path.file_name().map(|n| n.to_string_lossy().into_owned()))
            .collect(),
        Err(err) => {
            tracing::warn!(path = %root.display(), error = %err, "cannot list project root");
            Vec::new()
        }
    };
    packages.sort();
    packages
}

/// Files directly in `root` whose name ends with one of `extensions`
fn count_root_files(root: &Path, extensions: &[String]) -> usize {
    fs::read_dir(root)
        .map(|rd| {
            rd.filter_map(|entry| entry.ok())
                .filter(|entry| entry.path().is_file())
                .filter(|entry| {
                    let name = entry.file_name().to_string_lossy().into_owned();
                    extensions.iter().any(|ext| name.ends_with(ext.as_str()))
                })
                .count()
        })
        .unwrap_or(0)
}

/// Signs that `root` holds a Python project; empty when there are none
pub fn project_indicators(root: &Path, config: &EngineConfig) -> Vec<String> {
    let mut indicators = Vec::new();

    let root_sources = count_root_files(root, &[".py".to_string()]);
    if root_sources > 0 {
        indicators.push(format!("{} Python files in root", root_sources));
    }

    for name in present_manifests(root, config) {
        indicators.push(format!("Found {}", name));
    }

    let packages = find_packages(root, config).len();
    if packages > 0 {
        indicators.push(format!("{} Python packages found", packages));
    }

    indicators
}

/// Outcome of configuring a project root
#[derive(Debug, Clone, Serialize)]
pub struct RootReport {
    pub root: String,
    pub indicators: Vec<String>,
}

impl TextReport for RootReport {
    fn to_text(&self) -> String {
        let mut out = format!("Project root set to: {}\n\n", self.root);
        if self.indicators.is_empty() {
            out.push_str("Warning: No clear Python project indicators found in this directory.");
        } else {
            out.push_str("Python project indicators found:");
            for indicator in &self.indicators {
                out.push_str(&format!("\n  - {}", indicator));
            }
        }
        out
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectOverview {
    pub name: String,
    pub root: String,
    pub python_files: usize,
    pub packages: Vec<String>,
    pub config_files: Vec<String>,
    pub doc_files: usize,

    /// Sum of per-manifest list lengths; names shared by manifests count once per manifest
    pub total_dependencies: usize,
    pub indicators: Vec<String>,

    #[serde(skip)]
    pub package_display_cap: usize,
}

impl ProjectOverview {
    pub fn is_python_project(&self) -> bool {
        !self.indicators.is_empty() || self.python_files > 0
    }
}

impl TextReport for ProjectOverview {
    fn to_text(&self) -> String {
        let title = format!("Python Project Overview: {}", self.name);
        let mut out = format!(
            "{}\n{}\n\n",
            title,
            "=".repeat(25 + self.name.chars().count())
        );

        out.push_str(&format!("{} Project Root: {}\n", DIR_ICON, self.root));
        out.push_str(&format!(
            "{} Python Files: {}\n",
            FileCategory::Source.icon(),
            self.python_files
        ));

        if !self.packages.is_empty() {
            out.push_str(&format!(
                "{} Python Packages: {}\n",
                FileCategory::Manifest.icon(),
                self.packages.len()
            ));
            for pkg in self.packages.iter().take(self.package_display_cap) {
                out.push_str(&format!("    - {}\n", pkg));
            }
            if self.packages.len() > self.package_display_cap {
                out.push_str(&format!(
                    "    ... and {} more\n",
                    self.packages.len() - self.package_display_cap
                ));
            }
        }

        if !self.config_files.is_empty() {
            out.push_str(&format!(
                "{}  Configuration Files: {}\n",
                FileCategory::Config.icon(),
                self.config_files.join(", ")
            ));
        }

        if self.doc_files > 0 {
            out.push_str(&format!(
                "{} Documentation: {} files\n",
                FileCategory::Doc.icon(),
                self.doc_files
            ));
        }

        out.push_str(&format!(
            "📋 Dependencies: ~{} packages\n",
            self.total_dependencies
        ));

        if !self.is_python_project() {
            out.push_str(
                "⚠️ Not a recognizable Python project: no Python files, manifests or packages found\n",
            );
        }

        out.push_str(&format!("\n{}\n", "=".repeat(50)));
        out.push_str("Use other tools to explore specific aspects of the project!");
        out
    }
}

/// Build the overview for `root`
pub fn project_overview(
    root: &Path,
    config: &EngineConfig,
    reader: &SafeFileReader,
) -> ProjectOverview {
    let name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.display().to_string());

    let total_dependencies = analyze_manifests(root, config, reader)
        .iter()
        .map(|entry| entry.dependencies.len())
        .sum();

    ProjectOverview {
        name,
        root: root.display().to_string(),
        python_files: list_source_files(root, config).len(),
        packages: find_packages(root, config),
        config_files: present_manifests(root, config),
        doc_files: count_root_files(root, &config.doc_extensions),
        total_dependencies,
        indicators: project_indicators(root, config),
        package_display_cap: config.package_display_cap,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn overview(root: &Path) -> ProjectOverview {
        project_overview(root, &EngineConfig::default(), &SafeFileReader::default())
    }

    #[test]
    fn test_overview_counts() {
        let temp = tempdir().unwrap();
        write(temp.path(), "app.py", "import os\n");
        write(temp.path(), "core/__init__.py", "");
        write(temp.path(), "core/models.py", "");
        write(temp.path(), "scripts/run.py", "");
        write(temp.path(), "README.md", "# demo");
        write(temp.path(), "CHANGES.rst", "");
        write(temp.path(), "requirements.txt", "requests\nrich\n");
        write(temp.path(), "setup.py", "setup(install_requires=['requests'])");

        let ov = overview(temp.path());
        assert_eq!(ov.python_files, 5);
        assert_eq!(ov.packages, vec!["core"]);
        assert_eq!(ov.config_files, vec!["requirements.txt", "setup.py"]);
        // README.md, CHANGES.rst, requirements.txt
        assert_eq!(ov.doc_files, 3);
        // requirements: 2, setup.py: requests twice (install_requires and requires)
        assert_eq!(ov.total_dependencies, 4);
        assert!(ov.is_python_project());

        let text = ov.to_text();
        assert!(text.contains("🐍 Python Files: 5\n"));
        assert!(text.contains("📦 Python Packages: 1\n    - core\n"));
        assert!(text.contains("⚙️  Configuration Files: requirements.txt, setup.py\n"));
        assert!(text.contains("📝 Documentation: 3 files\n"));
        assert!(text.contains("📋 Dependencies: ~4 packages\n"));
        assert!(!text.contains("Not a recognizable"));
    }

    #[test]
    fn test_title_underline_matches_name() {
        let temp = tempdir().unwrap();
        let root = temp.path().join("proj");
        fs::create_dir(&root).unwrap();

        let text = overview(&root).to_text();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Python Project Overview: proj"));
        assert_eq!(lines.next(), Some("=".repeat(29).as_str()));
    }

    #[test]
    fn test_package_display_cap() {
        let temp = tempdir().unwrap();
        for i in 0..7 {
            write(temp.path(), &format!("pkg{i}/__init__.py"), "");
        }

        let text = overview(temp.path()).to_text();
        assert!(text.contains("📦 Python Packages: 7\n"));
        assert!(text.contains("    - pkg4\n"));
        assert!(!text.contains("    - pkg5\n"));
        assert!(text.contains("    ... and 2 more\n"));
    }

    #[test]
    fn test_zero_indicator_directory() {
        let temp = tempdir().unwrap();
        write(temp.path(), "notes.txt", "hello");
        write(temp.path(), "src/main.rs", "fn main() {}");

        let ov = overview(temp.path());
        assert_eq!(ov.python_files, 0);
        assert_eq!(ov.total_dependencies, 0);
        assert!(ov.indicators.is_empty());
        assert!(!ov.is_python_project());

        let text = ov.to_text();
        assert!(text.contains("🐍 Python Files: 0\n"));
        assert!(text.contains("📋 Dependencies: ~0 packages\n"));
        assert!(text.contains("Not a recognizable Python project"));
        assert!(text.ends_with("Use other tools to explore specific aspects of the project!"));
    }

    #[test]
    fn test_project_indicators() {
        let temp = tempdir().unwrap();
        write(temp.path(), "a.py", "");
        write(temp.path(), "b.py", "");
        write(temp.path(), "lib.pyx", "");
        write(temp.path(), "pyproject.toml", "");
        write(temp.path(), "pkg/__init__.py", "");

        let indicators = project_indicators(temp.path(), &EngineConfig::default());
        assert_eq!(
            indicators,
            vec![
                "2 Python files in root",
                "Found pyproject.toml",
                "1 Python packages found",
            ]
        );
    }

    #[test]
    fn test_root_report_text() {
        let report = RootReport {
            root: "/work/demo".to_string(),
            indicators: vec![],
        };
        assert_eq!(
            report.to_text(),
            "Project root set to: /work/demo\n\nWarning: No clear Python project indicators found in this directory."
        );

        let report = RootReport {
            root: "/work/demo".to_string(),
            indicators: vec!["Found setup.py".to_string()],
        };
        assert!(report
            .to_text()
            .ends_with("Python project indicators found:\n  - Found setup.py"));
    }
}
