//! Dependency manifest parsing
//!
//! Best-effort extraction of dependency names from the manifests found at the project root.
//! None of the formats is parsed with a real grammar: requirement lists are read line by
//! line, `pyproject.toml` with a section toggle, and `setup.py`/`setup.cfg` with regular
//! expressions. Malformed or partial manifests yield whatever names can be recovered.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::path::Path;

use crate::core::config::EngineConfig;
use crate::core::error::EngineError;
use crate::core::file_reader::{text_lines, SafeFileReader};

/// Static regex for `install_requires = [...]`, spanning lines
pub static INSTALL_REQUIRES_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)install_requires\s*=\s*\[(.*?)\]").expect("Invalid INSTALL_REQUIRES_RE regex")
});

/// Static regex for `requires = [...]`. Also matches inside `install_requires`.
pub static REQUIRES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)requires\s*=\s*\[(.*?)\]").expect("Invalid REQUIRES_RE regex"));

/// Static regex for a single- or double-quoted string
pub static QUOTED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"["']([^"']+)["']"#).expect("Invalid QUOTED_RE regex"));

/// Headers that open the dependency section of `pyproject.toml`
const PYPROJECT_HEADERS: &[&str] = &["[tool.poetry.dependencies]", "dependencies = ["];

/// Characters that end the name part of a requirement specifier
const SPECIFIER_START: &[char] = &['<', '>', '=', '!', '~', ';', '[', '@', '('];

/// How a manifest is read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ManifestFormat {
    /// One requirement per line (`requirements*.txt`)
    LineList,
    /// A dependency table toggled by section headers (`pyproject.toml`)
    DeclarativeBlock,
    /// Quoted names inside `requires = [...]` lists (`setup.py`, `setup.cfg`)
    FreeText,
}

impl ManifestFormat {
    /// Format for a recognized manifest name. `Pipfile` is recognized but not parsed.
    pub fn for_name(name: &str) -> Option<Self> {
        match name {
            n if n.ends_with(".txt") => Some(ManifestFormat::LineList),
            "pyproject.toml" => Some(ManifestFormat::DeclarativeBlock),
            "setup.py" | "setup.cfg" => Some(ManifestFormat::FreeText),
            _ => None,
        }
    }

    pub fn parse(&self, content: &str) -> Vec<String> {
        match self {
            ManifestFormat::LineList => parse_requirements(content),
            ManifestFormat::DeclarativeBlock => parse_pyproject(content),
            ManifestFormat::FreeText => parse_setup(content),
        }
    }
}

/// Dependencies declared by one manifest, in declaration order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestEntry {
    pub file: String,
    pub dependencies: Vec<String>,
}

/// What happened to one recognized manifest present at the root
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestOutcome {
    Parsed(ManifestEntry),
    Skipped { file: String, reason: String },
}

/// Parse every recognized manifest present at `root`, in configuration order.
///
/// Missing manifests are not reported. A manifest that cannot be read is reported as
/// skipped and never stops the others from being parsed.
pub fn scan_manifests(
    root: &Path,
    config: &EngineConfig,
    reader: &SafeFileReader,
) -> Vec<ManifestOutcome> {
    let mut outcomes = Vec::new();

    for name in &config.manifest_files {
        let path = root.join(name);
        if !path.exists() {
            continue;
        }

        let format = match ManifestFormat::for_name(name) {
            Some(f) => f,
            None => {
                let err = EngineError::Parse {
                    path,
                    message: "format not supported".to_string(),
                };
                tracing::debug!("{}", err);
                outcomes.push(ManifestOutcome::Skipped {
                    file: name.clone(),
                    reason: err.to_string(),
                });
                continue;
            }
        };

        match reader.read_text(&path) {
            Ok(content) => {
                let dependencies = format.parse(&content);
                tracing::debug!(manifest = %name, count = dependencies.len(), "parsed manifest");
                outcomes.push(ManifestOutcome::Parsed(ManifestEntry {
                    file: name.clone(),
                    dependencies,
                }));
            }
            Err(err) => {
                tracing::warn!("Error parsing {}: {}", name, err);
                outcomes.push(ManifestOutcome::Skipped {
                    file: name.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }

    outcomes
}

/// Manifests that declared at least one dependency
pub fn analyze_manifests(
    root: &Path,
    config: &EngineConfig,
    reader: &SafeFileReader,
) -> Vec<ManifestEntry> {
    scan_manifests(root, config, reader)
        .into_iter()
        .filter_map(|outcome| match outcome {
            ManifestOutcome::Parsed(entry) if !entry.dependencies.is_empty() => Some(entry),
            _ => None,
        })
        .collect()
}

/// Recognized manifests that exist at `root`, listed but not parsed
pub fn present_manifests(root: &Path, config: &EngineConfig) -> Vec<String> {
    config
        .manifest_files
        .iter()
        .filter(|name| root.join(name).exists())
        .cloned()
        .collect()
}

/// Requirement list: first token of each non-blank line that is not a comment (`#`)
/// or an option (`-r`, `-e`, `--index-url`), with its specifier removed.
pub fn parse_requirements(content: &str) -> Vec<String> {
    text_lines(content)
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('-'))
        .filter_map(|line| line.split_whitespace().next())
        .map(strip_specifier)
        .filter(|name| !name.is_empty())
        .collect()
}

fn strip_specifier(requirement: &str) -> String {
    requirement
        .split(SPECIFIER_START)
        .next()
        .unwrap_or(requirement)
        .trim()
        .to_string()
}

/// `pyproject.toml`: inside a dependency section, the key left of the first `=` of each
/// line. Any bracketed header closes the section. `python` is a version pin, not a package.
pub fn parse_pyproject(content: &str) -> Vec<String> {
    let mut deps = Vec::new();
    let mut in_section = false;

    for line in text_lines(content) {
        let line = line.trim();
        if PYPROJECT_HEADERS.iter().any(|h| line.starts_with(h)) {
            in_section = true;
            continue;
        }
        if line.starts_with('[') && in_section {
            in_section = false;
        } else if in_section {
            if let Some((key, _)) = line.split_once('=') {
                let name = key.trim().trim_matches(|c| c == '"' || c == '\'');
                if name != "python" {
                    deps.push(name.to_string());
                }
            }
        }
    }

    deps
}

/// `setup.py`/`setup.cfg`: quoted strings inside `install_requires = [...]` and
/// `requires = [...]`, cut at the first `>=`, `==` or `<`.
pub fn parse_setup(content: &str) -> Vec<String> {
    let mut deps = Vec::new();

    for re in [&*INSTALL_REQUIRES_RE, &*REQUIRES_RE] {
        for caps in re.captures_iter(content) {
            let list = match caps.get(1) {
                Some(m) => m.as_str(),
                None => continue,
            };
            for quoted in QUOTED_RE.captures_iter(list) {
                if let Some(pkg) = quoted.get(1) {
                    deps.push(strip_constraint(pkg.as_str()));
                }
            }
        }
    }

    deps
}

fn strip_constraint(pkg: &str) -> String {
    let name = pkg.split(">=").next().unwrap_or(pkg);
    let name = name.split("==").next().unwrap_or(name);
    let name = name.split('<').next().unwrap_or(name);
    name.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_requirements_comments_options_and_specifiers() {
        let content = "# comment\n-r other.txt\n\nrequests>=2.0\n";
        assert_eq!(parse_requirements(content), vec!["requests"]);
    }

    #[test]
    fn test_requirements_markers_and_extras() {
        let content = "\
flask==2.3.1  # web
uvicorn[standard]~=0.23
pytest ; python_version >= \"3.8\"
   numpy
--index-url https://example.com/simple
-e .
";
        assert_eq!(
            parse_requirements(content),
            vec!["flask", "uvicorn", "pytest", "numpy"]
        );
    }

    #[test]
    fn test_pyproject_poetry_section() {
        let content = r#"
[tool.poetry]
name = "demo"

[tool.poetry.dependencies]
python = "^3.10"
requests = "^2.31"
"pydantic" = { version = "^2" }

[tool.poetry.group.dev.dependencies]
pytest = "^7"
"#;
        assert_eq!(parse_pyproject(content), vec!["requests", "pydantic"]);
    }

    #[test]
    fn test_pyproject_pep621_list_is_literal() {
        // Names are taken left of the first '=' only, so bare entries are not recovered
        // and `>=` leaves its `>` behind.
        let content = r#"
[project]
name = "demo"
dependencies = [
    "httpx>=0.25",
    "rich",
]

[build-system]
requires = ["hatchling"]
"#;
        assert_eq!(parse_pyproject(content), vec!["httpx>"]);
    }

    #[test]
    fn test_pyproject_without_section() {
        assert!(parse_pyproject("[project]\nname = \"x\"\n").is_empty());
    }

    #[test]
    fn test_setup_install_requires_multiline() {
        let content = r#"
from setuptools import setup

setup(
    name="demo",
    install_requires=[
        "click>=8.0",
        'jinja2==3.1.2',
        "markupsafe<3",
    ],
)
"#;
        // `requires = [` also matches inside `install_requires = [`
        assert_eq!(
            parse_setup(content),
            vec!["click", "jinja2", "markupsafe", "click", "jinja2", "markupsafe"]
        );
    }

    #[test]
    fn test_setup_requires_only() {
        let content = "setup(setup_requires=['wheel'], tests_require=[])";
        assert_eq!(parse_setup(content), vec!["wheel"]);
    }

    #[test]
    fn test_manifest_format_for_name() {
        assert_eq!(
            ManifestFormat::for_name("requirements-dev.txt"),
            Some(ManifestFormat::LineList)
        );
        assert_eq!(
            ManifestFormat::for_name("pyproject.toml"),
            Some(ManifestFormat::DeclarativeBlock)
        );
        assert_eq!(
            ManifestFormat::for_name("setup.cfg"),
            Some(ManifestFormat::FreeText)
        );
        assert_eq!(ManifestFormat::for_name("Pipfile"), None);
    }

    #[test]
    fn test_analyze_manifests_skips_empty_and_missing() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("requirements.txt"), "requests\nrich==13\n").unwrap();
        fs::write(temp.path().join("requirements-dev.txt"), "# nothing yet\n").unwrap();
        fs::write(temp.path().join("Pipfile"), "[packages]\nflask = \"*\"\n").unwrap();

        let config = EngineConfig::default();
        let entries = analyze_manifests(temp.path(), &config, &SafeFileReader::default());
        assert_eq!(
            entries,
            vec![ManifestEntry {
                file: "requirements.txt".to_string(),
                dependencies: vec!["requests".to_string(), "rich".to_string()],
            }]
        );

        let present = present_manifests(temp.path(), &config);
        assert_eq!(
            present,
            vec!["requirements.txt", "requirements-dev.txt", "Pipfile"]
        );
    }

    #[test]
    fn test_unreadable_manifest_does_not_abort_others() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("requirements.txt"), "x".repeat(64)).unwrap();
        fs::write(
            temp.path().join("setup.py"),
            "setup(install_requires=['a'])",
        )
        .unwrap();

        let reader = SafeFileReader::new(40);
        let outcomes = scan_manifests(temp.path(), &EngineConfig::default(), &reader);

        assert!(matches!(
            &outcomes[0],
            ManifestOutcome::Skipped { file, .. } if file == "requirements.txt"
        ));
        assert!(matches!(
            &outcomes[1],
            ManifestOutcome::Parsed(entry) if entry.file == "setup.py" && !entry.dependencies.is_empty()
        ));
    }

    #[test]
    fn test_pipfile_is_listed_but_skipped() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("Pipfile"), "[packages]\nrequests = \"*\"\n").unwrap();

        let outcomes = scan_manifests(
            temp.path(),
            &EngineConfig::default(),
            &SafeFileReader::default(),
        );
        assert_eq!(outcomes.len(), 1);
        assert!(matches!(
            &outcomes[0],
            ManifestOutcome::Skipped { file, reason }
                if file == "Pipfile" && reason.ends_with("format not supported")
        ));
    }
}
