//! Project analysis engine
//!
//! An [`Engine`] is one analysis session: it holds the configuration and at most one project
//! root. Every operation resolves paths against that root and fails with `NoRootSet` before
//! touching the filesystem when none is configured. Nothing is cached between calls.
//!
//! - tree: depth-limited directory rendering
//! - index: source file discovery
//! - manifest: dependency manifest parsing
//! - imports: import statement tallying
//! - deps: combined dependency report
//! - search: substring search over source files
//! - summary: project overview and root indicators

pub mod deps;
pub mod imports;
pub mod index;
pub mod manifest;
pub mod search;
pub mod summary;
pub mod tree;

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::core::config::EngineConfig;
use crate::core::error::{EngineError, Result};
use crate::core::file_reader::{Encoding, SafeFileReader};
use crate::core::paths::{is_within_root, lexical_normalize, make_relative};
use crate::core::render::TextReport;

use deps::DependencyReport;
use imports::ImportTally;
use index::{NameFilter, SourceListing};
use manifest::ManifestEntry;
use search::SearchReport;
use summary::{ProjectOverview, RootReport};
use tree::TreeView;

/// Content of one project file
#[derive(Debug, Clone, Serialize)]
pub struct FileContent {
    pub path: String,
    pub size: u64,
    pub encoding: Encoding,
    pub content: String,
}

impl TextReport for FileContent {
    fn to_text(&self) -> String {
        format!("File: {}\n\n{}", self.path, self.content)
    }
}

/// One analysis session over a single project root
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
    reader: SafeFileReader,
    root: Option<PathBuf>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let reader = SafeFileReader::new(config.max_file_size);
        Self {
            config,
            reader,
            root: None,
        }
    }

    /// The configured root
    pub fn root(&self) -> Result<&Path> {
        self.root.as_deref().ok_or(EngineError::NoRootSet)
    }

    /// Configure (or replace) the project root.
    ///
    /// The path is canonicalized. On failure the previous root, if any, stays in place.
    pub fn set_root(&mut self, path: impl AsRef<Path>) -> Result<RootReport> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(EngineError::InvalidRoot {
                path: path.to_path_buf(),
                reason: "does not exist",
            });
        }
        if !path.is_dir() {
            return Err(EngineError::InvalidRoot {
                path: path.to_path_buf(),
                reason: "is not a directory",
            });
        }

        let root = path.canonicalize()?;
        tracing::info!(root = %root.display(), "project root set");

        let report = RootReport {
            root: root.display().to_string(),
            indicators: summary::project_indicators(&root, &self.config),
        };
        self.root = Some(root);
        Ok(report)
    }

    /// Render the directory tree down to `max_depth` levels
    pub fn explore_structure(&self, max_depth: usize, include_hidden: bool) -> Result<TreeView> {
        let root = self.root()?;
        Ok(tree::walk_tree(root, max_depth, include_hidden, &self.config))
    }

    /// Read one file, given relative to the root or as an absolute path inside it.
    ///
    /// Containment is decided before existence, so paths outside the root are refused
    /// the same way whether or not they exist.
    pub fn read_file(&self, file: impl AsRef<Path>) -> Result<FileContent> {
        let root = self.root()?;
        let path = lexical_normalize(&root.join(file.as_ref()));

        // an existing path may still reach the root through a symlinked prefix
        if !path.starts_with(root) && !is_within_root(&path, root) {
            return Err(EngineError::OutsideRoot(path));
        }
        if !path.exists() {
            return Err(EngineError::NotFound(path));
        }
        if !is_within_root(&path, root) {
            return Err(EngineError::OutsideRoot(path));
        }

        let canonical = path.canonicalize()?;
        let decoded = self.reader.read(&canonical)?;

        Ok(FileContent {
            path: make_relative(&canonical, root).unwrap_or_else(|| canonical.display().to_string()),
            size: decoded.size,
            encoding: decoded.encoding,
            content: decoded.content,
        })
    }

    /// Sorted source file index, recomputed on every call
    pub fn source_files(&self) -> Result<Vec<PathBuf>> {
        let root = self.root()?;
        Ok(index::list_source_files(root, &self.config))
    }

    /// Source files filtered by a name wildcard and, optionally, without tests
    pub fn find_source_files(
        &self,
        pattern: Option<&str>,
        include_tests: bool,
    ) -> Result<SourceListing> {
        let root = self.root()?;
        Ok(index::find_source_files(
            root,
            &self.config,
            pattern,
            include_tests,
        ))
    }

    /// Dependencies declared by the manifests at the root
    pub fn manifests(&self) -> Result<Vec<ManifestEntry>> {
        let root = self.root()?;
        Ok(manifest::analyze_manifests(root, &self.config, &self.reader))
    }

    /// Import counts across every source file
    pub fn import_tally(&self) -> Result<ImportTally> {
        let files = self.source_files()?;
        Ok(imports::tally_imports(&files, &self.reader))
    }

    pub fn analyze_dependencies(&self, include_imports: bool) -> Result<DependencyReport> {
        let manifests = self.manifests()?;
        let imports = if include_imports {
            Some(self.import_tally()?)
        } else {
            None
        };

        Ok(DependencyReport {
            manifests,
            imports,
            manifest_display_cap: self.config.manifest_display_cap,
            import_display_cap: self.config.import_display_cap,
        })
    }

    /// Substring search over source files, optionally scoped by a file name wildcard
    pub fn search(
        &self,
        query: &str,
        case_sensitive: bool,
        file_pattern: Option<&str>,
    ) -> Result<SearchReport> {
        let root = self.root()?;
        let filter = NameFilter::optional(file_pattern);
        let files = index::list_source_files(root, &self.config);

        Ok(search::search_files(
            root,
            &files,
            query,
            case_sensitive,
            filter.as_ref(),
            &self.reader,
            self.config.search_display_cap,
        ))
    }

    pub fn overview(&self) -> Result<ProjectOverview> {
        let root = self.root()?;
        Ok(summary::project_overview(root, &self.config, &self.reader))
    }
}
