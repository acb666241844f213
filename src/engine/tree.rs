//! Directory tree rendering
//!
//! Walks the project with an explicit depth counter. Each level is sorted by
//! `(is_file, lowercase name)`, so directories come before files and names compare
//! case-insensitively within each group.

use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::core::config::EngineConfig;
use crate::core::paths::{format_size, is_hidden, FileCategory, DENIED_ICON, DIR_ICON};
use crate::core::render::TextReport;

/// One rendered line of the tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TreeLine {
    Dir {
        name: String,
        depth: usize,
    },
    File {
        name: String,
        depth: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        size: Option<u64>,
        category: FileCategory,
    },
    /// A directory whose listing could not be read
    Denied { depth: usize },
}

impl TreeLine {
    fn render(&self) -> String {
        match self {
            TreeLine::Dir { name, depth } => format!("{}{} {}/", indent(*depth), DIR_ICON, name),
            TreeLine::File {
                name,
                depth,
                size,
                category,
            } => match size {
                Some(size) => format!(
                    "{}{} {} ({})",
                    indent(*depth),
                    category.icon(),
                    name,
                    format_size(*size)
                ),
                None => format!("{}{} {}", indent(*depth), category.icon(), name),
            },
            TreeLine::Denied { depth } => {
                format!("{}{} Permission denied", indent(*depth), DENIED_ICON)
            }
        }
    }
}

fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}

/// Rendered project structure
#[derive(Debug, Clone, Serialize)]
pub struct TreeView {
    pub root: String,
    pub max_depth: usize,
    pub include_hidden: bool,
    pub lines: Vec<TreeLine>,
}

impl TextReport for TreeView {
    fn to_text(&self) -> String {
        self.lines
            .iter()
            .map(TreeLine::render)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Walk `root` down to `max_depth` levels. A depth of 0 renders nothing.
pub fn walk_tree(
    root: &Path,
    max_depth: usize,
    include_hidden: bool,
    config: &EngineConfig,
) -> TreeView {
    let mut lines = Vec::new();
    walk_level(root, max_depth, include_hidden, 0, config, &mut lines);

    TreeView {
        root: root.display().to_string(),
        max_depth,
        include_hidden,
        lines,
    }
}

fn walk_level(
    dir: &Path,
    max_depth: usize,
    include_hidden: bool,
    depth: usize,
    config: &EngineConfig,
    lines: &mut Vec<TreeLine>,
) {
    if depth >= max_depth {
        return;
    }

    let read_dir = match fs::read_dir(dir) {
        Ok(rd) => rd,
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            lines.push(TreeLine::Denied { depth });
            return;
        }
        Err(e) => {
            tracing::warn!(path = %dir.display(), error = %e, "cannot list directory");
            return;
        }
    };

    let mut entries: Vec<_> = read_dir
        .filter_map(|entry| entry.ok())
        .map(|entry| {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            (path.is_file(), name.to_lowercase(), name, path)
        })
        .collect();
    entries.sort_by(|a, b| (a.0, &a.1).cmp(&(b.0, &b.1)));

    for (_, _, name, path) in entries {
        if !include_hidden && is_hidden(&path) {
            continue;
        }

        if path.is_dir() {
            if config.is_excluded(&name) {
                continue;
            }
            lines.push(TreeLine::Dir { name, depth });
            if depth + 1 < max_depth {
                walk_level(&path, max_depth, include_hidden, depth + 1, config, lines);
            }
        } else {
            let size = fs::metadata(&path).ok().map(|m| m.len());
            let category = FileCategory::classify(&name, config);
            lines.push(TreeLine::File {
                name,
                depth,
                size,
                category,
            });
        }
    }
}
