//! CLI module - Command-line interface definitions and handlers

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::core::config::{EngineConfig, DEFAULT_MAX_FILE_SIZE};
use crate::core::render::{OutputFormat, RenderConfig, Renderer, TextReport};
use crate::engine::Engine;

/// pyscout - explore a Python project: tree, files, dependencies, imports and search.
#[derive(Parser, Debug)]
#[command(name = "pyscout")]
#[command(
    author,
    version,
    about,
    long_about = r#"pyscout answers questions about a Python project on disk without modifying it.

Every command reads the project under ROOT and prints a self-contained report.
`pyscout serve` keeps a session open and answers the same questions as JSON-RPC
tools over stdin/stdout, for AI agents and automation clients.

Output formats:
- text: human-readable report (default)
- json: the same report as structured JSON

Examples:
    pyscout info
    pyscout tree --max-depth 2
    pyscout deps
    pyscout search "TODO" --file-pattern "test_*.py"
    pyscout --root ~/src/project serve
"#
)]
pub struct Cli {
    /// Project root directory.
    #[arg(
        long,
        global = true,
        env = "PYSCOUT_ROOT",
        value_name = "ROOT",
        long_help = "Project root directory (defaults to the current directory).\n\n\
All paths in reports are relative to this root. For `serve`, the root is only\n\
pre-configured when given; clients can set it with the set_project_root tool."
    )]
    pub root: Option<PathBuf>,

    /// Output format (text/json).
    #[arg(
        long,
        global = true,
        default_value = "text",
        value_name = "FORMAT",
        long_help = "Select the output format.\n\n\
Supported values:\n\
- text (default)\n\
- json"
    )]
    pub format: String,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Maximum size of a file that will be read, in bytes.
    #[arg(
        long,
        global = true,
        env = "PYSCOUT_MAX_FILE_SIZE",
        default_value_t = DEFAULT_MAX_FILE_SIZE,
        value_name = "BYTES",
        long_help = "Maximum size of a file that will be read, in bytes.\n\n\
Larger files are refused by `read` and skipped (with a warning) by bulk commands."
    )]
    pub max_file_size: u64,

    /// Quiet mode (errors only on stderr).
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug diagnostics on stderr).
    #[arg(
        short,
        long,
        global = true,
        long_help = "Enable debug diagnostics on stderr. RUST_LOG, when set, takes precedence."
    )]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate the project root and report Python project indicators.
    #[command(
        long_about = "Resolve ROOT and report what marks it as a Python project: source files in\n\
the root, recognized manifests and top-level packages.\n\n\
Example:\n\
  pyscout --root ~/src/project root\n"
    )]
    Root,

    /// Render the directory tree.
    #[command(
        long_about = "Render the project tree down to a depth limit. Directories come first at\n\
each level; build artifacts, caches, virtual environments and VCS metadata are skipped.\n\n\
Examples:\n\
  pyscout tree\n\
  pyscout tree --max-depth 1 --hidden\n"
    )]
    Tree {
        /// Number of levels to render.
        #[arg(long, default_value = "3", value_name = "N")]
        max_depth: usize,

        /// Include hidden files and directories (dotfiles).
        #[arg(long)]
        hidden: bool,
    },

    /// Print one file.
    #[command(
        long_about = "Print a file relative to ROOT (or an absolute path inside it).\n\n\
Files over --max-file-size are refused; non-UTF-8 files are decoded as Latin-1.\n\n\
Example:\n\
  pyscout read pkg/models.py\n"
    )]
    Read {
        /// File path (relative to ROOT unless absolute).
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// List Python source files.
    #[command(
        long_about = r#"List every Python source file (.py, .pyx, .pyi) under ROOT in sorted order.

Examples:
    pyscout files
    pyscout files --pattern "test_*.py"
    pyscout files --no-tests
"#
    )]
    Files {
        /// Shell-style wildcard matched against file names.
        #[arg(long, value_name = "GLOB")]
        pattern: Option<String>,

        /// Drop files with any path component starting with "test".
        #[arg(long)]
        no_tests: bool,
    },

    /// Analyze declared dependencies and imports.
    #[command(
        long_about = "List dependencies declared in requirements files, pyproject.toml and\n\
setup.py/setup.cfg, and tally the modules imported by source files.\n\n\
Example:\n\
  pyscout deps --no-imports\n"
    )]
    Deps {
        /// Skip the import tally.
        #[arg(long)]
        no_imports: bool,
    },

    /// Search source files for text.
    #[command(
        long_about = r#"Find lines in Python source files that contain QUERY (plain substring,
case-insensitive by default). The first 50 matches are shown; the total is exact.

Examples:
    pyscout search TODO
    pyscout search "def main" --case-sensitive
    pyscout search fixture --file-pattern "conftest.py"
"#
    )]
    Search {
        /// Text to search for.
        #[arg(value_name = "QUERY")]
        query: String,

        /// Match case exactly.
        #[arg(long)]
        case_sensitive: bool,

        /// Shell-style wildcard restricting which files are searched.
        #[arg(long, value_name = "GLOB")]
        file_pattern: Option<String>,
    },

    /// Print a consolidated project overview.
    #[command(
        long_about = "Summarize the project: source file count, packages, manifests present,\n\
documentation files and the number of declared dependencies.\n\n\
Example:\n\
  pyscout info\n"
    )]
    Info,

    /// Serve tools and resources as JSON-RPC over stdio.
    #[command(
        long_about = "Run a line-delimited JSON-RPC 2.0 session on stdin/stdout exposing the\n\
tools set_project_root, explore_project_structure, read_file, find_python_files,\n\
analyze_dependencies, search_code and get_project_info, plus the resources\n\
project://overview and file://<path>.\n\n\
Logs go to stderr so stdout carries only protocol messages.\n\n\
Example:\n\
  pyscout serve\n"
    )]
    Serve,
}

fn print_report<T: serde::Serialize + TextReport>(renderer: &Renderer, report: &T) -> Result<()> {
    renderer.render_to(report, std::io::stdout().lock())?;
    Ok(())
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    let format: OutputFormat = cli.format.parse().unwrap_or_default();
    let renderer = Renderer::with_config(RenderConfig::with_pretty(format, cli.pretty));

    let config = EngineConfig::default().with_max_file_size(cli.max_file_size);
    let mut engine = Engine::new(config);
    let root = cli.root.clone().unwrap_or_else(|| PathBuf::from("."));

    match cli.command {
        Commands::Serve => {
            if let Some(root) = &cli.root {
                engine.set_root(root)?;
            }
            crate::server::run_serve(engine)
        }

        Commands::Root => print_report(&renderer, &engine.set_root(&root)?),

        Commands::Tree { max_depth, hidden } => {
            engine.set_root(&root)?;
            print_report(&renderer, &engine.explore_structure(max_depth, hidden)?)
        }

        Commands::Read { file } => {
            engine.set_root(&root)?;
            print_report(&renderer, &engine.read_file(&file)?)
        }

        Commands::Files { pattern, no_tests } => {
            engine.set_root(&root)?;
            print_report(
                &renderer,
                &engine.find_source_files(pattern.as_deref(), !no_tests)?,
            )
        }

        Commands::Deps { no_imports } => {
            engine.set_root(&root)?;
            print_report(&renderer, &engine.analyze_dependencies(!no_imports)?)
        }

        Commands::Search {
            query,
            case_sensitive,
            file_pattern,
        } => {
            engine.set_root(&root)?;
            print_report(
                &renderer,
                &engine.search(&query, case_sensitive, file_pattern.as_deref())?,
            )
        }

        Commands::Info => {
            engine.set_root(&root)?;
            print_report(&renderer, &engine.overview()?)
        }
    }
}
