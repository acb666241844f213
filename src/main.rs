//! pyscout - A read-only explorer for Python projects
//!
//! pyscout provides:
//! - Depth-limited project tree rendering
//! - Python source discovery and safe file reading
//! - Manifest parsing and import tallying
//! - Substring code search and a project overview
//! - The same operations as JSON-RPC tools over stdio (`pyscout serve`)

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod core;
mod engine;
mod server;

fn init_logging(cli: &cli::Cli) {
    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    // stdout carries reports and protocol messages
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();
}

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    init_logging(&cli);
    cli::run(cli)
}
