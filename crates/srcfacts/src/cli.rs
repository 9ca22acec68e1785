use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "srcfacts", about = "Extract source file facts for static analysis", version)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress human-readable output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Extract facts for files under the given paths
    Extract {
        /// Fact database directory
        #[arg(long)]
        db: PathBuf,

        /// Extractor config file (TOML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Archive source text under this directory
        #[arg(long)]
        archive: Option<PathBuf>,

        /// Record the run as standalone
        #[arg(long, conflicts_with = "integrated")]
        standalone: bool,

        /// Record the run as integrated into a build
        #[arg(long)]
        integrated: bool,

        /// Path of the build's output artifact
        #[arg(long)]
        output: Option<String>,

        /// Only extract files whose name matches this glob (e.g. "*.cs")
        #[arg(long)]
        pattern: Option<String>,

        /// Files or directories to extract
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Print stored facts
    Dump {
        /// Fact database directory
        #[arg(long)]
        db: PathBuf,

        /// Only print this relation (files, folders, container_parent, num_lines, file_extraction_mode)
        #[arg(long)]
        relation: Option<String>,
    },

    /// Show per-relation fact counts
    Stats {
        /// Fact database directory
        #[arg(long)]
        db: PathBuf,
    },
}
