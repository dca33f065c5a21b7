use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "doxy-search")]
#[command(about = "Read, validate and query Doxygen search index files", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to the per-user config.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Skip the on-disk parse cache
    #[arg(long, global = true)]
    pub no_cache: bool,
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a chunk file, a search directory, or a documentation tree
    Check {
        path: PathBuf,
        /// Require every url to carry an #anchor
        #[arg(long)]
        require_anchor: bool,
        /// Emit reports as JSON
        #[arg(long)]
        json: bool,
    },
    /// Look a symbol up
    Get {
        path: PathBuf,
        symbol: String,
        #[arg(short, long)]
        section: Option<String>,
        /// SYMBOL is already an escaped key (e.g. operator_3d)
        #[arg(long)]
        raw_key: bool,
    },
    /// Print a chunk file as JSON or in normalized generator layout
    Dump {
        path: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// List sections from searchdata.js
    Sections { path: PathBuf },
}
