//! CLI parse: clap types for plantree. No behavior; definitions only.

use crate::tree::RevisitPolicy;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// plantree - compile temporal plans into behaviour trees
#[derive(Debug, Parser)]
#[command(name = "plantree")]
#[command(about = "Compile time-stamped plans into behaviour-tree XML")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory (where config/ lives)
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long)]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stderr, stdout, file, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes a file)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compile a plan into a behaviour tree
    Compile {
        /// Plan file (.json, or planner text output)
        plan: PathBuf,
        /// Domain file (.json or .toml); defaults to inputs.domain_file
        #[arg(long)]
        domain: Option<PathBuf>,
        /// Write the tree to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// What to do when a node is reached twice (skip, expand)
        #[arg(long)]
        revisit: Option<RevisitPolicy>,
        /// Fail when requirements stay unsatisfied
        #[arg(long)]
        strict: bool,
        /// Print the BLAKE3 digest of the tree instead of the tree
        #[arg(long)]
        digest: bool,
    },
    /// Show execution levels and resolved links
    Levels {
        /// Plan file (.json, or planner text output)
        plan: PathBuf,
        /// Domain file (.json or .toml); defaults to inputs.domain_file
        #[arg(long)]
        domain: Option<PathBuf>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Validate configuration and, if given, a domain file
    Validate {
        /// Domain file (.json or .toml); defaults to inputs.domain_file
        #[arg(long)]
        domain: Option<PathBuf>,
    },
}
