//! CLI definition for the `cguard` command-line interface.
//!
//! Depends only on `clap` and `std`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Component kind as accepted on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum TypeArg {
    /// Sub-agent definition
    Agent,
    /// Slash command
    Command,
    /// MCP server definition
    Mcp,
    /// Settings fragment
    Setting,
    /// Hook definition
    Hook,
}

/// Policy flags shared by `validate` and `scan`. Each flag only turns a
/// check on; configuration decides the rest.
#[derive(Args, Debug, Clone, Default)]
pub struct CheckArgs {
    /// Treat suspicious phrasing as errors
    #[arg(long)]
    pub strict: bool,
    /// Treat plaintext http:// URLs as errors
    #[arg(long)]
    pub strict_https: bool,
    /// Request URL accessibility checks (reported, not performed)
    #[arg(long)]
    pub check_accessibility: bool,
    /// Record content hashes in the hash registry
    #[arg(long)]
    pub update_registry: bool,
    /// Warn when git history is unavailable
    #[arg(long)]
    pub require_git: bool,
    /// Fail components with no declared author
    #[arg(long)]
    pub require_author: bool,
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// cguard - validate marketplace components before installation
#[derive(Parser, Debug)]
#[command(name = "cguard")]
#[command(version)]
#[command(about = "Component Guard - structural and security validation for components")]
pub struct Cli {
    /// Enable debug output to stderr
    #[arg(short, long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate component files or directories
    Validate {
        /// Files or directories to validate
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Component type (inferred from the path when omitted)
        #[arg(long = "type", short = 't', value_enum)]
        component_type: Option<TypeArg>,
        /// Fail if the content hash differs from this value
        #[arg(long)]
        expected_hash: Option<String>,
        #[command(flatten)]
        checks: CheckArgs,
    },
    /// Discover and validate every component under a catalogue directory
    Scan {
        /// Catalogue root (contains agents/, commands/, ...)
        dir: PathBuf,
        #[command(flatten)]
        checks: CheckArgs,
    },
    /// Print the SHA-256 content hash of a file
    Hash {
        /// File to hash
        path: PathBuf,
    },
}
