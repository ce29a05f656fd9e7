//! Clap derive structures for the `jamfsync` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// jamfsync -- keep Jamf Pro device metadata in line with policy
#[derive(Debug, Parser)]
#[command(
    name = "jamfsync",
    version,
    about = "Reconcile Jamf Pro device metadata from the command line",
    long_about = "Walks a static group or the whole fleet, compares each device's\n\
        current state with what a policy wants, and writes only what differs.\n\n\
        Settings come from the config file and JAMF_* / JSS_* environment\n\
        variables; flags below override both.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file (default: platform config dir, e.g. ~/.config/jamfsync/config.toml)
    #[arg(long, env = "JAMFSYNC_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Jamf Pro server URL (overrides JAMF_URL)
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', global = true)]
    pub insecure: bool,

    /// PEM file with an extra CA certificate to trust
    #[arg(long, global = true)]
    pub ca_cert: Option<PathBuf>,

    /// Log file, truncated at the start of every run
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Output format for the run results
    #[arg(
        long,
        short = 'o',
        env = "JAMFSYNC_OUTPUT",
        default_value = "plain",
        global = true
    )]
    pub output: OutputFormat,

    /// Decide and report, but write nothing
    #[arg(long, short = 'n', global = true)]
    pub dry_run: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One line per device, then a summary (default)
    Plain,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Pretty table
    Table,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Unmanage computers in the configured static group and stamp the
    /// unmanaged date (and previous inventory date) attributes
    UnmanageComputers,

    /// Unmanage mobile devices in the configured static group and stamp
    /// the unmanaged date attribute
    UnmanageMobileDevices,

    /// Send the UnmanageDevice MDM command to every mobile device in the
    /// configured static group, in one call
    CommandUnmanageMobileDevices,

    /// Mirror each device's site name into a custom attribute
    SiteAttribute(SiteAttributeArgs),

    /// Record the newest supported macOS release in a custom attribute
    #[command(alias = "macos")]
    MacosSupported(ScopeArgs),

    /// Print the newest supported macOS release for model identifiers
    /// (offline, needs no configuration)
    Classify(ClassifyArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Subcommand Arguments ─────────────────────────────────────────────

/// Optional narrowing of a fleet-wide command to one static group.
#[derive(Debug, Args)]
pub struct ScopeArgs {
    /// Static group id (default: every device)
    #[arg(long, short = 'g')]
    pub group: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InventoryKind {
    Computer,
    Mobile,
}

#[derive(Debug, Args)]
pub struct SiteAttributeArgs {
    /// Which inventory to reconcile
    #[arg(long, value_enum, default_value = "computer")]
    pub kind: InventoryKind,

    #[command(flatten)]
    pub scope: ScopeArgs,
}

#[derive(Debug, Args)]
pub struct ClassifyArgs {
    /// Model identifiers, e.g. MacBookPro11,5
    #[arg(required = true)]
    pub models: Vec<String>,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
