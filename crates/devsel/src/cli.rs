//! Clap derive structures for the `devsel` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// devsel -- compute device selector display attributes
#[derive(Debug, Parser)]
#[command(
    name = "devsel",
    version,
    about = "Compute device selector display attributes from device state",
    long_about = "Evaluates a registry of decision-tree rules against a device state\n\
        object and its connection state object, and writes the resulting\n\
        display attributes (button state, class, image, title) back onto them.",
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
    /// Output format (defaults to the `output` config key)
    #[arg(long, short = 'o', global = true)]
    pub output: Option<OutputFormat>,

    /// Config file to load instead of the platform default
    #[arg(long, env = "DEVSEL_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Extra rule file (TOML or JSON), appended after the built-in rules
    #[arg(long, short = 'r', global = true)]
    pub rules: Option<PathBuf>,

    /// Do not load the built-in device selector rules
    #[arg(long, global = true)]
    pub no_builtin: bool,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one `root.attribute=value` per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the rules against a device and its connection
    #[command(alias = "a")]
    Apply(ApplyArgs),

    /// List the registered rules in evaluation order
    #[command(alias = "ls")]
    Rules,

    /// Inspect the resolved configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Apply ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// Device state as a JSON object (`-` reads stdin)
    #[arg(long, short = 'd')]
    pub device: PathBuf,

    /// Connection state as a JSON object (empty when omitted)
    #[arg(long, short = 'c')]
    pub connection: Option<PathBuf>,

    /// Print the updated device and connection objects instead of the
    /// computed attributes
    #[arg(long)]
    pub state: bool,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display the resolved configuration (file + environment + flags)
    Show,

    /// Print the config file path
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
