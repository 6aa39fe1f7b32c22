//! CLI error types with miette diagnostics.
//!
//! Maps config and rule evaluation failures into user-facing errors with
//! actionable help text.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use devsel_config::ConfigError;
use devsel_core::ApplyError;

use crate::cli::OutputFormat;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONFIG: i32 = 3;
    pub const INPUT: i32 = 4;
    pub const EVALUATION: i32 = 5;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(devsel::config),
        help(
            "Check the config file, the DEVSEL_* environment variables, and any --rules file.\n\
             Run: devsel config show"
        )
    )]
    Config(#[from] ConfigError),

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(devsel::validation))]
    Validation { field: String, reason: String },

    // ── Input state ──────────────────────────────────────────────────
    #[error("Cannot read {}", .path.display())]
    #[diagnostic(code(devsel::io))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {}", .path.display())]
    #[diagnostic(
        code(devsel::json),
        help("Check the JSON file contents and try again.")
    )]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{} must hold a JSON object, found {found}", .path.display())]
    #[diagnostic(
        code(devsel::not_an_object),
        help("Device and connection state are JSON objects such as {{\"typeStr\": \"T7\"}}.")
    )]
    NotAnObject { path: PathBuf, found: &'static str },

    // ── Evaluation ───────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(devsel::evaluation),
        help(
            "A rule template references a field the state does not provide.\n\
             Nothing was written. Run: devsel rules"
        )
    )]
    Apply(#[from] ApplyError),

    // ── Output ───────────────────────────────────────────────────────
    #[error("Failed to render {format:?} output: {reason}")]
    #[diagnostic(code(devsel::render))]
    Render {
        format: OutputFormat,
        reason: String,
    },
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Validation { .. } => exit_code::USAGE,
            Self::Config(_) => exit_code::CONFIG,
            Self::Read { .. } | Self::Json { .. } | Self::NotAnObject { .. } => exit_code::INPUT,
            Self::Apply(_) => exit_code::EVALUATION,
            Self::Render { .. } => exit_code::GENERAL,
        }
    }
}
