//! Command dispatch: resolves configuration, then hands off to handlers.

pub mod apply;
pub mod config_cmd;
pub mod rules;

use clap::ValueEnum;

use devsel_config::Config;

use crate::cli::{Command, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

/// Settings every handler sees: the layered config with flag overrides
/// folded in.
#[derive(Debug)]
pub struct Context {
    pub config: Config,
    pub output: OutputFormat,
    pub color: bool,
    pub quiet: bool,
}

impl Context {
    /// Load config (defaults, file, `DEVSEL_*` env) and apply the global
    /// flags on top.
    pub fn resolve(global: &GlobalOpts) -> Result<Self, CliError> {
        let mut config = devsel_config::load_config(global.config.as_deref())?;
        if let Some(ref path) = global.rules {
            config.rules.file = Some(path.clone());
        }
        if global.no_builtin {
            config.rules.builtin = false;
        }

        let output = match global.output {
            Some(format) => format,
            None => OutputFormat::from_str(&config.output, true).map_err(|reason| {
                CliError::Validation {
                    field: "output".into(),
                    reason,
                }
            })?,
        };

        Ok(Self {
            config,
            output,
            color: output::should_color(global.color),
            quiet: global.quiet,
        })
    }
}

/// Dispatch a command that needs configuration to its handler.
pub fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    let ctx = Context::resolve(global)?;
    tracing::debug!(command = ?cmd, output = ?ctx.output, "dispatching command");

    match cmd {
        Command::Apply(args) => apply::handle(&args, &ctx),
        Command::Rules => rules::handle(&ctx),
        Command::Config(args) => config_cmd::handle(&args, &ctx, global),
        // Completions are generated before any config is loaded
        Command::Completions(_) => unreachable!(),
    }
}
