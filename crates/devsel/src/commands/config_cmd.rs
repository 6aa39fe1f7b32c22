//! Config subcommand handlers.

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::Context;

pub fn handle(args: &ConfigArgs, ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let rendered = devsel_config::to_toml(&ctx.config)?;
            let out = output::render_single(
                ctx.output,
                &ctx.config,
                |_| rendered.trim_end().to_owned(),
                |_| rendered.trim_end().to_owned(),
            )?;
            output::print_output(&out, ctx.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            let path = global
                .config
                .clone()
                .unwrap_or_else(devsel_config::config_path);
            output::print_output(&path.display().to_string(), ctx.quiet);
            Ok(())
        }
    }
}
