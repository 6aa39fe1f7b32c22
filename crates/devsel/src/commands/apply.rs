//! Apply command handler.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tabled::Tabled;

use devsel_core::applier::commit;
use devsel_core::{Applier, Assignment, Root, StateRoot};

use crate::cli::ApplyArgs;
use crate::error::CliError;
use crate::output;

use super::Context;

/// Path argument that reads state from stdin.
const STDIN: &str = "-";

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct AssignmentRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Attribute")]
    attribute: String,
    #[tabled(rename = "Value")]
    value: String,
}

impl AssignmentRow {
    fn new(a: &Assignment, color: bool) -> Self {
        Self {
            index: a.index,
            target: output::root_cell(a.target, color),
            attribute: a.attribute.clone(),
            value: a.value.clone(),
        }
    }
}

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Root")]
    root: String,
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Value")]
    value: String,
}

/// Both roots after the assignments were written.
#[derive(Debug, Serialize)]
struct StateView {
    device: StateRoot,
    connection: StateRoot,
}

impl StateView {
    fn fields(&self) -> impl Iterator<Item = (Root, &String, &Value)> {
        let device = self.device.iter().map(|(k, v)| (Root::Device, k, v));
        let connection = self.connection.iter().map(|(k, v)| (Root::Connection, k, v));
        device.chain(connection)
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: &ApplyArgs, ctx: &Context) -> Result<(), CliError> {
    let mut device = read_state(&args.device)?;
    let mut connection = match args.connection {
        Some(ref path) => read_state(path)?,
        None => StateRoot::new(),
    };

    let registry = devsel_config::load_registry(&ctx.config.rules)?;
    let applier = Applier::new(Arc::new(registry));
    let plan = applier.plan(&device, &connection)?;
    tracing::info!(
        rules = applier.registry().len(),
        assignments = plan.len(),
        "rules evaluated"
    );

    let out = if args.state {
        commit(plan, &mut device, &mut connection);
        let view = StateView { device, connection };
        output::render_single(
            ctx.output,
            &view,
            |v| {
                let rows: Vec<FieldRow> = v
                    .fields()
                    .map(|(root, key, value)| FieldRow {
                        root: output::root_cell(root, ctx.color),
                        key: key.clone(),
                        value: display_value(value),
                    })
                    .collect();
                output::render_table(&rows)
            },
            |v| {
                v.fields()
                    .map(|(root, key, value)| format!("{root}.{key}={}", display_value(value)))
                    .collect::<Vec<_>>()
                    .join("\n")
            },
        )?
    } else {
        output::render_list(
            ctx.output,
            &plan,
            |a| AssignmentRow::new(a, ctx.color),
            |a| format!("{}.{}={}", a.target, a.attribute, a.value),
        )?
    };

    output::print_output(&out, ctx.quiet);
    Ok(())
}

// ── Helpers ─────────────────────────────────────────────────────────

/// Read a state root from a JSON file, or stdin for `-`.
fn read_state(path: &Path) -> Result<StateRoot, CliError> {
    let text = if path == Path::new(STDIN) {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf).map(|_| buf)
    } else {
        std::fs::read_to_string(path)
    }
    .map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let value: Value = serde_json::from_str(&text).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(CliError::NotAnObject {
            path: path.to_path_buf(),
            found: json_kind(&other),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Strings print bare; everything else prints as JSON.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
