//! Rules command handler.

use serde::Serialize;
use tabled::Tabled;

use devsel_core::{Node, Root, RuleSpec};

use crate::error::CliError;
use crate::output;

use super::Context;

/// One registered rule, as listed.
#[derive(Debug, Serialize)]
struct RuleSummary<'a> {
    index: usize,
    attribute: &'a str,
    subject: Root,
    target: Root,
    depth: usize,
    leaves: usize,
    tree: &'a Node,
}

impl<'a> RuleSummary<'a> {
    fn new(index: usize, rule: &'a RuleSpec) -> Self {
        Self {
            index,
            attribute: &rule.attribute,
            subject: rule.subject_root(),
            target: rule.target,
            depth: rule.tree.depth(),
            leaves: rule.tree.leaf_count(),
            tree: &rule.tree,
        }
    }
}

#[derive(Tabled)]
struct RuleRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Attribute")]
    attribute: String,
    #[tabled(rename = "Reads")]
    subject: String,
    #[tabled(rename = "Writes")]
    target: String,
    #[tabled(rename = "Depth")]
    depth: usize,
    #[tabled(rename = "Leaves")]
    leaves: usize,
}

impl RuleRow {
    fn new(s: &RuleSummary<'_>, color: bool) -> Self {
        Self {
            index: s.index,
            attribute: s.attribute.to_owned(),
            subject: output::root_cell(s.subject, color),
            target: output::root_cell(s.target, color),
            depth: s.depth,
            leaves: s.leaves,
        }
    }
}

pub fn handle(ctx: &Context) -> Result<(), CliError> {
    let registry = devsel_config::load_registry(&ctx.config.rules)?;
    let summaries: Vec<RuleSummary<'_>> = registry
        .iter()
        .enumerate()
        .map(|(index, rule)| RuleSummary::new(index, rule))
        .collect();

    let out = output::render_list(
        ctx.output,
        &summaries,
        |s| RuleRow::new(s, ctx.color),
        |s| format!("{} {}.{}", s.index, s.target, s.attribute),
    )?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}
