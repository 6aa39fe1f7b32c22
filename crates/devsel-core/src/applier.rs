// ── Attribute applier ──
//
// Resolves every rule against one device/connection pair, then writes
// the non-empty results. Resolution finishes before the first write, so
// a failing rule leaves both roots untouched.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ApplyError;
use crate::evaluator::Evaluator;
use crate::rule::{RuleRegistry, builtin};
use crate::state::{Root, Scope, StateRoot};
use crate::template::{Materializer, Placeholders};

/// One attribute write produced by a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    /// Position of the producing rule in the registry.
    pub index: usize,
    pub attribute: String,
    pub target: Root,
    pub value: String,
}

/// Applies a rule registry to device/connection pairs.
#[derive(Debug, Clone)]
pub struct Applier<M = Placeholders> {
    registry: Arc<RuleRegistry>,
    evaluator: Evaluator<M>,
}

impl Applier<Placeholders> {
    pub fn new(registry: Arc<RuleRegistry>) -> Self {
        Self::with_materializer(registry, Placeholders)
    }

    /// Applier over the built-in device selector rules.
    pub fn builtin() -> Self {
        Self::new(builtin::shared())
    }
}

impl<M: Materializer> Applier<M> {
    pub fn with_materializer(registry: Arc<RuleRegistry>, materializer: M) -> Self {
        Self {
            registry,
            evaluator: Evaluator::new(materializer),
        }
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Resolve every rule without writing anything.
    ///
    /// Null and empty results are dropped. The returned assignments are in
    /// registration order; later assignments to the same key win.
    pub fn plan(
        &self,
        device: &StateRoot,
        connection: &StateRoot,
    ) -> Result<Vec<Assignment>, ApplyError> {
        let scope = Scope::new(device, connection);
        let mut plan = Vec::with_capacity(self.registry.len());

        for (index, rule) in self.registry.iter().enumerate() {
            let resolved = self
                .evaluator
                .resolve(&rule.tree, scope, rule.subject_root())
                .map_err(|source| {
                    warn!(index, attribute = %rule.attribute, error = %source, "rule failed");
                    ApplyError::Rule {
                        index,
                        attribute: rule.attribute.clone(),
                        source,
                    }
                })?;

            match resolved {
                Some(value) if !value.is_empty() => {
                    debug!(
                        index,
                        attribute = %rule.attribute,
                        target = %rule.target,
                        %value,
                        "rule resolved"
                    );
                    plan.push(Assignment {
                        index,
                        attribute: rule.attribute.clone(),
                        target: rule.target,
                        value,
                    });
                }
                _ => debug!(index, attribute = %rule.attribute, "rule resolved to no value"),
            }
        }

        Ok(plan)
    }

    /// Resolve every rule and write the results onto their target roots.
    ///
    /// Attributes whose rule resolves to null or `""` keep their previous
    /// value (or stay absent). On error nothing is written.
    pub fn apply(
        &self,
        device: &mut StateRoot,
        connection: &mut StateRoot,
    ) -> Result<(), ApplyError> {
        let plan = self.plan(device, connection)?;
        commit(plan, device, connection);
        Ok(())
    }
}

/// Write planned assignments in order.
pub fn commit(plan: Vec<Assignment>, device: &mut StateRoot, connection: &mut StateRoot) {
    for assignment in plan {
        let root = match assignment.target {
            Root::Device => &mut *device,
            Root::Connection => &mut *connection,
        };
        root.insert(assignment.attribute, Value::String(assignment.value));
    }
}
