use serde::{Deserialize, Serialize};

use super::RuleSpec;

/// Ordered collection of rules.
///
/// Rules are evaluated in registration order. There is no removal API;
/// build the registry once, then share it (`Arc` or `&'static`).
///
/// Deserializes from a rule file with a top-level `rule` array:
///
/// ```toml
/// [[rule]]
/// attribute = "button_state"
/// target = "connection"
/// tree = { attr = "isEnabled", when_true = "", when_false = "disabled" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleRegistry {
    #[serde(rename = "rule", default)]
    rules: Vec<RuleSpec>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule after every rule registered so far.
    pub fn register(&mut self, spec: RuleSpec) {
        tracing::trace!(attribute = %spec.attribute, target = %spec.target, "registering rule");
        self.rules.push(spec);
    }

    pub fn rules(&self) -> &[RuleSpec] {
        &self.rules
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RuleSpec> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Extend<RuleSpec> for RuleRegistry {
    fn extend<I: IntoIterator<Item = RuleSpec>>(&mut self, iter: I) {
        for spec in iter {
            self.register(spec);
        }
    }
}

impl FromIterator<RuleSpec> for RuleRegistry {
    fn from_iter<I: IntoIterator<Item = RuleSpec>>(iter: I) -> Self {
        let mut registry = Self::new();
        registry.extend(iter);
        registry
    }
}

impl IntoIterator for RuleRegistry {
    type Item = RuleSpec;
    type IntoIter = std::vec::IntoIter<RuleSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.into_iter()
    }
}

impl<'a> IntoIterator for &'a RuleRegistry {
    type Item = &'a RuleSpec;
    type IntoIter = std::slice::Iter<'a, RuleSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
