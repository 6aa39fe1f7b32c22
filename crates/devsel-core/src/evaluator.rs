// ── Tree evaluator ──
//
// Walks a rule tree against borrowed state. A node's `nested_under`
// only re-targets that node's own read; children start again from the
// subject root.

use tracing::trace;

use crate::error::TemplateError;
use crate::rule::{Leaf, Node, Subject};
use crate::state::{Root, Scope, StateRoot, is_truthy};
use crate::template::{Materializer, Placeholders, TemplateScope};

/// Resolves rule trees to display values.
#[derive(Debug, Clone, Default)]
pub struct Evaluator<M = Placeholders> {
    materializer: M,
}

impl<M: Materializer> Evaluator<M> {
    pub fn new(materializer: M) -> Self {
        Self { materializer }
    }

    pub fn materializer(&self) -> &M {
        &self.materializer
    }

    /// Resolve `node` with `subject_root` as the starting subject.
    ///
    /// Returns `Ok(None)` for a null leaf. Missing attributes route like
    /// falsy values, so the only failure is template expansion.
    pub fn resolve(
        &self,
        node: &Node,
        scope: Scope<'_>,
        subject_root: Root,
    ) -> Result<Option<String>, TemplateError> {
        self.walk(node, scope, subject_root, scope.root(subject_root))
    }

    fn walk<'a>(
        &self,
        node: &Node,
        scope: Scope<'a>,
        subject_root: Root,
        current: &'a StateRoot,
    ) -> Result<Option<String>, TemplateError> {
        match node {
            Node::Leaf(Leaf::Null) => Ok(None),
            Node::Leaf(Leaf::Template(template)) => self
                .materializer
                .expand(template, &TemplateScope::new(scope, current))
                .map(Some),
            Node::Branch(branch) => {
                let (subject, observed) = read(scope, subject_root, &branch.subject);
                let truthy = is_truthy(observed);
                trace!(subject = %branch.subject, truthy, "branch");
                let next = if truthy {
                    &branch.when_true
                } else {
                    &branch.when_false
                };
                self.walk(next, scope, subject_root, subject.unwrap_or(current))
            }
            Node::Lookup(lookup) => {
                let (subject, observed) = read(scope, subject_root, &lookup.subject);
                trace!(subject = %lookup.subject, ?observed, "lookup");
                let next = lookup.route(observed);
                self.walk(next, scope, subject_root, subject.unwrap_or(current))
            }
        }
    }
}

/// The object a node reads from and the value it observes there.
fn read<'a>(
    scope: Scope<'a>,
    root: Root,
    subject: &Subject,
) -> (Option<&'a StateRoot>, Option<&'a serde_json::Value>) {
    let object = scope.subject(root, subject.nested_under());
    (object, object.and_then(|o| o.get(subject.name())))
}
