// ── Rule language ──
//
// A rule is an attribute key plus a decision tree. Trees are built once
// (in code or from a rule file) and never change afterwards.

pub mod builtin;
mod registry;
mod repr;

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::state::Root;

pub use registry::RuleRegistry;

// ── Subject ─────────────────────────────────────────────────────────

/// The attribute a decision node reads, optionally one level down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    attr: String,
    nested_under: Option<String>,
}

impl Subject {
    pub fn attr(attr: impl Into<String>) -> Self {
        Self {
            attr: attr.into(),
            nested_under: None,
        }
    }

    /// Read `attr` from the object stored under `parent`.
    pub fn nested(parent: impl Into<String>, attr: impl Into<String>) -> Self {
        Self {
            attr: attr.into(),
            nested_under: Some(parent.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.attr
    }

    pub fn nested_under(&self) -> Option<&str> {
        self.nested_under.as_deref()
    }
}

impl From<&str> for Subject {
    fn from(attr: &str) -> Self {
        Self::attr(attr)
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.nested_under {
            Some(parent) => write!(f, "{parent}.{}", self.attr),
            None => f.write_str(&self.attr),
        }
    }
}

// ── Lookup keys ─────────────────────────────────────────────────────

/// Exact-match key of a [`Lookup`] case.
///
/// Keys never coerce: `Text("1")` does not match the number `1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Text(String),
    Integer(i64),
    Flag(bool),
}

impl Key {
    /// The key an observed state value would be looked up under.
    pub fn of(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self::Text(s.clone())),
            Value::Number(n) => n.as_i64().map(Self::Integer),
            Value::Bool(b) => Some(Self::Flag(*b)),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Self::Text(s) => Value::String(s.clone()),
            Self::Integer(i) => Value::from(*i),
            Self::Flag(b) => Value::Bool(*b),
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for Key {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<bool> for Key {
    fn from(b: bool) -> Self {
        Self::Flag(b)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{s:?}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Flag(b) => write!(f, "{b}"),
        }
    }
}

// ── Tree nodes ──────────────────────────────────────────────────────

/// Terminal value of a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Leaf {
    /// Nothing should be written.
    Null,
    /// Template expanded by a [`Materializer`](crate::Materializer).
    Template(String),
}

/// Routes on the truthiness of its subject.
#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    pub subject: Subject,
    pub when_true: Box<Node>,
    pub when_false: Box<Node>,
}

/// Routes on the exact value of its subject.
#[derive(Debug, Clone, PartialEq)]
pub struct Lookup {
    pub subject: Subject,
    pub cases: IndexMap<Key, Node>,
    pub default: Box<Node>,
}

impl Lookup {
    /// The successor for an observed value; missing values take `default`.
    pub fn route(&self, observed: Option<&Value>) -> &Node {
        observed
            .and_then(Key::of)
            .and_then(|key| self.cases.get(&key))
            .unwrap_or(&self.default)
    }
}

/// A decision tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "repr::RawNode", into = "repr::RawNode")]
pub enum Node {
    Branch(Branch),
    Lookup(Lookup),
    Leaf(Leaf),
}

impl Node {
    pub fn branch(
        subject: impl Into<Subject>,
        when_true: impl Into<Node>,
        when_false: impl Into<Node>,
    ) -> Self {
        Self::Branch(Branch {
            subject: subject.into(),
            when_true: Box::new(when_true.into()),
            when_false: Box::new(when_false.into()),
        })
    }

    pub fn lookup<K, N>(
        subject: impl Into<Subject>,
        cases: impl IntoIterator<Item = (K, N)>,
        default: impl Into<Node>,
    ) -> Self
    where
        K: Into<Key>,
        N: Into<Node>,
    {
        Self::Lookup(Lookup {
            subject: subject.into(),
            cases: cases
                .into_iter()
                .map(|(k, n)| (k.into(), n.into()))
                .collect(),
            default: Box::new(default.into()),
        })
    }

    pub fn template(text: impl Into<String>) -> Self {
        Self::Leaf(Leaf::Template(text.into()))
    }

    pub fn null() -> Self {
        Self::Leaf(Leaf::Null)
    }

    /// Longest path from this node to a leaf, counting decision nodes.
    pub fn depth(&self) -> usize {
        match self {
            Self::Leaf(_) => 0,
            Self::Branch(b) => 1 + b.when_true.depth().max(b.when_false.depth()),
            Self::Lookup(l) => {
                1 + l
                    .cases
                    .values()
                    .map(Node::depth)
                    .max()
                    .unwrap_or(0)
                    .max(l.default.depth())
            }
        }
    }

    /// Number of leaves reachable from this node.
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Leaf(_) => 1,
            Self::Branch(b) => b.when_true.leaf_count() + b.when_false.leaf_count(),
            Self::Lookup(l) => {
                l.cases.values().map(Node::leaf_count).sum::<usize>() + l.default.leaf_count()
            }
        }
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Self::template(text)
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Self::template(text)
    }
}

impl From<Leaf> for Node {
    fn from(leaf: Leaf) -> Self {
        Self::Leaf(leaf)
    }
}

// ── Rule spec ───────────────────────────────────────────────────────

/// One display-attribute rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSpec {
    /// Attribute key written onto the target root.
    pub attribute: String,

    /// Root that receives the computed value.
    pub target: Root,

    /// Root the tree reads from. Defaults to `target`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<Root>,

    pub tree: Node,
}

impl RuleSpec {
    pub fn new(attribute: impl Into<String>, target: Root, tree: Node) -> Self {
        Self {
            attribute: attribute.into(),
            target,
            subject: None,
            tree,
        }
    }

    /// Read state from `root` instead of the target root.
    pub fn reading(mut self, root: Root) -> Self {
        self.subject = Some(root);
        self
    }

    pub fn subject_root(&self) -> Root {
        self.subject.unwrap_or(self.target)
    }
}
