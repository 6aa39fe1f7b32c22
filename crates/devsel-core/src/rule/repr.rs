// ── Serialized tree shape ──
//
// Rule files describe nodes structurally: a string is a template leaf,
// `null` is a null leaf, a table with `when_true`/`when_false` is a
// branch, and a table with `cases`/`default` is a lookup.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Branch, Key, Leaf, Lookup, Node, Subject};
use crate::error::RuleFormatError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNode {
    Null,
    Template(String),
    Branch(RawBranch),
    Lookup(RawLookup),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawBranch {
    attr: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    nested_under: Option<String>,
    when_true: Box<RawNode>,
    when_false: Box<RawNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawLookup {
    attr: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    nested_under: Option<String>,
    #[serde(default)]
    cases: Vec<RawCase>,
    default: Box<RawNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawCase {
    when: Value,
    then: RawNode,
}

fn subject(attr: String, nested_under: Option<String>) -> Subject {
    Subject { attr, nested_under }
}

impl TryFrom<RawNode> for Node {
    type Error = RuleFormatError;

    fn try_from(raw: RawNode) -> Result<Self, Self::Error> {
        match raw {
            RawNode::Null => Ok(Self::Leaf(Leaf::Null)),
            RawNode::Template(text) => Ok(Self::Leaf(Leaf::Template(text))),
            RawNode::Branch(b) => Ok(Self::Branch(Branch {
                subject: subject(b.attr, b.nested_under),
                when_true: Box::new(Self::try_from(*b.when_true)?),
                when_false: Box::new(Self::try_from(*b.when_false)?),
            })),
            RawNode::Lookup(l) => {
                let subject = subject(l.attr, l.nested_under);
                let mut cases = IndexMap::with_capacity(l.cases.len());
                for case in l.cases {
                    let key =
                        Key::of(&case.when).ok_or_else(|| RuleFormatError::UnsupportedKey {
                            found: case.when.to_string(),
                        })?;
                    let node = Self::try_from(case.then)?;
                    if cases.contains_key(&key) {
                        return Err(RuleFormatError::DuplicateCase {
                            attr: subject.to_string(),
                            key: key.to_string(),
                        });
                    }
                    cases.insert(key, node);
                }
                Ok(Self::Lookup(Lookup {
                    subject,
                    cases,
                    default: Box::new(Self::try_from(*l.default)?),
                }))
            }
        }
    }
}

impl From<Node> for RawNode {
    fn from(node: Node) -> Self {
        match node {
            Node::Leaf(Leaf::Null) => Self::Null,
            Node::Leaf(Leaf::Template(text)) => Self::Template(text),
            Node::Branch(b) => Self::Branch(RawBranch {
                attr: b.subject.attr,
                nested_under: b.subject.nested_under,
                when_true: Box::new((*b.when_true).into()),
                when_false: Box::new((*b.when_false).into()),
            }),
            Node::Lookup(l) => Self::Lookup(RawLookup {
                attr: l.subject.attr,
                nested_under: l.subject.nested_under,
                cases: l
                    .cases
                    .into_iter()
                    .map(|(key, node)| RawCase {
                        when: key.to_value(),
                        then: node.into(),
                    })
                    .collect(),
                default: Box::new((*l.default).into()),
            }),
        }
    }
}
