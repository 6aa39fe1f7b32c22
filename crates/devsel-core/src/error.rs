// ── Core error types ──
//
// A missing state attribute is never an error; it routes like a falsy
// value. Errors only come from template expansion and from rule trees
// read out of files.

use thiserror::Error;

/// Failure while expanding a leaf template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("unresolved placeholder `{path}`")]
    Unresolved { path: String },

    #[error("cannot render template: {reason}")]
    Render { reason: String },
}

/// Failure of a full [`Applier`](crate::Applier) pass.
///
/// When this is returned nothing has been written to either root.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplyError {
    #[error("rule #{index} ({attribute}) failed: {source}")]
    Rule {
        index: usize,
        attribute: String,
        source: TemplateError,
    },
}

impl ApplyError {
    /// Attribute key of the failing rule.
    pub fn attribute(&self) -> &str {
        match self {
            Self::Rule { attribute, .. } => attribute,
        }
    }
}

/// A rule tree read from a file that the type system cannot express.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleFormatError {
    #[error("unsupported lookup key {found}: expected a string, integer, or boolean")]
    UnsupportedKey { found: String },

    #[error("duplicate lookup case `{key}` for attribute `{attr}`")]
    DuplicateCase { attr: String, key: String },
}
