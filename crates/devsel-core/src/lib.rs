//! Display-attribute rules for device selector buttons.
//!
//! A device selector button shows a connection to a hardware device. Its
//! state, CSS class, image, title, and displayed IP address all depend on
//! combinations of device and connection state. Those combinations live in
//! small declarative decision trees instead of attribute-specific code:
//!
//! - **[`RuleRegistry`]**: Ordered list of [`RuleSpec`]s. Each rule binds an
//!   attribute key, a [`Node`] tree, the [`Root`] the tree reads from, and
//!   the [`Root`] that receives the computed value. [`builtin::registry()`]
//!   holds the stock device-selector rules.
//!
//! - **[`Evaluator`]**: Walks a tree against a [`Scope`] (the device and
//!   connection roots) and resolves it to `None` or a materialized string.
//!   Evaluation only ever borrows state.
//!
//! - **[`Materializer`]**: Expands leaf templates. The default
//!   [`Placeholders`] implementation renders them as strict handlebars
//!   templates over `device`, `connection`, and `current`.
//!
//! - **[`Applier`]**: Resolves every rule in registration order, drops
//!   `None` and empty results, and writes the rest onto the target roots.
//!   A failing rule aborts the pass before anything is written.

pub mod applier;
pub mod error;
pub mod evaluator;
pub mod rule;
pub mod state;
pub mod template;

// ── Primary re-exports ──────────────────────────────────────────────
pub use applier::{Applier, Assignment};
pub use error::{ApplyError, RuleFormatError, TemplateError};
pub use evaluator::Evaluator;
pub use rule::builtin;
pub use rule::{Branch, Key, Leaf, Lookup, Node, RuleRegistry, RuleSpec, Subject};
pub use state::{CONNECTION_LINK, Root, Scope, StateRoot, is_truthy};
pub use template::{Materializer, Placeholders, TemplateScope};
