// ── Leaf template expansion ──
//
// Leaves are handlebars templates rendered in strict mode:
// `{{ root.path }}` is HTML-escaped and `{{{ root.path }}}` is raw.
// `root` is `device`, `connection`, or `current`, the object the last
// decision node read from. `device.connection` reaches the connection
// root.

use std::sync::LazyLock;

use handlebars::{Handlebars, RenderError, RenderErrorReason};
use serde_json::{Map, Value};

use crate::error::TemplateError;
use crate::state::{CONNECTION_LINK, Scope, StateRoot};

/// Expands the placeholders of a leaf template.
///
/// Implementations must be pure: the same template and scope always give
/// the same result. A template without placeholders comes back unchanged,
/// and a placeholder that cannot be resolved is an error, never an empty
/// substitution.
pub trait Materializer {
    fn expand(&self, template: &str, scope: &TemplateScope<'_>) -> Result<String, TemplateError>;
}

impl<M: Materializer + ?Sized> Materializer for &M {
    fn expand(&self, template: &str, scope: &TemplateScope<'_>) -> Result<String, TemplateError> {
        (**self).expand(template, scope)
    }
}

/// Names visible to a leaf template.
#[derive(Debug, Clone, Copy)]
pub struct TemplateScope<'a> {
    state: Scope<'a>,
    current: &'a StateRoot,
}

impl<'a> TemplateScope<'a> {
    pub fn new(state: Scope<'a>, current: &'a StateRoot) -> Self {
        Self { state, current }
    }

    pub fn current(&self) -> &'a StateRoot {
        self.current
    }

    /// The render context: `device` (with the connection linked in),
    /// `connection`, and `current`.
    ///
    /// `null` and array values are left out, so strict rendering reports
    /// a placeholder that names one as unresolved.
    pub fn context(&self) -> Value {
        let connection = renderable(self.state.connection());
        let mut device = renderable(self.state.device());
        device.insert(CONNECTION_LINK.to_owned(), Value::Object(connection.clone()));

        let current = if std::ptr::eq(self.current, self.state.device()) {
            device.clone()
        } else {
            renderable(self.current)
        };

        let mut context = Map::with_capacity(3);
        context.insert("device".to_owned(), Value::Object(device));
        context.insert("connection".to_owned(), Value::Object(connection));
        context.insert("current".to_owned(), Value::Object(current));
        Value::Object(context)
    }
}

/// Copy of `object` holding only values a placeholder may render.
fn renderable(object: &StateRoot) -> Map<String, Value> {
    object
        .iter()
        .filter_map(|(key, value)| {
            let value = match value {
                Value::Null | Value::Array(_) => return None,
                Value::Object(nested) => Value::Object(renderable(nested)),
                scalar => scalar.clone(),
            };
            Some((key.clone(), value))
        })
        .collect()
}

static ENGINE: LazyLock<Handlebars<'static>> = LazyLock::new(|| {
    let mut engine = Handlebars::new();
    engine.set_strict_mode(true);
    engine
});

/// Handlebars placeholder expansion in strict mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct Placeholders;

impl Materializer for Placeholders {
    fn expand(&self, template: &str, scope: &TemplateScope<'_>) -> Result<String, TemplateError> {
        if !template.contains("{{") {
            return Ok(template.to_owned());
        }
        ENGINE
            .render_template(template, &scope.context())
            .map_err(|err| template_error(&err))
    }
}

fn template_error(err: &RenderError) -> TemplateError {
    match err.reason() {
        RenderErrorReason::MissingVariable(path) => TemplateError::Unresolved {
            path: path.clone().unwrap_or_default(),
        },
        _ => TemplateError::Render {
            reason: err.to_string(),
        },
    }
}
