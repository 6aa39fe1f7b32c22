// ── Device / connection state roots ──
//
// Both roots are plain JSON objects filled in by the polling layer.
// The evaluator only borrows them; the applier is the sole writer.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{AsRefStr, Display, EnumString};

/// A state root: attribute name to JSON value.
pub type StateRoot = Map<String, Value>;

/// Key under which the connection root is reachable from the device root.
pub const CONNECTION_LINK: &str = "connection";

/// Names one of the two state roots.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Root {
    Device,
    Connection,
}

/// Read-only view over one device/connection pair.
///
/// The connection root is linked from the device root under
/// [`CONNECTION_LINK`] without copying it into the device map.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    device: &'a StateRoot,
    connection: &'a StateRoot,
}

impl<'a> Scope<'a> {
    pub fn new(device: &'a StateRoot, connection: &'a StateRoot) -> Self {
        Self { device, connection }
    }

    pub fn device(&self) -> &'a StateRoot {
        self.device
    }

    pub fn connection(&self) -> &'a StateRoot {
        self.connection
    }

    pub fn root(&self, root: Root) -> &'a StateRoot {
        match root {
            Root::Device => self.device,
            Root::Connection => self.connection,
        }
    }

    /// Descend one level into `key` of `object`, or `None` if it is absent
    /// or not an object.
    pub fn child(&self, object: &'a StateRoot, key: &str) -> Option<&'a StateRoot> {
        if key == CONNECTION_LINK && std::ptr::eq(object, self.device) {
            return Some(self.connection);
        }
        object.get(key)?.as_object()
    }

    /// The object a node reads its attribute from.
    pub fn subject(&self, root: Root, nested_under: Option<&str>) -> Option<&'a StateRoot> {
        let base = self.root(root);
        match nested_under {
            Some(key) => self.child(base, key),
            None => Some(base),
        }
    }
}

/// Truthiness of an observed attribute value. Missing counts as falsy.
///
/// `null`, `false`, `0`, `NaN`, and `""` are falsy. Everything else is
/// truthy, including empty arrays and objects.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f.abs() > 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}
