use std::collections::HashMap;

use crate::value::Value;

/// A named-parameter environment consulted during evaluation.
///
/// Supplied per `evaluate` call; the expression never retains it. Anything
/// that can answer name lookups works — the usual choice is a plain
/// `HashMap<String, Value>`, which implements this trait directly.
pub trait Parameters {
    /// Returns the parameter of the given name, or `None` if it is
    /// unavailable.
    fn get(&self, name: &str) -> Option<Value>;
}

impl Parameters for HashMap<String, Value> {
    fn get(&self, name: &str) -> Option<Value> {
        HashMap::get(self, name).cloned()
    }
}

/// The empty environment, for expressions that reference no parameters.
impl Parameters for () {
    fn get(&self, _name: &str) -> Option<Value> {
        None
    }
}
