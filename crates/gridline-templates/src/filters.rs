//! Custom markup filters for MiniJinja

use minijinja::value::ValueKind;
use minijinja::{Environment, Error, ErrorKind, HtmlEscape, Value};

/// Markup-specific filters
pub struct MarkupFilters;

impl MarkupFilters {
    /// Render a key/value map as HTML attributes (` key="value"`), escaped
    /// and sorted by key. Undefined and none render as nothing.
    pub fn attrs(value: Value) -> Result<Value, Error> {
        if value.is_undefined() || value.is_none() {
            return Ok(Value::from_safe_string(String::new()));
        }
        if value.kind() != ValueKind::Map {
            return Err(Error::new(
                ErrorKind::InvalidOperation,
                "attrs filter expects a map",
            ));
        }

        let mut pairs: Vec<(String, String)> = Vec::new();
        for key in value.try_iter()? {
            let item = value.get_item(&key)?;
            if item.is_none() || item.is_undefined() {
                continue;
            }
            pairs.push((key.to_string(), item.to_string()));
        }
        pairs.sort();

        let rendered: String = pairs
            .iter()
            .map(|(k, v)| format!(" {}=\"{}\"", HtmlEscape(k), HtmlEscape(v)))
            .collect();
        Ok(Value::from_safe_string(rendered))
    }
}

/// Register all markup filters with a MiniJinja environment
pub fn register_filters(env: &mut Environment) {
    env.add_filter("attrs", MarkupFilters::attrs);
}
