//! Text form of the sequences listed in the artifact trailer.
//!
//! Lists render as `[a, b]`, strings double-quoted, objects as `{"k": v}`.

use serde::Serialize;
use serde_json::Value;

use crate::error::Result;

/// Render any serializable sequence in trailer form.
pub fn render_sequence<T: Serialize>(items: &[T]) -> Result<String> {
    let value = serde_json::to_value(items)?;
    Ok(render_value(&value))
}

/// Render a JSON value with `", "` and `": "` separators.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Array(items) => {
            let inner: Vec<String> = items.iter().map(render_value).collect();
            format!("[{}]", inner.join(", "))
        }
        Value::Object(map) => {
            let inner: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", Value::String(k.clone()), render_value(v)))
                .collect();
            format!("{{{}}}", inner.join(", "))
        }
        scalar => scalar.to_string(),
    }
}
