//! JSON-Schema emission.
//!
//! The top-level requirement dictionary becomes the root object; every nested
//! dictionary becomes a named entry under `$defs`, referenced by
//! `{"$ref": "#/$defs/<name>"}`. Names are local dotted paths (`order.items`).

mod config;
mod emitter;
mod naming;


pub use config::{PropertyOrder, SchemaConfig, SchemaMode};

use serde_json::Value;

use crate::variable::Variable;
use emitter::SchemaEmitter;

/// Emit the schema document for `root` in the configured mode.
pub fn to_json_schema(root: &Variable, config: &SchemaConfig) -> Value {
    let schema = SchemaEmitter::new(config, config.mode, config.tag_modes).emit_root(root);
    let defs = schema
        .get("$defs")
        .and_then(Value::as_object)
        .map_or(0, |defs| defs.len());
    tracing::debug!(mode = ?config.mode, defs, "emitted schema");
    schema
}

/// Emit both the input and output documents, with mode-tagged definition names.
pub fn to_json_schema_modes(root: &Variable, config: &SchemaConfig) -> (Value, Value) {
    let input = SchemaEmitter::new(config, SchemaMode::Input, true).emit_root(root);
    let output = SchemaEmitter::new(config, SchemaMode::Output, true).emit_root(root);
    (input, output)
}

/// `$ref` to the `$defs` entry `name`, as a JSON Pointer in a URI fragment.
pub fn definition_ref(name: &str) -> String {
    let segment = name.replace('~', "~0").replace('/', "~1");
    format!("#/$defs/{}", urlencoding::encode(&segment))
}

/// Inverse of the escaping in [`definition_ref`] for one pointer segment.
/// `None` when the percent-decoded bytes are not UTF-8.
pub fn decode_ref_segment(segment: &str) -> Option<String> {
    let decoded = urlencoding::decode(segment).ok()?;
    Some(decoded.replace("~1", "/").replace("~0", "~"))
}

/// Deduplication key: the compact, key-sorted inline schema of `var`.
pub fn canonical_key(var: &Variable) -> String {
    let config = SchemaConfig::default();
    let schema = SchemaEmitter::inline(&config).emit_shape(var);
    to_canonical_string(&schema)
}

/// Serialize with object keys sorted, independent of the map implementation.
pub fn to_canonical_string(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(&mut out, value);
    out
}

fn write_canonical(out: &mut String, value: &Value) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(out, &map[key]);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(out, item);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}
