//! Synthesis of named top-level properties from inline operation schemas.
//!
//! Path/operation objects carry anonymous `schema` nodes; the output
//! schema needs named `properties`. Each container's shape decides the
//! name: an explicit `name`, an `arrayOf<Ref>` composite, a
//! URL-path-plus-verb pair, a combinator fan-out, or the bare `$ref`
//! target.

use serde_json::{Map, Value};

use crate::error::ConvertError;
use crate::tree::{find_paths, Path, Segment};

const COMBINATORS: &[&str] = &["oneOf", "allOf", "anyOf"];

/// Result of scanning a document for inline operation schemas.
#[derive(Debug, Default)]
pub struct SynthesizedProperties {
    /// Property name → schema subtree, in derivation order.
    pub properties: Map<String, Value>,
    /// Names originating from combinator branches; the assembler lists
    /// these in the output's top-level `required`.
    pub required: Vec<String>,
}

/// Derive named properties from every `schema` node in the document.
///
/// Later derivations overwrite earlier ones on name collision. An array
/// schema whose `items` carries no `$ref` is skipped silently; a schema
/// with no `type`, no combinator and no `$ref` is a fatal error.
pub fn synthesize_properties(doc: &Value) -> Result<SynthesizedProperties, ConvertError> {
    let mut out = SynthesizedProperties::default();

    let schema_paths: Vec<Path> = find_paths("schema", doc)
        .into_iter()
        .filter(|path| path.last().and_then(Segment::as_key) == Some("schema"))
        .collect();

    for path in schema_paths {
        let Some(schema) = path.get(doc) else {
            continue;
        };
        let container_path = path.parent();
        let container = container_path.get(doc).unwrap_or(&Value::Null);
        let description = container.get("description").cloned();

        if let Some(name) = container.get("name").and_then(Value::as_str) {
            register(&mut out.properties, name.to_string(), schema, &description);
            continue;
        }

        match schema.get("type").and_then(Value::as_str) {
            Some("array") => {
                // Only reference-typed items produce a nameable property
                let Some(item_ref) = schema.pointer("/items/$ref").and_then(Value::as_str)
                else {
                    continue;
                };
                let name = format!("arrayOf{}", final_segment(item_ref));
                register(&mut out.properties, name, schema, &description);
            }
            Some(_) => {
                let name = operation_name(&container_path).ok_or_else(|| {
                    ConvertError::StructuralParse {
                        path: path.to_string(),
                    }
                })?;
                register(&mut out.properties, name, schema, &description);
            }
            None => {
                if let Some(branches) = COMBINATORS
                    .iter()
                    .find_map(|key| schema.get(*key))
                    .and_then(Value::as_array)
                {
                    // One registration per referenced branch, each holding
                    // the entire combinator schema
                    for branch in branches {
                        let Some(branch_ref) = branch.get("$ref").and_then(Value::as_str)
                        else {
                            continue;
                        };
                        let name = lower_first(final_segment(branch_ref));
                        register(&mut out.properties, name.clone(), schema, &description);
                        if !out.required.contains(&name) {
                            out.required.push(name);
                        }
                    }
                } else if let Some(schema_ref) = schema.get("$ref").and_then(Value::as_str) {
                    let name = lower_first(final_segment(schema_ref));
                    register(&mut out.properties, name, schema, &description);
                } else {
                    return Err(ConvertError::StructuralParse {
                        path: path.to_string(),
                    });
                }
            }
        }
    }

    Ok(out)
}

/// Install a synthesized property, overwriting the schema's description
/// with the container's when the container carries one.
fn register(
    properties: &mut Map<String, Value>,
    name: String,
    schema: &Value,
    description: &Option<Value>,
) {
    let mut value = schema.clone();
    if let (Value::Object(map), Some(desc)) = (&mut value, description) {
        map.insert("description".to_string(), desc.clone());
    }
    properties.insert(name, value);
}

/// Name an inline scalar schema after its operation: the URL path segment
/// (leading `/` stripped) joined to the HTTP verb with `_`.
fn operation_name(container_path: &Path) -> Option<String> {
    let segments = container_path.segments();
    if let Some(i) = segments.iter().position(|s| s.as_key() == Some("paths")) {
        if let (Some(url), Some(verb)) = (segments.get(i + 1), segments.get(i + 2)) {
            return Some(format!(
                "{}_{}",
                url.to_string().trim_start_matches('/'),
                verb
            ));
        }
    }
    // Degenerate shape (schema outside a paths block): fall back to the
    // container path's own leading segments
    let first = segments.first()?.to_string();
    let third = segments.get(2)?.to_string();
    Some(format!("{}_{}", first.trim_start_matches('/'), third))
}

pub(crate) fn final_segment(reference: &str) -> &str {
    reference.rsplit('/').next().unwrap_or(reference)
}

pub(crate) fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
