//! Assembly of the final JSON Schema from a supported API document.
//!
//! The assembler sequences the pipeline stages over one document,
//! mutated in place: external reference resolution, top-level metadata,
//! property-bag seeding and synthesis, definitions attachment, nullable
//! conversion, pointer-prefix rewriting, dereferencing, and
//! post-resolution fixups.

use serde_json::{json, Map, Value};

use crate::error::ConvertError;
use crate::fixups::apply_fixups;
use crate::loader::FragmentLoader;
use crate::nullable::convert_nullables;
use crate::refs::{
    dereference, resolve_external_refs, rewrite_pointer_prefix, COMPONENTS_PREFIX,
    DEFINITIONS_PREFIX,
};
use crate::synth::{final_segment, lower_first, synthesize_properties};
use crate::tree::find_containers_with_key;
use crate::types::{ConvertOptions, SpecKind};

/// Convert an API description document into a JSON Schema.
///
/// Returns `Ok(None)` when the document's version field is absent or
/// outside the supported series; unsupported input is not an error.
///
/// # Errors
///
/// Any pipeline failure aborts the whole assembly: reference loading,
/// structural parse errors during property synthesis, and dangling
/// pointers during dereferencing. There is no partial-output mode.
pub fn convert(
    doc: Value,
    options: &ConvertOptions,
    loader: &dyn FragmentLoader,
) -> Result<Option<Value>, ConvertError> {
    let Some(kind) = SpecKind::detect(&doc) else {
        return Ok(None);
    };
    assemble(doc, kind, options, loader).map(Some)
}

fn assemble(
    mut doc: Value,
    kind: SpecKind,
    options: &ConvertOptions,
    loader: &dyn FragmentLoader,
) -> Result<Value, ConvertError> {
    if options.resolve_refs {
        resolve_external_refs(&mut doc, &options.root_dir, loader)?;
    }

    let mut out = Map::new();
    out.insert("$schema".into(), json!(options.schema_uri));
    if let Some(id) = &options.id {
        out.insert("$id".into(), json!(id));
    }
    out.insert("title".into(), info_field(&doc, "title"));
    out.insert("version".into(), info_field(&doc, "version"));
    out.insert("description".into(), info_field(&doc, "description"));
    out.insert(
        "additionalProperties".into(),
        json!(options.additional_properties),
    );

    let mut properties = Map::new();
    properties.insert(
        "schemaVersion".into(),
        json!({
            "type": "string",
            "description": "The version of this document"
        }),
    );
    let mut required = vec!["schemaVersion".to_string()];

    if kind == SpecKind::AsyncApi2 {
        seed_message_payloads(&doc, &mut properties);
    }

    let synthesized = synthesize_properties(&doc)?;
    for (name, schema) in synthesized.properties {
        properties.insert(name, schema);
    }
    for name in synthesized.required {
        if !required.contains(&name) {
            required.push(name);
        }
    }

    out.insert("properties".into(), Value::Object(properties));
    out.insert(
        "required".into(),
        Value::Array(required.into_iter().map(Value::String).collect()),
    );

    let mut definitions = if kind.uses_components() {
        doc.pointer("/components/schemas").cloned()
    } else {
        doc.get("definitions").cloned()
    }
    .unwrap_or_else(|| Value::Object(Map::new()));
    convert_nullables(&mut definitions);
    out.insert("definitions".into(), definitions);

    let mut schema = Value::Object(out);

    if kind.uses_components() {
        rewrite_pointer_prefix(&mut schema, COMPONENTS_PREFIX, DEFINITIONS_PREFIX);
    }

    if options.resolve_refs {
        dereference(&mut schema)?;
        apply_fixups(&mut schema);
    }

    Ok(schema)
}

fn info_field(doc: &Value, field: &str) -> Value {
    doc.pointer(&format!("/info/{}", field))
        .cloned()
        .unwrap_or_else(|| json!(""))
}

/// Seed the property bag from AsyncAPI message payloads.
///
/// Every object directly owning a `payload` contributes one property,
/// named by the message's `name` field, else by the payload `$ref`'s
/// final segment (first-letter-lowercased), else skipped. The message
/// description overwrites the payload's.
fn seed_message_payloads(doc: &Value, properties: &mut Map<String, Value>) {
    for message in find_containers_with_key(doc, "payload") {
        let Some(payload) = message.get("payload") else {
            continue;
        };
        let name = message
            .get("name")
            .and_then(Value::as_str)
            .map(String::from)
            .or_else(|| {
                payload
                    .get("$ref")
                    .and_then(Value::as_str)
                    .map(|r| lower_first(final_segment(r)))
            });
        let Some(name) = name else {
            continue;
        };

        let mut value = payload.clone();
        if let (Value::Object(map), Some(desc)) = (&mut value, message.get("description")) {
            map.insert("description".into(), desc.clone());
        }
        properties.insert(name, value);
    }
}
