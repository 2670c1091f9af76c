//! Rewrites the OpenAPI `nullable` marker into the JSON Schema
//! type-union convention.

use serde_json::Value;

use crate::tree::for_each_container_with_key;

/// Convert every `nullable`-marked object in `tree`.
///
/// The marker key is removed; when it was `true`, the sibling `type`
/// value `T` becomes the union `[T, "null"]`. Objects without the marker
/// are untouched, so a second run is a no-op.
pub fn convert_nullables(tree: &mut Value) {
    for_each_container_with_key(tree, "nullable", &mut |map| {
        let marker = map.remove("nullable");
        if marker != Some(Value::Bool(true)) {
            return;
        }
        if let Some(type_value) = map.get_mut("type") {
            if !type_value.is_array() {
                let original = type_value.take();
                *type_value = Value::Array(vec![original, Value::String("null".into())]);
            }
        }
    });
}
