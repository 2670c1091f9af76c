//! Repairs applied after dereferencing, once no `$ref` nodes remain.
//!
//! Inlining degrades two shapes: array `items` that referenced a bare
//! type name collapse to a string, and boolean `required` flags sit on
//! individual properties instead of the parent object's `required` list.
//! Both passes are idempotent.

use std::collections::HashSet;

use serde_json::{json, Value};

use crate::tree::{find_paths, truncate_until, Path, Segment};

/// Run both post-resolution passes in order.
pub fn apply_fixups(doc: &mut Value) {
    repair_array_items(doc);
    migrate_required_flags(doc);
}

/// Rewrap array `items` that degenerated into a bare type-name string
/// during inlining: `items: "Widget"` becomes `items: {"type": "Widget"}`.
pub fn repair_array_items(doc: &mut Value) {
    let array_paths: Vec<Path> = find_paths("array", doc);
    for path in array_paths {
        // Only value matches count; a key named "array" is not one
        if path.get(doc).and_then(Value::as_str) != Some("array") {
            continue;
        }
        let items_path = path.parent().child("items");
        if let Some(items) = items_path.get_mut(doc) {
            if let Some(type_name) = items.as_str().map(String::from) {
                *items = json!({ "type": type_name });
            }
        }
    }
}

/// Migrate boolean `required` flags from individual properties into the
/// `required` name list of the nearest ancestor owning a `properties`
/// block.
///
/// List-valued `required` occurrences mark their owner as already
/// migrated and are skipped. Flags with no enclosing `properties`
/// segment are left alone. Names are appended in document order,
/// creating the list on demand and never duplicating an entry.
pub fn migrate_required_flags(doc: &mut Value) {
    let required_paths: Vec<Path> = find_paths("required", doc)
        .into_iter()
        .filter(|path| path.last().and_then(Segment::as_key) == Some("required"))
        .collect();

    let mut excluded: HashSet<Path> = HashSet::new();
    let mut flags: Vec<Path> = Vec::new();
    for path in required_paths {
        match path.get(doc) {
            Some(Value::Array(_)) => {
                excluded.insert(path.parent());
            }
            Some(_) => flags.push(path),
            None => {}
        }
    }

    for flag_path in flags {
        let property_path = flag_path.parent();
        if excluded.contains(&property_path) {
            continue;
        }

        let ancestor = truncate_until(&flag_path, "properties");
        if ancestor.is_empty() {
            // No enclosing properties block to migrate into
            continue;
        }

        let segments = flag_path.segments();
        let Some(property_name) = segments
            .get(segments.len() - 2)
            .and_then(Segment::as_key)
            .map(String::from)
        else {
            continue;
        };

        if let Some(property) = property_path.get_mut(doc).and_then(Value::as_object_mut) {
            property.remove("required");
        }

        if let Some(owner) = ancestor.get_mut(doc).and_then(Value::as_object_mut) {
            let list = owner
                .entry("required")
                .or_insert_with(|| Value::Array(Vec::new()));
            if let Some(names) = list.as_array_mut() {
                if !names.iter().any(|n| n.as_str() == Some(&property_name)) {
                    names.push(Value::String(property_name));
                }
            }
        }
    }
}
