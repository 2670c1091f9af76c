//! Reference handling: external fragment resolution and renaming,
//! pointer-prefix rewriting, and internal `$ref` dereferencing.
//!
//! External resolution pulls every referenced fragment into the main
//! document under a namespaced flat catalog, so that a later dereference
//! pass only ever sees internal `#/...` pointers.

use std::path::Path as FsPath;

use serde_json::{Map, Value};

use crate::error::ConvertError;
use crate::loader::{navigate_fragment, FragmentLoader};
use crate::tree::{find_paths, truncate_until, Path, Segment};

/// Pointer prefix of the OpenAPI/AsyncAPI named-type catalog.
pub const COMPONENTS_PREFIX: &str = "#/components/schemas/";

/// Pointer prefix of the draft-07 named-type catalog.
pub const DEFINITIONS_PREFIX: &str = "#/definitions/";

/// Resolve every external `$ref` in `doc` through `loader`.
///
/// Each referenced fragment is loaded, its nested pointers are rewritten
/// into the unified namespace, the referencing object is replaced by the
/// fragment's content (minus the fragment's own `components`), and all
/// fragments' `components.schemas` entries are merged into the main
/// document's catalog under `<namespace>_<name>` keys. First-seen wins
/// on key collision; existing main-document entries are never
/// overwritten.
///
/// # Errors
///
/// `ReferenceLoad` when the loader fails, `MalformedReference` when a
/// pointer has no definition-name suffix.
pub fn resolve_external_refs(
    doc: &mut Value,
    root_dir: &FsPath,
    loader: &dyn FragmentLoader,
) -> Result<(), ConvertError> {
    let pending: Vec<(Path, String)> = find_paths("$ref", doc)
        .into_iter()
        .filter(|path| path.last().and_then(Segment::as_key) == Some("$ref"))
        .filter_map(|path| {
            let value = path.get(doc)?.as_str()?;
            if value.starts_with('#') {
                None
            } else {
                Some((path.clone(), value.to_string()))
            }
        })
        .collect();

    // Load everything before mutating: paths stay valid for pairing, and
    // a failed load leaves the document untouched.
    let mut loaded = Vec::with_capacity(pending.len());
    for (path, reference) in pending {
        let fragment =
            loader
                .load(&reference, root_dir)
                .map_err(|source| ConvertError::ReferenceLoad {
                    reference: reference.clone(),
                    source: Box::new(source),
                })?;
        loaded.push((path, fragment));
    }

    let mut catalog: Map<String, Value> = Map::new();

    for (path, mut fragment) in loaded {
        let namespace = fragment_namespace(&path);
        rewrite_fragment_refs(&mut fragment, &namespace)?;

        if let Some(schemas) = fragment
            .pointer("/components/schemas")
            .and_then(Value::as_object)
        {
            for (name, schema) in schemas {
                catalog
                    .entry(format!("{}_{}", namespace, name))
                    .or_insert_with(|| schema.clone());
            }
        }

        if let Value::Object(map) = &mut fragment {
            map.remove("components");
        }

        // The object owning the $ref is replaced wholesale.
        let container = path.parent();
        if let Some(slot) = container.get_mut(doc) {
            *slot = fragment;
        }
    }

    if !catalog.is_empty() {
        install_catalog(doc, catalog);
    }

    Ok(())
}

/// Namespace for a fragment: the second-to-last segment of the path that
/// referenced it, with a leading `/` stripped. Disambiguates
/// identically-named definitions from different fragments.
fn fragment_namespace(ref_path: &Path) -> String {
    let segments = ref_path.segments();
    if segments.len() < 2 {
        return String::new();
    }
    segments[segments.len() - 2]
        .to_string()
        .trim_start_matches('/')
        .to_string()
}

/// Rewrite every nested `$ref` inside a loaded fragment.
///
/// Pointers into sibling files become internal pointers rooted at the
/// segments before the nearest enclosing `components` segment of their
/// own path; already-internal pointers get their final segment renamed
/// to `<namespace>_<name>` so they land in the merged catalog.
fn rewrite_fragment_refs(fragment: &mut Value, namespace: &str) -> Result<(), ConvertError> {
    let nested: Vec<Path> = find_paths("$ref", fragment)
        .into_iter()
        .filter(|path| path.last().and_then(Segment::as_key) == Some("$ref"))
        .collect();

    for path in nested {
        let Some(value) = path.get(fragment).and_then(Value::as_str).map(String::from) else {
            continue;
        };
        let name = definition_name(&value)?;

        let rewritten = if value.starts_with('#') {
            match value.rfind('/') {
                Some(idx) => format!("{}/{}_{}", &value[..idx], namespace, name),
                None => {
                    return Err(ConvertError::MalformedReference { reference: value });
                }
            }
        } else {
            let prefix = truncate_until(&path, "components");
            let mut parts: Vec<String> =
                prefix.segments().iter().map(|s| s.to_string()).collect();
            parts.push(format!("components_{}", name));
            format!("#/{}", parts.join("/"))
        };

        if let Some(slot) = path.get_mut(fragment) {
            *slot = Value::String(rewritten);
        }
    }

    Ok(())
}

/// Final segment of a reference string, used as the definition name.
fn definition_name(reference: &str) -> Result<String, ConvertError> {
    let name = reference.rsplit('/').next().unwrap_or("");
    if name.is_empty() || name == "#" {
        return Err(ConvertError::MalformedReference {
            reference: reference.to_string(),
        });
    }
    Ok(name.to_string())
}

/// Merge a renamed fragment catalog into `components.schemas`, creating
/// the path on demand and never overwriting existing entries.
fn install_catalog(doc: &mut Value, catalog: Map<String, Value>) {
    let Some(root) = doc.as_object_mut() else {
        return;
    };
    let components = root
        .entry("components")
        .or_insert_with(|| Value::Object(Map::new()));
    let Some(components) = components.as_object_mut() else {
        return;
    };
    let schemas = components
        .entry("schemas")
        .or_insert_with(|| Value::Object(Map::new()));
    let Some(schemas) = schemas.as_object_mut() else {
        return;
    };
    for (name, schema) in catalog {
        schemas.entry(name).or_insert(schema);
    }
}

/// Structurally rewrite every string value starting with `from` so it
/// starts with `to` instead. No serialization round-trip.
pub fn rewrite_pointer_prefix(node: &mut Value, from: &str, to: &str) {
    match node {
        Value::String(s) => {
            if let Some(rest) = s.strip_prefix(from) {
                *s = format!("{}{}", to, rest);
            }
        }
        Value::Object(map) => {
            for value in map.values_mut() {
                rewrite_pointer_prefix(value, from, to);
            }
        }
        Value::Array(items) => {
            for item in items {
                rewrite_pointer_prefix(item, from, to);
            }
        }
        _ => {}
    }
}

/// Chain limit for `$ref`-through-`$ref` inlining. Behavior under
/// circular graphs is unspecified upstream; this turns a cycle into a
/// loud error instead of a stack overflow.
const MAX_REF_CHAIN: usize = 64;

/// Replace every internal `#/...` pointer with a deep copy of its target.
///
/// Targets are looked up against a snapshot of the document taken before
/// any inlining, so substitution order cannot change results.
///
/// # Errors
///
/// `Dereference` on a dangling pointer or a reference chain longer than
/// the cycle limit.
pub fn dereference(doc: &mut Value) -> Result<(), ConvertError> {
    let root = doc.clone();
    dereference_inner(doc, &root, 0)
}

fn dereference_inner(node: &mut Value, root: &Value, chain: usize) -> Result<(), ConvertError> {
    match node {
        Value::Object(map) => {
            if let Some(pointer) = map.get("$ref").and_then(Value::as_str).map(String::from) {
                if pointer.starts_with('#') {
                    if chain >= MAX_REF_CHAIN {
                        return Err(ConvertError::Dereference { pointer });
                    }
                    let mut target = navigate_fragment(root, &pointer)
                        .map_err(|_| ConvertError::Dereference {
                            pointer: pointer.clone(),
                        })?;
                    dereference_inner(&mut target, root, chain + 1)?;
                    *node = target;
                    return Ok(());
                }
            }
            for value in map.values_mut() {
                dereference_inner(value, root, chain)?;
            }
        }
        Value::Array(items) => {
            for item in items {
                dereference_inner(item, root, chain)?;
            }
        }
        _ => {}
    }
    Ok(())
}
