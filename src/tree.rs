//! Generic searches over untyped document trees.
//!
//! Nothing in this module knows about schema semantics. It provides the
//! typed [`Path`] used to address locations in a document, key/value
//! searches over arbitrarily nested values, and the backward path
//! truncation that underlies "find the nearest enclosing object named X".

use std::fmt;

use serde_json::{Map, Value};

/// One step of a [`Path`]: an object key or a sequence index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Key(String),
    Index(usize),
}

impl Segment {
    /// The key name, if this segment addresses an object member.
    pub fn as_key(&self) -> Option<&str> {
        match self {
            Segment::Key(k) => Some(k),
            Segment::Index(_) => None,
        }
    }
}

impl From<&str> for Segment {
    fn from(key: &str) -> Self {
        Segment::Key(key.to_string())
    }
}

impl From<String> for Segment {
    fn from(key: String) -> Self {
        Segment::Key(key)
    }
}

impl From<usize> for Segment {
    fn from(index: usize) -> Self {
        Segment::Index(index)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(k) => f.write_str(k),
            Segment::Index(i) => write!(f, "{}", i),
        }
    }
}

/// A location in a document, as an ordered sequence of typed segments.
///
/// A `Path` is only valid against the document version it was computed
/// from: mutating the tree can invalidate paths that point past a moved
/// or removed node. The dotted display form exists for error context
/// only, never for navigation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path(Vec<Segment>);

impl Path {
    pub fn new() -> Self {
        Path(Vec::new())
    }

    /// Build a path from string keys. Convenience for callers and tests.
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Path(keys.into_iter().map(|k| Segment::Key(k.into())).collect())
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, segment: impl Into<Segment>) {
        self.0.push(segment.into());
    }

    pub fn pop(&mut self) -> Option<Segment> {
        self.0.pop()
    }

    pub fn last(&self) -> Option<&Segment> {
        self.0.last()
    }

    /// The path minus its final segment.
    pub fn parent(&self) -> Path {
        let mut segments = self.0.clone();
        segments.pop();
        Path(segments)
    }

    /// This path extended by one segment.
    pub fn child(&self, segment: impl Into<Segment>) -> Path {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Path(segments)
    }

    /// Navigate to the value this path addresses, if it exists.
    pub fn get<'a>(&self, doc: &'a Value) -> Option<&'a Value> {
        let mut current = doc;
        for segment in &self.0 {
            current = match segment {
                Segment::Key(k) => current.get(k.as_str())?,
                Segment::Index(i) => current.get(*i)?,
            };
        }
        Some(current)
    }

    /// Mutable navigation to the value this path addresses.
    pub fn get_mut<'a>(&self, doc: &'a mut Value) -> Option<&'a mut Value> {
        let mut current = doc;
        for segment in &self.0 {
            current = match segment {
                Segment::Key(k) => current.get_mut(k.as_str())?,
                Segment::Index(i) => current.get_mut(*i)?,
            };
        }
        Some(current)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

impl From<Vec<Segment>> for Path {
    fn from(segments: Vec<Segment>) -> Self {
        Path(segments)
    }
}

/// Find every object node that directly owns `key`.
///
/// Depth-first over objects and sequence elements. A matching node is
/// returned whole and not searched further beneath; primitives and null
/// contribute no matches.
pub fn find_containers_with_key<'a>(tree: &'a Value, key: &str) -> Vec<&'a Value> {
    let mut found = Vec::new();
    collect_containers(tree, key, &mut found);
    found
}

fn collect_containers<'a>(node: &'a Value, key: &str, found: &mut Vec<&'a Value>) {
    match node {
        Value::Object(map) => {
            if map.contains_key(key) {
                found.push(node);
                return;
            }
            for value in map.values() {
                collect_containers(value, key, found);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_containers(item, key, found);
            }
        }
        _ => {}
    }
}

/// Mutable companion of [`find_containers_with_key`]: applies `apply` to
/// every object directly owning `key`, with the same stop-at-match rule.
pub fn for_each_container_with_key(
    tree: &mut Value,
    key: &str,
    apply: &mut dyn FnMut(&mut Map<String, Value>),
) {
    match tree {
        Value::Object(map) => {
            if map.contains_key(key) {
                apply(map);
                return;
            }
            for value in map.values_mut() {
                for_each_container_with_key(value, key, apply);
            }
        }
        Value::Array(items) => {
            for item in items {
                for_each_container_with_key(item, key, apply);
            }
        }
        _ => {}
    }
}

/// Find the path to every position where a key equals `keyword` or a
/// string value equals `keyword`.
///
/// Sequences are treated as objects with integer keys. A match on a leaf
/// value yields the path to that leaf's own key or index. Results come
/// back in document order.
pub fn find_paths(keyword: &str, tree: &Value) -> Vec<Path> {
    let mut found = Vec::new();
    let mut prefix = Path::new();
    collect_paths(keyword, tree, &mut prefix, &mut found);
    found
}

fn collect_paths(keyword: &str, node: &Value, prefix: &mut Path, found: &mut Vec<Path>) {
    match node {
        Value::Object(map) => {
            for (key, value) in map {
                prefix.push(key.as_str());
                if key == keyword || value.as_str() == Some(keyword) {
                    found.push(prefix.clone());
                }
                collect_paths(keyword, value, prefix, found);
                prefix.pop();
            }
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                prefix.push(index);
                if item.as_str() == Some(keyword) {
                    found.push(prefix.clone());
                }
                collect_paths(keyword, item, prefix, found);
                prefix.pop();
            }
        }
        _ => {}
    }
}

/// Scanning from the end, discard segments until the discarded segment
/// equals `marker`; return everything strictly before it.
///
/// Returns an empty path when `marker` never occurs; callers must treat
/// empty as "no enclosing marker found".
pub fn truncate_until(path: &Path, marker: &str) -> Path {
    let segments = path.segments();
    for i in (0..segments.len()).rev() {
        if segments[i].as_key() == Some(marker) {
            return Path(segments[..i].to_vec());
        }
    }
    Path::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn path_display_is_dotted() {
        let mut path = Path::from_keys(["paths", "/pets", "get"]);
        path.push(0usize);
        assert_eq!(path.to_string(), "paths./pets.get.0");
    }

    #[test]
    fn path_navigates_objects_and_arrays() {
        let doc = json!({"a": {"b": [{"c": 1}, {"c": 2}]}});
        let mut path = Path::from_keys(["a", "b"]);
        path.push(1usize);
        path.push("c");
        assert_eq!(path.get(&doc), Some(&json!(2)));

        let missing = Path::from_keys(["a", "x"]);
        assert_eq!(missing.get(&doc), None);
    }

    #[test]
    fn path_get_mut_allows_in_place_edit() {
        let mut doc = json!({"a": {"b": "old"}});
        let path = Path::from_keys(["a", "b"]);
        *path.get_mut(&mut doc).unwrap() = json!("new");
        assert_eq!(doc, json!({"a": {"b": "new"}}));
    }

    #[test]
    fn find_containers_returns_owning_objects() {
        let doc = json!({
            "a": {"nullable": true, "type": "string"},
            "b": {"c": {"nullable": false}},
            "d": [{"nullable": true}]
        });
        let found = find_containers_with_key(&doc, "nullable");
        assert_eq!(found.len(), 3);
    }

    #[test]
    fn find_containers_does_not_descend_past_match() {
        let doc = json!({
            "outer": {
                "nullable": true,
                "inner": {"nullable": true}
            }
        });
        let found = find_containers_with_key(&doc, "nullable");
        assert_eq!(found.len(), 1);
        assert!(found[0].get("inner").is_some());
    }

    #[test]
    fn find_containers_tolerates_primitives() {
        assert!(find_containers_with_key(&json!(null), "k").is_empty());
        assert!(find_containers_with_key(&json!(42), "k").is_empty());
        assert!(find_containers_with_key(&json!("k"), "k").is_empty());
    }

    #[test]
    fn find_paths_matches_keys() {
        let doc = json!({"a": {"$ref": "X"}, "b": {"c": {"$ref": "Y"}}});
        let paths = find_paths("$ref", &doc);
        let values: std::collections::HashSet<&str> = paths
            .iter()
            .map(|p| p.get(&doc).unwrap().as_str().unwrap())
            .collect();
        assert_eq!(values, ["X", "Y"].into_iter().collect());
    }

    #[test]
    fn find_paths_matches_leaf_values() {
        let doc = json!({"pet": {"type": "array", "items": {"type": "string"}}});
        let paths = find_paths("array", &doc);
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].to_string(), "pet.type");
    }

    #[test]
    fn find_paths_treats_sequences_as_integer_keys() {
        let doc = json!({"oneOf": ["marker", {"k": "marker"}]});
        let paths = find_paths("marker", &doc);
        let rendered: Vec<String> = paths.iter().map(|p| p.to_string()).collect();
        assert_eq!(rendered, vec!["oneOf.0", "oneOf.1.k"]);
    }

    #[test]
    fn truncate_until_returns_prefix_before_marker() {
        let path = Path::from_keys(["a", "b", "marker", "c", "d"]);
        assert_eq!(
            truncate_until(&path, "marker"),
            Path::from_keys(["a", "b"])
        );
    }

    #[test]
    fn truncate_until_uses_last_occurrence() {
        let path = Path::from_keys(["m", "a", "m", "b"]);
        assert_eq!(truncate_until(&path, "m"), Path::from_keys(["m", "a"]));
    }

    #[test]
    fn truncate_until_missing_marker_is_empty() {
        let path = Path::from_keys(["a", "b"]);
        assert!(truncate_until(&path, "missing").is_empty());
    }

    #[test]
    fn for_each_container_mutates_in_place() {
        let mut doc = json!({"a": {"flag": 1}, "b": [{"flag": 2}]});
        for_each_container_with_key(&mut doc, "flag", &mut |map| {
            map.insert("seen".into(), json!(true));
        });
        assert_eq!(doc["a"]["seen"], json!(true));
        assert_eq!(doc["b"][0]["seen"], json!(true));
    }
}
