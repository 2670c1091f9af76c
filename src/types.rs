//! Core types for document conversion.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `$schema` value written to the output when none is configured.
pub const DEFAULT_SCHEMA_URI: &str = "http://json-schema.org/draft-07/schema#";

/// Supported API description formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecKind {
    /// Swagger 2.x (`swagger: "2.0"`), definitions under `definitions`.
    Swagger2,
    /// OpenAPI 3.x, definitions under `components.schemas`.
    OpenApi3,
    /// AsyncAPI 2.x, definitions under `components.schemas`.
    AsyncApi2,
}

impl SpecKind {
    /// Detect the document format from its version field.
    ///
    /// Returns `None` when the version field is absent or the major
    /// version is outside the supported series. Unsupported input is not
    /// an error at this boundary.
    pub fn detect(doc: &Value) -> Option<SpecKind> {
        if major_version(doc, "swagger") == Some(2) {
            return Some(SpecKind::Swagger2);
        }
        if major_version(doc, "openapi") == Some(3) {
            return Some(SpecKind::OpenApi3);
        }
        if major_version(doc, "asyncapi") == Some(2) {
            return Some(SpecKind::AsyncApi2);
        }
        None
    }

    /// Whether the named-type catalog lives under `components.schemas`
    /// rather than top-level `definitions`.
    pub fn uses_components(self) -> bool {
        !matches!(self, SpecKind::Swagger2)
    }
}

fn major_version(doc: &Value, field: &str) -> Option<u64> {
    let version = doc.get(field)?.as_str()?;
    version.split('.').next()?.parse().ok()
}

/// Options for document conversion.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Resolve external reference fragments and dereference all internal
    /// pointers. When false, `$ref` strings survive into the output.
    pub resolve_refs: bool,
    /// Value for the output `$schema` field.
    pub schema_uri: String,
    /// Value for the output `$id` field; omitted entirely when absent.
    pub id: Option<String>,
    /// Value for the output `additionalProperties` field.
    pub additional_properties: bool,
    /// Directory against which relative reference paths are resolved.
    pub root_dir: PathBuf,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            resolve_refs: true,
            schema_uri: DEFAULT_SCHEMA_URI.to_string(),
            id: None,
            additional_properties: false,
            root_dir: PathBuf::from("."),
        }
    }
}

impl ConvertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable reference resolution.
    pub fn resolve_refs(mut self, resolve: bool) -> Self {
        self.resolve_refs = resolve;
        self
    }

    /// Override the output `$schema` value.
    pub fn schema_uri(mut self, uri: impl Into<String>) -> Self {
        self.schema_uri = uri.into();
        self
    }

    /// Set the output `$id` value.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the output `additionalProperties` value.
    pub fn additional_properties(mut self, allow: bool) -> Self {
        self.additional_properties = allow;
        self
    }

    /// Set the directory for resolving relative reference paths.
    pub fn root_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.root_dir = dir.into();
        self
    }
}
