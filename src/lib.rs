//! API document to JSON Schema converter
//!
//! Transforms Swagger 2, OpenAPI 3 and AsyncAPI 2 description documents
//! into a single JSON Schema (draft-07) usable for validating runtime
//! payloads: external reference fragments are pulled into one flat
//! namespace, inline operation schemas become named top-level
//! properties, the `nullable` marker becomes a type union, and
//! `required` flags are normalized into per-object name lists.
//!
//! # Example
//!
//! ```
//! use api_schema::{convert, ConvertOptions, FsLoader};
//! use serde_json::json;
//!
//! let doc = json!({
//!     "swagger": "2.0",
//!     "info": { "title": "Petstore", "version": "1.0.0" },
//!     "paths": {
//!         "/pets": {
//!             "get": {
//!                 "responses": {
//!                     "200": {
//!                         "schema": {
//!                             "type": "array",
//!                             "items": { "$ref": "#/definitions/Pet" }
//!                         }
//!                     }
//!                 }
//!             }
//!         }
//!     },
//!     "definitions": {
//!         "Pet": { "type": "object" }
//!     }
//! });
//!
//! let options = ConvertOptions::new().resolve_refs(false);
//! let schema = convert(doc, &options, &FsLoader).unwrap().unwrap();
//!
//! assert_eq!(schema["title"], "Petstore");
//! assert_eq!(
//!     schema["properties"]["arrayOfPet"]["items"]["$ref"],
//!     "#/definitions/Pet"
//! );
//! assert_eq!(schema["required"][0], "schemaVersion");
//! ```
//!
//! Documents whose version field is absent or unsupported convert to
//! `Ok(None)` rather than an error; all pipeline failures (unloadable
//! references, structurally broken schemas, dangling pointers) abort the
//! whole conversion.

mod assemble;
mod error;
mod fixups;
mod loader;
mod nullable;
mod refs;
mod synth;
mod tree;
mod types;
mod validator;

pub use assemble::convert;
pub use error::{ConvertError, SchemaError, ValidateError};
pub use fixups::{apply_fixups, migrate_required_flags, repair_array_items};
pub use loader::{
    is_url, load_document, load_document_auto, load_document_str, navigate_fragment,
    FragmentLoader, FsLoader,
};
pub use nullable::convert_nullables;
pub use refs::{
    dereference, resolve_external_refs, rewrite_pointer_prefix, COMPONENTS_PREFIX,
    DEFINITIONS_PREFIX,
};
pub use synth::{synthesize_properties, SynthesizedProperties};
pub use tree::{find_containers_with_key, find_paths, truncate_until, Path, Segment};
pub use types::{ConvertOptions, SpecKind, DEFAULT_SCHEMA_URI};
pub use validator::validate_payload;

#[cfg(feature = "remote")]
pub use loader::load_document_url;
