//! Error types for document conversion and payload validation.

use std::path::PathBuf;
use thiserror::Error;

/// Errors during conversion of an API document to JSON Schema.
#[derive(Debug, Error)]
pub enum ConvertError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to load reference \"{reference}\": {source}")]
    ReferenceLoad {
        reference: String,
        #[source]
        source: Box<ConvertError>,
    },

    // Parse errors (exit code 2)
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid YAML: {source}")]
    InvalidYaml {
        #[source]
        source: serde_yaml::Error,
    },

    // Document errors (exit code 2)
    #[error("schema at {path} has no type, combinator or $ref")]
    StructuralParse { path: String },

    #[error("malformed reference \"{reference}\": no definition name suffix")]
    MalformedReference { reference: String },

    #[error("fragment not found: {fragment}")]
    FragmentNotFound { fragment: String },

    #[error("dangling pointer: {pointer}")]
    Dereference { pointer: String },
}

impl ConvertError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ConvertError::FileNotFound { .. } | ConvertError::ReadError { .. } => 3,
            #[cfg(feature = "remote")]
            ConvertError::NetworkError { .. } => 3,
            ConvertError::ReferenceLoad { source, .. } => source.exit_code(),
            _ => 2,
        }
    }
}

/// Errors during validation of a payload against a converted schema.
#[derive(Debug, Error)]
pub enum ValidateError {
    #[error(transparent)]
    Convert(#[from] ConvertError),

    #[error("validation failed with {} error(s)", errors.len())]
    Invalid { errors: Vec<SchemaError> },
}

impl ValidateError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ValidateError::Convert(e) => e.exit_code(),
            ValidateError::Invalid { .. } => 1,
        }
    }
}

/// Single validation error with path context.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SchemaError {
    /// JSON Pointer (RFC 6901) to the invalid field.
    pub path: String,
    /// Human-readable error message.
    pub message: String,
}

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}
