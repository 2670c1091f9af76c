//! Document loading from various sources.
//!
//! API descriptions arrive as YAML or JSON, from files, strings, and HTTP
//! URLs. Everything is parsed into `serde_json::Value` (`preserve_order`
//! keeps member order, which later pipeline stages rely on).

use std::path::Path;

use serde_json::Value;

use crate::error::ConvertError;

#[cfg(feature = "remote")]
use std::time::Duration;

/// Default timeout for HTTP requests (10 seconds).
#[cfg(feature = "remote")]
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Load a document from a file path. YAML and JSON are both accepted.
///
/// # Errors
///
/// Returns `ConvertError::FileNotFound` if the file doesn't exist,
/// `ConvertError::InvalidJson`/`InvalidYaml` if it doesn't parse.
pub fn load_document(path: &Path) -> Result<Value, ConvertError> {
    if !path.exists() {
        return Err(ConvertError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConvertError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    if is_yaml {
        serde_yaml::from_str(&content).map_err(|source| ConvertError::InvalidYaml { source })
    } else {
        load_document_str(&content)
    }
}

/// Parse a document from a string. Tries JSON first, then YAML.
///
/// # Errors
///
/// Returns `ConvertError::InvalidJson` when the content parses as
/// neither (the JSON error is the more precise diagnostic for
/// brace-delimited input).
pub fn load_document_str(content: &str) -> Result<Value, ConvertError> {
    match serde_json::from_str(content) {
        Ok(doc) => Ok(doc),
        Err(json_err) => serde_yaml::from_str(content)
            .map_err(|_| ConvertError::InvalidJson { source: json_err }),
    }
}

/// Load a document from an HTTP/HTTPS URL.
///
/// Requires the `remote` feature (enabled by default).
///
/// # Errors
///
/// Returns `ConvertError::NetworkError` if the request fails, or a parse
/// error if the response body is neither JSON nor YAML.
#[cfg(feature = "remote")]
pub fn load_document_url(url: &str) -> Result<Value, ConvertError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(|source| ConvertError::NetworkError {
            url: url.to_string(),
            source,
        })?;

    let response = client
        .get(url)
        .send()
        .map_err(|source| ConvertError::NetworkError {
            url: url.to_string(),
            source,
        })?;

    // Check for HTTP errors before parsing
    let response = response
        .error_for_status()
        .map_err(|source| ConvertError::NetworkError {
            url: url.to_string(),
            source,
        })?;

    let body = response
        .text()
        .map_err(|source| ConvertError::NetworkError {
            url: url.to_string(),
            source,
        })?;

    load_document_str(&body)
}

/// Load a document from a file path or URL.
///
/// Automatically detects whether the source is a URL or file path.
/// URL loading requires the `remote` feature.
pub fn load_document_auto(source: &str) -> Result<Value, ConvertError> {
    if is_url(source) {
        #[cfg(feature = "remote")]
        {
            load_document_url(source)
        }
        #[cfg(not(feature = "remote"))]
        {
            Err(ConvertError::FileNotFound {
                path: std::path::PathBuf::from(source),
            })
        }
    } else {
        load_document(Path::new(source))
    }
}

/// Check if a string looks like a URL (starts with http:// or https://).
pub fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Navigate a JSON Pointer fragment (e.g., "#/components/schemas/Pet").
///
/// Returns the value at the given JSON Pointer path within the document.
/// The fragment should start with '#'.
pub fn navigate_fragment(doc: &Value, fragment: &str) -> Result<Value, ConvertError> {
    let path = fragment.trim_start_matches('#').trim_start_matches('/');
    if path.is_empty() {
        return Ok(doc.clone());
    }

    let mut current = doc;
    for part in path.split('/') {
        // Unescape JSON Pointer encoding (~1 = /, ~0 = ~)
        let key = part.replace("~1", "/").replace("~0", "~");
        current = current
            .get(&key)
            .ok_or_else(|| ConvertError::FragmentNotFound {
                fragment: fragment.to_string(),
            })?;
    }
    Ok(current.clone())
}

/// Capability for loading external reference fragments.
///
/// Injected into the reference rewriter so conversion stays independent
/// of transport. Given a reference string (URL, or path relative to
/// `root_dir`, optionally suffixed with a `#/...` fragment), returns the
/// parsed fragment document.
pub trait FragmentLoader {
    fn load(&self, reference: &str, root_dir: &Path) -> Result<Value, ConvertError>;
}

/// Default loader over the filesystem and (with the `remote` feature) HTTP.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLoader;

impl FragmentLoader for FsLoader {
    fn load(&self, reference: &str, root_dir: &Path) -> Result<Value, ConvertError> {
        let (file_part, fragment) = match reference.find('#') {
            Some(idx) => (&reference[..idx], Some(&reference[idx..])),
            None => (reference, None),
        };

        let loaded = if is_url(file_part) {
            load_document_auto(file_part)?
        } else {
            load_document(&root_dir.join(file_part))?
        };

        match fragment {
            Some(frag) => navigate_fragment(&loaded, frag),
            None => Ok(loaded),
        }
    }
}
