#![deny(missing_docs)]

//! # Output
//!
//! Renders compiled artifacts to bytes and writes them to disk.
//!
//! Manifest bytes go through [`unescape_html`], so `<`, `>` and `&` appear
//! literally even when an encoder escaped them as `\u003c`, `\u003e`, `\u0026`.

use crate::error::{AppError, AppResult};
use crate::manifest::Manifest;
use openapiv3::OpenAPI;
use std::fs;
use std::path::Path;
use tracing::info;

const HTML_ESCAPES: [(&str, char); 3] = [("\\u003c", '<'), ("\\u003e", '>'), ("\\u0026", '&')];

/// Reverses the HTML-safe escapes of a JSON document.
///
/// Only genuine escape sequences are rewritten: in `\\u003c` the backslash is
/// itself escaped, so the text is left as is.
pub fn unescape_html(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    let mut rest = json;

    while let Some(pos) = rest.find('\\') {
        out.push_str(&rest[..pos]);
        let escape = &rest[pos..];
        match HTML_ESCAPES.iter().find(|(seq, _)| escape.starts_with(seq)) {
            Some((seq, ch)) => {
                out.push(*ch);
                rest = &escape[seq.len()..];
            }
            None => {
                // Copy the backslash with the character it escapes.
                let len = escape[1..].chars().next().map_or(1, |c| 1 + c.len_utf8());
                out.push_str(&escape[..len]);
                rest = &escape[len..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Pretty JSON of the manifest, newline terminated, with HTML escapes reversed.
pub fn manifest_bytes(manifest: &Manifest) -> AppResult<Vec<u8>> {
    let json = serde_json::to_string_pretty(manifest)
        .map_err(|e| AppError::Serialization(format!("Manifest JSON serialization failed: {}", e)))?;
    let mut out = unescape_html(&json);
    out.push('\n');
    Ok(out.into_bytes())
}

/// Pretty JSON of an OpenAPI document.
pub fn openapi_json_bytes(open_api: &OpenAPI) -> AppResult<Vec<u8>> {
    serde_json::to_vec_pretty(open_api)
        .map_err(|e| AppError::Serialization(format!("OpenAPI JSON serialization failed: {}", e)))
}

/// YAML of an OpenAPI document.
pub fn openapi_yaml_bytes(open_api: &OpenAPI) -> AppResult<Vec<u8>> {
    serde_yaml::to_string(open_api)
        .map(String::into_bytes)
        .map_err(|e| AppError::Serialization(format!("OpenAPI YAML serialization failed: {}", e)))
}

/// Writes the manifest to `path`, creating parent directories.
pub fn write_manifest(manifest: &Manifest, path: impl AsRef<Path>) -> AppResult<()> {
    write_artifact(path.as_ref(), &manifest_bytes(manifest)?)
}

/// Writes an OpenAPI document as JSON.
pub fn write_openapi_json(open_api: &OpenAPI, path: impl AsRef<Path>) -> AppResult<()> {
    write_artifact(path.as_ref(), &openapi_json_bytes(open_api)?)
}

/// Writes an OpenAPI document as YAML.
pub fn write_openapi_yaml(open_api: &OpenAPI, path: impl AsRef<Path>) -> AppResult<()> {
    write_artifact(path.as_ref(), &openapi_yaml_bytes(open_api)?)
}

fn write_artifact(path: &Path, bytes: &[u8]) -> AppResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, bytes)?;
    info!(path = %path.display(), bytes = bytes.len(), "artifact written");
    Ok(())
}
