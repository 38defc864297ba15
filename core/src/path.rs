#![deny(missing_docs)]

//! # Path Normalization
//!
//! Converts a raw declared path, which may embed colon-style parameters and a
//! literal query string, into an OpenAPI path template plus its parameters.
//!
//! `samples/:id/another?yearMonth=2021-01` becomes `/samples/{id}/another`
//! with a query parameter `yearMonth` followed by a path parameter `id`.

use crate::error::{AppError, AppResult};
use serde::Serialize;

/// Where a derived parameter is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    /// URL path segment, e.g. `/users/{id}`.
    Path,
    /// URL query string, e.g. `/users?page=1`.
    Query,
}

/// A parameter derived from a declared path. Always required, always a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathParam {
    /// Parameter name.
    pub name: String,
    /// Whether it's from Path or Query.
    pub location: ParamLocation,
}

impl PathParam {
    fn path(name: &str) -> Self {
        Self {
            name: name.to_string(),
            location: ParamLocation::Path,
        }
    }

    fn query(name: &str) -> Self {
        Self {
            name: name.to_string(),
            location: ParamLocation::Query,
        }
    }

    /// Derived parameters are always required.
    pub fn required(&self) -> bool {
        true
    }
}

/// Canonical path template and its ordered parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPath {
    /// Leading-slash path with `{name}` substitutions and no query string.
    pub path: String,
    /// Query parameters in declaration order, then path parameters left to right.
    pub parameters: Vec<PathParam>,
}

/// Normalizes a raw declared path.
///
/// A trailing slash is part of route identity and is kept. Empty query
/// fragments (`?` alone, or `a=1&`) are skipped.
///
/// # Errors
///
/// Returns [`AppError::MalformedQueryFragment`] for a query fragment without `=`.
pub fn normalize_path(raw: &str) -> AppResult<NormalizedPath> {
    let prefixed = if raw.starts_with('/') {
        raw.to_string()
    } else {
        format!("/{}", raw)
    };

    let (path, query) = match prefixed.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (prefixed.as_str(), None),
    };

    let mut parameters = Vec::new();

    // The literal value only documents an example; it never types the parameter.
    for fragment in query.into_iter().flat_map(|q| q.split('&')) {
        if fragment.is_empty() {
            continue;
        }
        let (key, _example) = fragment.split_once('=').ok_or_else(|| {
            AppError::MalformedQueryFragment {
                path: raw.to_string(),
                fragment: fragment.to_string(),
            }
        })?;
        parameters.push(PathParam::query(key));
    }

    let path = path
        .split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) => {
                parameters.push(PathParam::path(name));
                format!("{{{}}}", name)
            }
            None => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/");

    Ok(NormalizedPath { path, parameters })
}
