#![deny(missing_docs)]

//! # Manifest Compiler
//!
//! Renders the internal endpoint catalog consumed by frontends. The document is
//! keyed per API version, and per `<frontend>-<version>` pair, each slice
//! carrying the version's domain and the endpoints visible to it. A trailing
//! `$defs` key holds the shared schema pool the payload references point into.

use crate::error::AppResult;
use crate::model::{AuthScheme, Domain, Endpoint, Method};
use crate::registry::{CollectedSchemas, SealedRegistry};
use crate::schema::collector::{SchemaPool, SchemaRef};
use crate::schema::reflect::Reflector;
use indexmap::IndexMap;
use serde::Serialize;

/// One endpoint as listed in a manifest slice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManifestEntry {
    /// Raw declared path without its leading slash.
    pub path: String,
    /// Endpoint description.
    pub desc: String,
    /// HTTP method.
    pub method: Method,
    /// Authentication scheme, `null` when unauthenticated.
    #[serde(rename = "authSchema")]
    pub auth_scheme: Option<AuthScheme>,
    /// Request payload reference.
    pub request: Option<SchemaRef>,
    /// Response payload reference.
    pub response: Option<SchemaRef>,
}

/// Endpoints of one slice keyed by endpoint name.
pub type ManifestApi = IndexMap<String, ManifestEntry>;

/// One version (or version-frontend) slice of the manifest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManifestSlice {
    /// Base URLs of the version.
    pub env: Domain,
    /// Endpoints visible in this slice.
    pub api: ManifestApi,
}

/// The complete manifest document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Manifest {
    /// Slices in environment order, each version followed by its frontend slices.
    #[serde(flatten)]
    pub slices: IndexMap<String, ManifestSlice>,
    /// Shared schema pool.
    #[serde(rename = "$defs")]
    pub definitions: SchemaPool,
}

/// Compiles manifest slices from a sealed registry.
///
/// Payload schemas are collected once when the compiler is created.
#[derive(Debug)]
pub struct ManifestCompiler<'a> {
    registry: &'a SealedRegistry,
    schemas: CollectedSchemas,
}

impl<'a> ManifestCompiler<'a> {
    /// Collects payload schemas for every endpoint of `registry`.
    pub fn new(registry: &'a SealedRegistry, reflector: &dyn Reflector) -> AppResult<Self> {
        let schemas = registry.collect_schemas(reflector)?;
        Ok(Self { registry, schemas })
    }

    /// Endpoints belonging to `version`.
    pub fn api_for_version(&self, version: &str) -> ManifestApi {
        self.api_where(|endpoint| endpoint.in_version(version))
    }

    /// Endpoints belonging to `version` and exposed to `frontend`.
    pub fn api_for_frontend(&self, version: &str, frontend: &str) -> ManifestApi {
        self.api_where(|endpoint| endpoint.in_version(version) && endpoint.in_frontend(frontend))
    }

    /// Builds the full document.
    pub fn compile(&self) -> Manifest {
        let mut slices = IndexMap::new();
        for environment in self.registry.environments() {
            slices.insert(
                environment.version.clone(),
                ManifestSlice {
                    env: environment.domain.clone(),
                    api: self.api_for_version(&environment.version),
                },
            );

            for frontend in self.registry.frontends() {
                slices.insert(
                    format!("{}-{}", frontend, environment.version),
                    ManifestSlice {
                        env: environment.domain.clone(),
                        api: self.api_for_frontend(&environment.version, frontend),
                    },
                );
            }
        }

        Manifest {
            slices,
            definitions: self.schemas.pool.clone(),
        }
    }

    fn api_where(&self, include: impl Fn(&Endpoint) -> bool) -> ManifestApi {
        self.registry
            .endpoints()
            .iter()
            .zip(&self.schemas.payloads)
            .filter(|(registered, _)| include(registered.endpoint()))
            .map(|(registered, payloads)| {
                let endpoint = registered.endpoint();
                let entry = ManifestEntry {
                    path: endpoint
                        .path()
                        .strip_prefix('/')
                        .unwrap_or(endpoint.path())
                        .to_string(),
                    desc: endpoint.description().to_string(),
                    method: endpoint.method(),
                    auth_scheme: endpoint.auth_scheme(),
                    request: payloads.request.clone(),
                    response: payloads.response.clone(),
                };
                (endpoint.name().to_string(), entry)
            })
            .collect()
    }
}

/// Compiles the manifest of `registry` in one call.
pub fn compile_manifest(registry: &SealedRegistry, reflector: &dyn Reflector) -> AppResult<Manifest> {
    Ok(ManifestCompiler::new(registry, reflector)?.compile())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Environment;
    use crate::registry::Registry;
    use crate::schema::reflect::SchemarsReflector;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn domain(tier: &str) -> Domain {
        Domain {
            local: format!("http://localhost/{}", tier),
            local_dev: format!("http://localhost:8080/{}", tier),
            dev: format!("https://dev.example.com/{}", tier),
            prod: format!("https://example.com/{}", tier),
        }
    }

    fn sealed() -> SealedRegistry {
        let mut registry = Registry::new();
        registry
            .add_environments([
                Environment::new("v1", domain("v1")),
                Environment::new("v2", domain("v2")),
            ])
            .add_frontends(["guest", "admin"])
            .add_endpoint(Endpoint::get("listItems", "/items").with_description("All items"))
            .add_endpoint(Endpoint::get("getItemV2", "items/:id").with_versions(["v2"]))
            .add_endpoint(
                Endpoint::delete("deleteItem", "/items/:id")
                    .with_frontends(["admin"])
                    .with_auth(AuthScheme::Bearer),
            );
        registry.seal().unwrap()
    }

    fn names(api: &ManifestApi) -> Vec<&str> {
        api.keys().map(String::as_str).collect()
    }

    #[test]
    fn test_version_filter() {
        let registry = sealed();
        let compiler = ManifestCompiler::new(&registry, &SchemarsReflector::default()).unwrap();

        assert_eq!(
            names(&compiler.api_for_version("v1")),
            vec!["listItems", "deleteItem"]
        );
        assert_eq!(
            names(&compiler.api_for_version("v2")),
            vec!["listItems", "getItemV2", "deleteItem"]
        );
    }

    #[test]
    fn test_frontend_filter() {
        let registry = sealed();
        let compiler = ManifestCompiler::new(&registry, &SchemarsReflector::default()).unwrap();

        assert_eq!(
            names(&compiler.api_for_frontend("v1", "guest")),
            vec!["listItems"]
        );
        assert_eq!(
            names(&compiler.api_for_frontend("v2", "admin")),
            vec!["listItems", "getItemV2", "deleteItem"]
        );
    }

    #[test]
    fn test_slice_keys_follow_environment_order() {
        let manifest = compile_manifest(&sealed(), &SchemarsReflector::default()).unwrap();
        assert_eq!(
            manifest.slices.keys().collect::<Vec<_>>(),
            vec!["v1", "guest-v1", "admin-v1", "v2", "guest-v2", "admin-v2"]
        );
        assert_eq!(manifest.slices["admin-v1"].env, domain("v1"));
    }

    #[test]
    fn test_entry_shape() {
        let manifest = compile_manifest(&sealed(), &SchemarsReflector::default()).unwrap();
        let value = serde_json::to_value(&manifest).unwrap();

        assert_eq!(
            value["v1"]["api"]["deleteItem"],
            json!({
                "path": "items/:id",
                "desc": "",
                "method": "DELETE",
                "authSchema": {"type": "Bearer", "header": "Authorization"},
                "request": null,
                "response": null
            })
        );
        assert_eq!(value["v1"]["api"]["listItems"]["path"], json!("items"));
        assert_eq!(value["$defs"], json!({}));
        assert_eq!(
            value.as_object().unwrap().keys().last().map(String::as_str),
            Some("$defs")
        );
    }
}
