#![deny(missing_docs)]

//! # Endpoints Core
//!
//! Declarative API endpoint registry compiled into two artifacts: a versioned,
//! frontend-filtered endpoint manifest and an OpenAPI 3.0 document.
//!
//! ```no_run
//! use endpoints_core::{
//!     compile_manifest, compile_openapi, write_manifest, write_openapi_yaml, Domain, Endpoint,
//!     Environment, OpenApiConfig, Registry, SchemarsReflector,
//! };
//!
//! # fn main() -> endpoints_core::AppResult<()> {
//! let mut registry = Registry::new();
//! registry
//!     .add_environment(Environment::new("v1", Domain::default()))
//!     .add_frontends(["guest", "admin"])
//!     .add_endpoint(Endpoint::get("getOwner", "owners/:id"));
//! let registry = registry.seal()?;
//!
//! let reflector = SchemarsReflector::default();
//! write_manifest(&compile_manifest(&registry, &reflector)?, ".endpoints.json")?;
//! let config = OpenApiConfig::default();
//! write_openapi_yaml(&compile_openapi(&registry, &config, &reflector)?, "openapi.yaml")?;
//! # Ok(())
//! # }
//! ```

/// Shared error types.
pub mod error;

/// Environments, endpoints and their attributes.
pub mod model;

/// Path template normalization.
pub mod path;

/// Endpoint registry and sealing.
pub mod registry;

/// Payload reflection and schema translation.
pub mod schema;

/// Manifest compilation.
pub mod manifest;

/// OpenAPI compilation.
pub mod openapi;

/// Artifact rendering and file output.
pub mod output;

pub use error::{AppError, AppResult};
pub use manifest::{compile_manifest, Manifest, ManifestCompiler, ManifestEntry, ManifestSlice};
pub use model::{AuthScheme, Domain, Endpoint, Environment, Method};
pub use openapi::{compile_openapi, OpenApiCompiler, OpenApiConfig, TagPrefix};
pub use output::{
    manifest_bytes, openapi_json_bytes, openapi_yaml_bytes, unescape_html, write_manifest,
    write_openapi_json, write_openapi_yaml,
};
pub use path::{normalize_path, NormalizedPath, ParamLocation, PathParam};
pub use registry::{EndpointGroup, Registry, SealedRegistry};
pub use schema::{Reflection, Reflector, SchemaPool, SchemaRef, SchemarsReflector, TypeDescriptor};
