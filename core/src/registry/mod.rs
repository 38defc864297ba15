#![deny(missing_docs)]

//! # Endpoint Registry
//!
//! Ordered storage of environments, frontend identifiers and endpoint
//! declarations. The registry is a mutable builder during start-up; sealing it
//! validates and normalizes every declaration and yields the read-only
//! [`SealedRegistry`] the compilers consume.
//!
//! Insertion order is preserved everywhere and drives output order.

use crate::error::{AppError, AppResult};
use crate::model::{Endpoint, Environment};
use crate::path::{normalize_path, NormalizedPath};
use crate::schema::collector::{SchemaCollector, SchemaPool, SchemaRef};
use crate::schema::reflect::Reflector;
use std::collections::HashSet;
use tracing::debug;

pub mod group;

pub use group::EndpointGroup;

/// Mutable registry builder.
#[derive(Debug, Default)]
pub struct Registry {
    environments: Vec<Environment>,
    frontends: Vec<String>,
    endpoints: Vec<Endpoint>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a supported API version.
    pub fn add_environment(&mut self, environment: Environment) -> &mut Self {
        self.environments.push(environment);
        self
    }

    /// Adds several API versions, keeping their order.
    pub fn add_environments(&mut self, environments: impl IntoIterator<Item = Environment>) -> &mut Self {
        self.environments.extend(environments);
        self
    }

    /// Adds a frontend identifier, e.g. `guest`, `manager` or `admin`.
    pub fn add_frontend(&mut self, frontend: impl Into<String>) -> &mut Self {
        self.frontends.push(frontend.into());
        self
    }

    /// Adds several frontend identifiers, keeping their order.
    pub fn add_frontends<I, S>(&mut self, frontends: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.frontends.extend(frontends.into_iter().map(Into::into));
        self
    }

    /// Appends an endpoint declaration.
    pub fn add_endpoint(&mut self, endpoint: Endpoint) -> &mut Self {
        self.endpoints.push(endpoint);
        self
    }

    /// Opens a group whose endpoints share a path prefix.
    pub fn group(&mut self, prefix: impl Into<String>) -> EndpointGroup<'_> {
        EndpointGroup::new(self, prefix.into())
    }

    /// Registered environments.
    pub fn environments(&self) -> &[Environment] {
        &self.environments
    }

    /// Registered frontend identifiers.
    pub fn frontends(&self) -> &[String] {
        &self.frontends
    }

    /// Registered endpoints in declaration order.
    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    /// Checks endpoint uniqueness.
    ///
    /// Names must be unique, and so must the raw declared `(path, method)` pair.
    /// Paths are compared as declared, before normalization.
    pub fn validate(&self) -> AppResult<()> {
        let mut names = HashSet::new();
        let mut routes = HashSet::new();

        for endpoint in &self.endpoints {
            if !names.insert(endpoint.name()) {
                return Err(AppError::DuplicateEndpointName {
                    name: endpoint.name().to_string(),
                });
            }
            if !routes.insert((endpoint.path(), endpoint.method())) {
                return Err(AppError::DuplicatePathAndMethod {
                    path: endpoint.path().to_string(),
                    method: endpoint.method().to_string(),
                });
            }
        }
        Ok(())
    }

    /// Validates and normalizes the registry, ending the build phase.
    ///
    /// # Errors
    ///
    /// Fails on duplicate endpoints and on malformed query fragments.
    pub fn seal(self) -> AppResult<SealedRegistry> {
        self.validate()?;

        let endpoints = self
            .endpoints
            .into_iter()
            .map(|endpoint| {
                let normalized = normalize_path(endpoint.path())?;
                Ok(RegisteredEndpoint {
                    endpoint,
                    normalized,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        debug!(
            environments = self.environments.len(),
            frontends = self.frontends.len(),
            endpoints = endpoints.len(),
            "registry sealed"
        );

        Ok(SealedRegistry {
            environments: self.environments,
            frontends: self.frontends,
            endpoints,
        })
    }
}

/// An endpoint together with its normalized path.
#[derive(Debug, Clone)]
pub struct RegisteredEndpoint {
    endpoint: Endpoint,
    normalized: NormalizedPath,
}

impl RegisteredEndpoint {
    /// The declaration as registered.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Canonical path template and parameters.
    pub fn normalized(&self) -> &NormalizedPath {
        &self.normalized
    }
}

/// Collected payload references of one endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payloads {
    /// Request payload, if declared.
    pub request: Option<SchemaRef>,
    /// Response payload, if declared.
    pub response: Option<SchemaRef>,
}

/// Payload references for every endpoint plus the shared pool they point into.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectedSchemas {
    /// One entry per endpoint, in declaration order.
    pub payloads: Vec<Payloads>,
    /// Shared definition pool.
    pub pool: SchemaPool,
}

/// Validated, read-only registry.
#[derive(Debug, Clone)]
pub struct SealedRegistry {
    environments: Vec<Environment>,
    frontends: Vec<String>,
    endpoints: Vec<RegisteredEndpoint>,
}

impl SealedRegistry {
    /// Registered environments.
    pub fn environments(&self) -> &[Environment] {
        &self.environments
    }

    /// Registered frontend identifiers.
    pub fn frontends(&self) -> &[String] {
        &self.frontends
    }

    /// Registered endpoints in declaration order.
    pub fn endpoints(&self) -> &[RegisteredEndpoint] {
        &self.endpoints
    }

    /// Reflects every payload type into a fresh pool.
    ///
    /// Endpoints are visited in declaration order, request before response.
    pub fn collect_schemas(&self, reflector: &dyn Reflector) -> AppResult<CollectedSchemas> {
        let mut collector = SchemaCollector::new(reflector);
        let payloads = self
            .endpoints
            .iter()
            .map(|registered| {
                let endpoint = registered.endpoint();
                Ok(Payloads {
                    request: collector.collect(endpoint.request())?,
                    response: collector.collect(endpoint.response())?,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(CollectedSchemas {
            payloads,
            pool: collector.into_pool(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Domain, Method};

    fn registry_with(endpoints: Vec<Endpoint>) -> Registry {
        let mut registry = Registry::new();
        for endpoint in endpoints {
            registry.add_endpoint(endpoint);
        }
        registry
    }

    #[test]
    fn test_duplicate_name_regardless_of_path() {
        let registry = registry_with(vec![
            Endpoint::get("getUser", "/users/:id"),
            Endpoint::post("getUser", "/accounts"),
        ]);
        match registry.validate() {
            Err(AppError::DuplicateEndpointName { name }) => assert_eq!(name, "getUser"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_path_and_method() {
        let registry = registry_with(vec![
            Endpoint::get("a", "users/:id"),
            Endpoint::get("b", "users/:id"),
        ]);
        match registry.validate() {
            Err(AppError::DuplicatePathAndMethod { path, method }) => {
                assert_eq!(path, "users/:id");
                assert_eq!(method, "GET");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_raw_paths_are_compared_before_normalization() {
        let registry = registry_with(vec![
            Endpoint::get("a", "users/:id"),
            Endpoint::get("b", "/users/:id"),
            Endpoint::new("c", Method::Delete, "users/:id"),
        ]);
        assert!(registry.validate().is_ok());
    }

    #[test]
    fn test_seal_normalizes_and_keeps_order() {
        let mut registry = Registry::new();
        registry
            .add_environment(Environment::new("v1", Domain::default()))
            .add_frontends(["guest", "admin"])
            .add_endpoint(Endpoint::get("b", "b/:id"))
            .add_endpoint(Endpoint::get("a", "/a"));

        let sealed = registry.seal().unwrap();
        let paths: Vec<&str> = sealed
            .endpoints()
            .iter()
            .map(|e| e.normalized().path.as_str())
            .collect();
        assert_eq!(paths, vec!["/b/{id}", "/a"]);
        assert_eq!(sealed.frontends(), ["guest", "admin"]);
        assert_eq!(sealed.environments()[0].version, "v1");
    }

    #[test]
    fn test_seal_rejects_malformed_query() {
        let registry = registry_with(vec![Endpoint::get("a", "/a").with_query("broken")]);
        assert!(matches!(
            registry.seal(),
            Err(AppError::MalformedQueryFragment { .. })
        ));
    }
}
