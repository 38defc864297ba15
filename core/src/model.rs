#![deny(missing_docs)]

//! # Registry Model
//!
//! Declarative descriptions of environments and endpoints as accumulated by the
//! registry. Endpoints are built with consuming `with_*` setters and never
//! change once handed to the registry.

use crate::schema::reflect::TypeDescriptor;
use derive_more::Display;
use indexmap::IndexSet;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// Base URLs of one API version across deployment tiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    /// Local machine.
    pub local: String,
    /// Local machine against development backends.
    pub local_dev: String,
    /// Shared development deployment.
    pub dev: String,
    /// Production deployment.
    pub prod: String,
}

/// One supported API version and its base URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    /// Version identifier, e.g. `v1`.
    pub version: String,
    /// Base URLs per deployment tier.
    pub domain: Domain,
}

impl Environment {
    /// Creates an environment for `version`.
    pub fn new(version: impl Into<String>, domain: Domain) -> Self {
        Self {
            version: version.into(),
            domain,
        }
    }
}

/// Authentication scheme attached to an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum AuthScheme {
    /// Bearer token in `Authorization`.
    #[display("Bearer")]
    Bearer,
    /// Access token in `X-Access-Token`.
    #[display("ApiKey")]
    ApiKey,
}

impl AuthScheme {
    /// The request header carrying the credential.
    pub fn header_name(&self) -> &'static str {
        match self {
            AuthScheme::Bearer => "Authorization",
            AuthScheme::ApiKey => "X-Access-Token",
        }
    }
}

impl Serialize for AuthScheme {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("AuthScheme", 2)?;
        state.serialize_field("type", &self.to_string())?;
        state.serialize_field("header", self.header_name())?;
        state.end()
    }
}

/// HTTP methods an endpoint can be declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    /// `GET`
    #[display("GET")]
    Get,
    /// `POST`
    #[display("POST")]
    Post,
    /// `PUT`
    #[display("PUT")]
    Put,
    /// `PATCH`
    #[display("PATCH")]
    Patch,
    /// `DELETE`
    #[display("DELETE")]
    Delete,
}

impl Method {
    /// Whether a request body is documented for this method.
    pub fn accepts_body(&self) -> bool {
        matches!(self, Method::Post | Method::Put | Method::Patch)
    }
}

/// One declared API operation.
#[derive(Debug, Clone)]
pub struct Endpoint {
    name: String,
    path: String,
    description: String,
    method: Method,
    auth_scheme: Option<AuthScheme>,
    request: Option<TypeDescriptor>,
    response: Option<TypeDescriptor>,
    versions: IndexSet<String>,
    frontends: IndexSet<String>,
}

impl Endpoint {
    /// Creates an endpoint. `path` may embed `:param` segments and a literal query string.
    pub fn new(name: impl Into<String>, method: Method, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            description: String::new(),
            method,
            auth_scheme: None,
            request: None,
            response: None,
            versions: IndexSet::new(),
            frontends: IndexSet::new(),
        }
    }

    /// Shorthand for a `GET` endpoint.
    pub fn get(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(name, Method::Get, path)
    }

    /// Shorthand for a `POST` endpoint.
    pub fn post(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(name, Method::Post, path)
    }

    /// Shorthand for a `PUT` endpoint.
    pub fn put(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(name, Method::Put, path)
    }

    /// Shorthand for a `PATCH` endpoint.
    pub fn patch(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(name, Method::Patch, path)
    }

    /// Shorthand for a `DELETE` endpoint.
    pub fn delete(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(name, Method::Delete, path)
    }

    /// Sets the human-readable description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Appends a literal query string, e.g. `yearMonth=2021-01`.
    ///
    /// An empty query leaves the path untouched.
    pub fn with_query(mut self, query: &str) -> Self {
        if !query.is_empty() {
            self.path = format!("{}?{}", self.path, query);
        }
        self
    }

    /// Sets the authentication scheme.
    pub fn with_auth(mut self, scheme: AuthScheme) -> Self {
        self.auth_scheme = Some(scheme);
        self
    }

    /// Sets the request payload type.
    pub fn with_request(mut self, descriptor: TypeDescriptor) -> Self {
        self.request = Some(descriptor);
        self
    }

    /// Sets the response payload type.
    pub fn with_response(mut self, descriptor: TypeDescriptor) -> Self {
        self.response = Some(descriptor);
        self
    }

    /// Adds API versions this endpoint belongs to.
    pub fn with_versions<I, S>(mut self, versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.versions.extend(versions.into_iter().map(Into::into));
        self
    }

    /// Adds frontends this endpoint is exposed to.
    pub fn with_frontends<I, S>(mut self, frontends: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.frontends.extend(frontends.into_iter().map(Into::into));
        self
    }

    /// Prefixes the declared path and prepends inherited versions and frontends.
    pub(crate) fn inherit(
        mut self,
        prefix: &str,
        versions: &IndexSet<String>,
        frontends: &IndexSet<String>,
    ) -> Self {
        self.path = format!("{}{}", prefix, self.path);
        self.versions = versions.iter().cloned().chain(self.versions).collect();
        self.frontends = frontends.iter().cloned().chain(self.frontends).collect();
        self
    }

    /// Unique endpoint name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw declared path, including any literal query string.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Human-readable description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// HTTP method.
    pub fn method(&self) -> Method {
        self.method
    }

    /// Authentication scheme, `None` when unauthenticated.
    pub fn auth_scheme(&self) -> Option<AuthScheme> {
        self.auth_scheme
    }

    /// Request payload type.
    pub fn request(&self) -> Option<&TypeDescriptor> {
        self.request.as_ref()
    }

    /// Response payload type.
    pub fn response(&self) -> Option<&TypeDescriptor> {
        self.response.as_ref()
    }

    /// Declared versions. Empty means every version.
    pub fn versions(&self) -> &IndexSet<String> {
        &self.versions
    }

    /// Declared frontends. Empty means every frontend.
    pub fn frontends(&self) -> &IndexSet<String> {
        &self.frontends
    }

    /// Whether the endpoint is part of `version`.
    pub fn in_version(&self, version: &str) -> bool {
        self.versions.is_empty() || self.versions.contains(version)
    }

    /// Whether the endpoint is exposed to `frontend`.
    pub fn in_frontend(&self, frontend: &str) -> bool {
        self.frontends.is_empty() || self.frontends.contains(frontend)
    }
}
