#![deny(missing_docs)]

//! # Endpoint Groups
//!
//! Endpoints declared under a shared path prefix. Every endpoint added through
//! a group has the prefix prepended to its declared path, and the group's
//! versions and frontends placed ahead of its own.

use crate::model::Endpoint;
use crate::registry::Registry;
use indexmap::IndexSet;

/// Scoped view of a [`Registry`] that prefixes declared endpoints.
#[derive(Debug)]
pub struct EndpointGroup<'a> {
    registry: &'a mut Registry,
    prefix: String,
    versions: IndexSet<String>,
    frontends: IndexSet<String>,
}

impl<'a> EndpointGroup<'a> {
    pub(crate) fn new(registry: &'a mut Registry, prefix: String) -> Self {
        Self {
            registry,
            prefix,
            versions: IndexSet::new(),
            frontends: IndexSet::new(),
        }
    }

    /// Versions inherited by every endpoint of the group.
    pub fn with_versions<I, S>(mut self, versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.versions.extend(versions.into_iter().map(Into::into));
        self
    }

    /// Frontends inherited by every endpoint of the group.
    pub fn with_frontends<I, S>(mut self, frontends: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.frontends.extend(frontends.into_iter().map(Into::into));
        self
    }

    /// The path prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Adds `endpoint` under the group prefix.
    pub fn add(&mut self, endpoint: Endpoint) -> &mut Self {
        let endpoint = endpoint.inherit(&self.prefix, &self.versions, &self.frontends);
        self.registry.add_endpoint(endpoint);
        self
    }
}
