#![deny(missing_docs)]

//! # OpenAPI Compiler
//!
//! Builds an OpenAPI 3.0 document from a sealed registry:
//!
//! - one server per environment and deployment tier (`local`, `dev`, `prod`);
//! - one operation per endpoint, merged per canonical path;
//! - `components.schemas` translated from the shared schema pool;
//! - an optional document-wide `apiKey` security scheme named `auth`.

use crate::error::AppResult;
use crate::model::{Endpoint, Method};
use crate::path::{ParamLocation, PathParam};
use crate::registry::{CollectedSchemas, Payloads, RegisteredEndpoint, SealedRegistry};
use crate::schema::collector::SchemaRef;
use crate::schema::reflect::Reflector;
use crate::schema::translate::translate_ref;
use indexmap::IndexMap;
use openapiv3::{
    APIKeyLocation, Components, Info, MediaType, OpenAPI, Operation, Parameter, ParameterData,
    ParameterSchemaOrContent, PathItem, PathStyle, QueryStyle, ReferenceOr, RequestBody, Response,
    Schema, SchemaKind, SecurityScheme, Server, StatusCode, StringType, Tag, Type,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Name of the document-wide security scheme.
pub const SECURITY_SCHEME_NAME: &str = "auth";

const OPENAPI_VERSION: &str = "3.0.3";
const JSON_CONTENT_TYPE: &str = "application/json";
const GENERATED_DESCRIPTION: &str = "Generated by endpoints-core";

/// Tags every operation whose canonical path starts with `prefix`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagPrefix {
    /// Canonical path prefix, e.g. `/owners`.
    pub prefix: String,
    /// Tag name.
    pub tag: String,
}

impl TagPrefix {
    /// Creates a prefix-tag pair.
    pub fn new(prefix: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            tag: tag.into(),
        }
    }
}

/// Document-level settings.
///
/// Deserializes from camelCase keys, so tooling can keep it in a JSON or YAML file:
///
/// ```yaml
/// title: Pet Clinic
/// description: Internal API
/// tagsByPrefix:
///   - { prefix: /owners, tag: owners }
/// authHeader: X-Access-Token
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OpenApiConfig {
    /// `info.title`.
    pub title: String,
    /// `info.description`.
    pub description: String,
    /// `info.version`. Falls back to the first environment's version when empty.
    pub version: String,
    /// Ordered prefix-tag pairs.
    pub tags_by_prefix: Vec<TagPrefix>,
    /// Header carrying the API key. `None` omits the security scheme.
    pub auth_header: Option<String>,
}

/// Compiles an [`OpenAPI`] document from a sealed registry.
#[derive(Debug)]
pub struct OpenApiCompiler<'a> {
    registry: &'a SealedRegistry,
    config: &'a OpenApiConfig,
    schemas: CollectedSchemas,
}

impl<'a> OpenApiCompiler<'a> {
    /// Collects payload schemas for every endpoint of `registry`.
    pub fn new(
        registry: &'a SealedRegistry,
        config: &'a OpenApiConfig,
        reflector: &dyn Reflector,
    ) -> AppResult<Self> {
        let schemas = registry.collect_schemas(reflector)?;
        Ok(Self {
            registry,
            config,
            schemas,
        })
    }

    /// Builds the document.
    pub fn compile(&self) -> OpenAPI {
        let mut open_api = OpenAPI {
            openapi: OPENAPI_VERSION.to_string(),
            info: self.info(),
            servers: self.servers(),
            tags: self.tags(),
            components: Some(self.components()),
            ..Default::default()
        };
        open_api.paths.paths = self
            .path_items()
            .into_iter()
            .map(|(path, item)| (path, ReferenceOr::Item(item)))
            .collect();
        open_api
    }

    fn info(&self) -> Info {
        let version = if self.config.version.is_empty() {
            self.registry
                .environments()
                .first()
                .map(|env| env.version.clone())
                .unwrap_or_default()
        } else {
            self.config.version.clone()
        };

        Info {
            title: self.config.title.clone(),
            description: non_empty(&self.config.description),
            terms_of_service: None,
            contact: None,
            license: None,
            version,
            extensions: Default::default(),
        }
    }

    /// One server per environment for `local`, `dev` and `prod`.
    ///
    /// `localDev` is never listed.
    pub fn servers(&self) -> Vec<Server> {
        self.registry
            .environments()
            .iter()
            .flat_map(|env| {
                [
                    ("local", &env.domain.local),
                    ("dev", &env.domain.dev),
                    ("prod", &env.domain.prod),
                ]
                .into_iter()
                .map(move |(tier, url)| Server {
                    url: url.clone(),
                    description: Some(format!("{} at {}", env.version, tier)),
                    variables: None,
                    extensions: Default::default(),
                })
            })
            .collect()
    }

    fn tags(&self) -> Vec<Tag> {
        self.config
            .tags_by_prefix
            .iter()
            .map(|pair| Tag {
                name: pair.tag.clone(),
                description: Some(pair.tag.clone()),
                external_docs: None,
                extensions: Default::default(),
            })
            .collect()
    }

    fn components(&self) -> Components {
        let mut components = Components::default();
        for (name, definition) in self.schemas.pool.iter() {
            components
                .schemas
                .insert(name.clone(), translate_ref(definition));
        }

        if let Some(header) = &self.config.auth_header {
            components.security_schemes.insert(
                SECURITY_SCHEME_NAME.to_string(),
                ReferenceOr::Item(SecurityScheme::APIKey {
                    location: APIKeyLocation::Header,
                    name: header.clone(),
                    description: None,
                    extensions: Default::default(),
                }),
            );
        }
        components
    }

    fn path_items(&self) -> IndexMap<String, PathItem> {
        let mut paths: IndexMap<String, PathItem> = IndexMap::new();
        for (registered, payloads) in self.registry.endpoints().iter().zip(&self.schemas.payloads) {
            let endpoint = registered.endpoint();
            let canonical = &registered.normalized().path;
            let item = paths.entry(canonical.clone()).or_default();
            let slot = operation_slot(item, endpoint.method());
            if slot.is_some() {
                warn!(
                    path = %canonical,
                    method = %endpoint.method(),
                    endpoint = %endpoint.name(),
                    "operation replaced by a later endpoint with the same canonical path"
                );
            }
            *slot = Some(self.operation(registered, payloads));
        }
        paths
    }

    fn operation(&self, registered: &RegisteredEndpoint, payloads: &Payloads) -> Operation {
        let endpoint = registered.endpoint();
        let canonical = &registered.normalized().path;

        let mut operation = Operation {
            tags: self.tags_for(canonical),
            summary: Some(endpoint.name().to_string()),
            description: non_empty(endpoint.description()),
            operation_id: Some(endpoint.name().to_string()),
            parameters: registered
                .normalized()
                .parameters
                .iter()
                .map(|param| ReferenceOr::Item(parameter(param)))
                .collect(),
            request_body: request_body(endpoint, payloads.request.as_ref()),
            ..Default::default()
        };

        operation.responses.responses.insert(
            StatusCode::Code(200),
            ReferenceOr::Item(response(payloads.response.as_ref())),
        );

        if self.config.auth_header.is_some() {
            let mut requirement = IndexMap::new();
            requirement.insert(SECURITY_SCHEME_NAME.to_string(), Vec::new());
            operation.security = Some(vec![requirement]);
        }
        operation
    }

    fn tags_for(&self, canonical: &str) -> Vec<String> {
        self.config
            .tags_by_prefix
            .iter()
            .filter(|pair| canonical.starts_with(&pair.prefix))
            .map(|pair| pair.tag.clone())
            .collect()
    }
}

/// Compiles the OpenAPI document of `registry` in one call.
pub fn compile_openapi(
    registry: &SealedRegistry,
    config: &OpenApiConfig,
    reflector: &dyn Reflector,
) -> AppResult<OpenAPI> {
    Ok(OpenApiCompiler::new(registry, config, reflector)?.compile())
}

fn operation_slot(item: &mut PathItem, method: Method) -> &mut Option<Operation> {
    match method {
        Method::Get => &mut item.get,
        Method::Post => &mut item.post,
        Method::Put => &mut item.put,
        Method::Patch => &mut item.patch,
        Method::Delete => &mut item.delete,
    }
}

fn parameter(param: &PathParam) -> Parameter {
    let parameter_data = ParameterData {
        name: param.name.clone(),
        description: Some(GENERATED_DESCRIPTION.to_string()),
        required: param.required(),
        deprecated: None,
        format: ParameterSchemaOrContent::Schema(ReferenceOr::Item(string_schema())),
        example: None,
        examples: Default::default(),
        explode: None,
        extensions: Default::default(),
    };

    match param.location {
        ParamLocation::Path => Parameter::Path {
            parameter_data,
            style: PathStyle::Simple,
        },
        ParamLocation::Query => Parameter::Query {
            parameter_data,
            allow_reserved: false,
            style: QueryStyle::Form,
            allow_empty_value: None,
        },
    }
}

fn string_schema() -> Schema {
    Schema {
        schema_data: Default::default(),
        schema_kind: SchemaKind::Type(Type::String(StringType::default())),
    }
}

fn request_body(endpoint: &Endpoint, request: Option<&SchemaRef>) -> Option<ReferenceOr<RequestBody>> {
    if !endpoint.method().accepts_body() {
        return None;
    }
    let request = request?;
    Some(ReferenceOr::Item(RequestBody {
        description: Some(GENERATED_DESCRIPTION.to_string()),
        content: json_content(request),
        required: true,
        extensions: Default::default(),
    }))
}

fn response(schema: Option<&SchemaRef>) -> Response {
    Response {
        description: GENERATED_DESCRIPTION.to_string(),
        content: schema.map(json_content).unwrap_or_default(),
        ..Default::default()
    }
}

fn json_content(schema: &SchemaRef) -> IndexMap<String, MediaType> {
    let mut content = IndexMap::new();
    content.insert(
        JSON_CONTENT_TYPE.to_string(),
        MediaType {
            schema: Some(translate_ref(schema.root())),
            ..Default::default()
        },
    );
    content
}

fn non_empty(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| text.to_string())
}
