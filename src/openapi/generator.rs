use std::collections::BTreeMap;

use schemars::generate::SchemaSettings;
use schemars::SchemaGenerator;
use tracing::{debug, info, warn};

use super::document::{
    self, Components, Header, MediaType, ObjectOrReference, ObjectSchema, OpenApiDocument,
    Operation, Parameter, ParameterIn, PathItem, RequestBody, Response, SchemaType,
};
use super::walker::walk;
use crate::bind::Source;
use crate::convert::TypeDescriptor;
use crate::router::{Route, RouteInfo, Routes};
use crate::Error;

const FORM_MIME: &str = "application/x-www-form-urlencoded";

/// Extension on an operation whose input has no body, holding the input
/// shape (`x-no-content-input`).
pub const NO_CONTENT_INPUT: &str = "no-content-input";
/// Extension on a `204` response, holding the output shape
/// (`x-no-content-output`).
pub const NO_CONTENT_OUTPUT: &str = "no-content-output";

/// Builds an [`OpenApiDocument`] from the metadata of registered routes.
///
/// Reflected types land in `components.schemas` and are referenced with
/// `$ref`; primitives and sequences stay inline.
#[derive(Debug, Clone, Default)]
pub struct OpenApiGenerator {
    default_responses: BTreeMap<String, Response>,
}

impl OpenApiGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a response to every generated operation, e.g. a shared `500`.
    ///
    /// Responses derived from the route's output type take precedence.
    pub fn with_default_response(mut self, status: impl Into<String>, response: Response) -> Self {
        self.default_responses.insert(status.into(), response);
        self
    }

    /// Walk `routes` and describe every visible operation.
    ///
    /// When two routes end up on the same pattern and method the first one
    /// registered is documented.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownMethod`] for a method OpenAPI has no slot for,
    /// [`Error::Document`] for a reflected schema the model cannot hold.
    pub fn generate(&self, routes: &dyn Routes) -> Result<OpenApiDocument, Error> {
        let router = routes.info();
        let mut doc = document::empty_document(document::info(
            &router.title,
            &router.summary,
            &router.description,
            &router.version,
        ));
        let mut schemas = SchemaGenerator::new(SchemaSettings::draft2020_12().with(|s| {
            s.definitions_path = "/components/schemas".into();
        }));

        let mut paths: BTreeMap<String, PathItem> = BTreeMap::new();
        let mut operations = 0usize;
        walk(routes, &mut |method: &str, pattern: &str, route: &Route| {
            let meta = route.info();
            if meta.hidden {
                debug!(method, pattern, "hidden route left out of document");
                return Ok(());
            }
            if method == "CONNECT" {
                return Ok(());
            }
            let item = paths.entry(pattern.to_string()).or_default();
            let slot = document::operation_slot(item, method).ok_or_else(|| Error::UnknownMethod {
                method: method.to_string(),
                pattern: pattern.to_string(),
            })?;
            if slot.is_some() {
                warn!(method, pattern, "operation already documented, route skipped");
                return Ok(());
            }
            *slot = Some(self.operation(pattern, meta, &mut schemas)?);
            operations += 1;
            Ok(())
        })?;

        let components = definitions(&schemas)?;
        info!(
            title = %doc.info.title,
            paths = paths.len(),
            operations,
            schemas = components.len(),
            "openapi document generated"
        );
        doc.paths = Some(paths);
        if !components.is_empty() {
            doc.components = Some(Components {
                schemas: components,
                ..Default::default()
            });
        }
        Ok(doc)
    }

    fn operation(
        &self,
        pattern: &str,
        meta: &RouteInfo,
        schemas: &mut SchemaGenerator,
    ) -> Result<Operation, Error> {
        let mut operation = Operation {
            summary: non_empty(&meta.summary),
            description: non_empty(&meta.description),
            ..Default::default()
        };
        let mut responses: BTreeMap<String, ObjectOrReference<Response>> = self
            .default_responses
            .iter()
            .map(|(status, response)| (status.clone(), ObjectOrReference::Object(response.clone())))
            .collect();

        let mut params = Vec::new();
        if let Some(input) = &meta.input {
            params = parameters(input, schemas)?;
            operation.request_body = request_body(input, schemas)?.map(ObjectOrReference::Object);
            if !input.has_body() {
                let shape = input.schema(schemas).to_value();
                operation.extensions.insert(NO_CONTENT_INPUT.to_string(), shape);
            }
        }
        for name in pattern_params(pattern) {
            let declared = params
                .iter()
                .any(|p| p.location == ParameterIn::Path && p.name == name);
            if !declared {
                params.push(parameter(
                    name,
                    ParameterIn::Path,
                    ObjectOrReference::Object(document::typed_schema(SchemaType::String)),
                ));
            }
        }
        operation.parameters = params.into_iter().map(ObjectOrReference::Object).collect();

        match &meta.output {
            Some(output) => {
                let (status, response) = response(output, schemas)?;
                responses.insert(status.to_string(), ObjectOrReference::Object(response));
            }
            None if responses.is_empty() => {
                responses.insert(
                    "200".to_string(),
                    ObjectOrReference::Object(document::response("OK")),
                );
            }
            None => {}
        }
        operation.responses = Some(responses);
        Ok(operation)
    }
}

fn parameter(name: &str, location: ParameterIn, schema: ObjectOrReference<ObjectSchema>) -> Parameter {
    Parameter {
        name: name.to_string(),
        location,
        description: None,
        required: (location == ParameterIn::Path).then_some(true),
        deprecated: None,
        allow_empty_value: None,
        style: None,
        explode: None,
        allow_reserved: None,
        schema: Some(schema),
        example: None,
        examples: BTreeMap::new(),
        content: None,
        extensions: BTreeMap::new(),
    }
}

fn parameters(input: &TypeDescriptor, schemas: &mut SchemaGenerator) -> Result<Vec<Parameter>, Error> {
    let mut params = Vec::new();
    for binding in input.bindings() {
        let location = match binding.source {
            Source::Path => ParameterIn::Path,
            Source::Query => ParameterIn::Query,
            Source::Header | Source::Meta => ParameterIn::Header,
            Source::Form => continue,
        };
        let schema = document::schema((binding.schema)(schemas).to_value())?;
        params.push(parameter(binding.key, location, schema));
    }
    Ok(params)
}

fn request_body(
    input: &TypeDescriptor,
    schemas: &mut SchemaGenerator,
) -> Result<Option<RequestBody>, Error> {
    if input.has_body() {
        let schema = document::schema(input.schema(schemas).to_value())?;
        return Ok(Some(RequestBody {
            content: media_types(input.mime_types(), &schema),
            required: Some(true),
            ..Default::default()
        }));
    }

    let mut form = document::typed_schema(SchemaType::Object);
    for binding in input.bindings().iter().filter(|b| b.source == Source::Form) {
        let schema = document::schema((binding.schema)(schemas).to_value())?;
        form.properties.insert(binding.key.to_string(), schema);
    }
    if form.properties.is_empty() {
        return Ok(None);
    }
    let content = BTreeMap::from([(
        FORM_MIME.to_string(),
        MediaType {
            schema: Some(ObjectOrReference::Object(form)),
            ..Default::default()
        },
    )]);
    Ok(Some(RequestBody {
        content,
        ..Default::default()
    }))
}

fn response(
    output: &TypeDescriptor,
    schemas: &mut SchemaGenerator,
) -> Result<(&'static str, Response), Error> {
    let shape = output.schema(schemas).to_value();
    let mut headers = BTreeMap::new();
    for binding in output.bindings().iter().filter(|b| b.source == Source::Header) {
        let header = Header {
            schema: Some(document::schema((binding.schema)(schemas).to_value())?),
            ..Default::default()
        };
        headers.insert(binding.key.to_string(), ObjectOrReference::Object(header));
    }

    if !output.has_body() {
        let mut response = document::response("No Content");
        response.headers = headers;
        response.extensions.insert(NO_CONTENT_OUTPUT.to_string(), shape);
        return Ok(("204", response));
    }
    let mut response = document::response("OK");
    response.headers = headers;
    response.content = media_types(output.mime_types(), &document::schema(shape)?);
    Ok(("200", response))
}

fn media_types(
    mime_types: &[String],
    schema: &ObjectOrReference<ObjectSchema>,
) -> BTreeMap<String, MediaType> {
    mime_types
        .iter()
        .map(|mime| {
            let media = MediaType {
                schema: Some(schema.clone()),
                ..Default::default()
            };
            (mime.clone(), media)
        })
        .collect()
}

/// `{name}` segments of a normalized pattern.
fn pattern_params(pattern: &str) -> impl Iterator<Item = &str> {
    pattern.split('/').filter_map(|segment| {
        segment
            .strip_prefix('{')
            .and_then(|s| s.strip_suffix('}'))
    })
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

fn definitions(
    schemas: &SchemaGenerator,
) -> Result<BTreeMap<String, ObjectOrReference<ObjectSchema>>, Error> {
    schemas
        .definitions()
        .iter()
        .map(|(name, schema)| Ok((name.clone(), document::schema(schema.clone())?)))
        .collect()
}
