//! # Schema Walker
//!
//! Produces an OpenAPI 3.1 document from the metadata attached to registered
//! routes. The walk follows mounted routers, joins their prefixes onto the
//! child patterns and merges every method of one pattern into a single path
//! item. Hidden routes are left out; they still serve traffic.
//!
//! Shapes are reflected with `schemars` and carried in the `oas3` model.
//! Struct types are registered under `components.schemas`, field bindings
//! become operation parameters or response headers. Inputs and outputs
//! without a body still reference their shape through the
//! `x-no-content-input` operation extension and the `x-no-content-output`
//! extension of the `204` response.
//!
//! ```rust,ignore
//! let mut mux = Mux::standard();
//! mux.get("/ping", ping_cart)?;
//! let document = OpenApiGenerator::new().generate(&mux)?;
//! println!("{}", openapi::document::to_json_pretty(&document)?);
//!
//! // or mount the document and a swagger-ui page
//! mux.with_docs(&OpenApiGenerator::new(), runtime_config::global())?;
//! ```

pub mod document;
mod endpoints;
mod generator;
mod walker;

#[cfg(test)]
mod tests;

pub use self::document::{
    Components, Header, Info, MediaType, ObjectOrReference, ObjectSchema, OpenApiDocument,
    Operation, Parameter, ParameterIn, PathItem, RequestBody, Response, OPENAPI_VERSION,
};
pub use self::endpoints::{SpecEndpoint, SwaggerUi};
pub use self::generator::{OpenApiGenerator, NO_CONTENT_INPUT, NO_CONTENT_OUTPUT};
pub use self::walker::{normalize_pattern, walk};
