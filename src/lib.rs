//! # typecart
//!
//! **typecart** turns plain Rust types into HTTP handlers. A handler declares
//! what it reads and what it writes once, as types, and the same declaration
//! drives request decoding, header and parameter binding, response encoding
//! and an OpenAPI 3.1 description of the route.
//!
//! ## Overview
//!
//! - **[`primitive`]** - string codec for scalars and comma-joined sequences
//! - **[`bind`]** - `#[derive(Bind)]` field tables, filled from path, query,
//!   form and headers and written back to response headers
//! - **[`convert`]** - body converters (JSON, YAML, XML, raw bytes, no body)
//!   and their [`TypeDescriptor`](convert::TypeDescriptor)s
//! - **[`typed`]** - the typed handler, [`Cart`], built with [`io`], [`i`],
//!   [`o`] or [`a`]
//! - **[`router`]** - [`Mux`], a small router with sub-routers, middleware and
//!   route enumeration
//! - **[`middleware`]** - request tracing and the error responder
//! - **[`openapi`]** - document generation from registered routes
//! - **[`runtime_config`]** / **[`logging`]** - environment configuration
//!
//! ## Request flow
//!
//! ```text
//! Mux::serve
//!   -> middleware.before (outer router first)
//!   -> Cart: advertise headers -> decode body -> bind fields
//!            -> callback -> write header fields -> encode body
//!   -> middleware.after (reverse order)
//! ```
//!
//! Failures inside a cart are recorded on the request's
//! [`RequestErrors`](middleware::RequestErrors). The cart leaves the body
//! empty and [`ErrorResponder`](middleware::ErrorResponder) renders the
//! final error response.
//!
//! ## Example
//!
//! ```rust,ignore
//! use schemars::JsonSchema;
//! use serde::{Deserialize, Serialize};
//! use typecart::convert::Json;
//! use typecart::{io, Bind, Mux, OpenApiGenerator};
//!
//! #[derive(Default, Deserialize, Serialize, JsonSchema, Bind)]
//! struct Ping {
//!     n: i64,
//!     #[serde(skip)]
//!     #[bind(header = "X-Trace")]
//!     trace: Option<String>,
//! }
//!
//! #[derive(Default, Deserialize, Serialize, JsonSchema, Bind)]
//! struct Pong {
//!     pong: bool,
//! }
//!
//! let mut mux = Mux::standard();
//! mux.post(
//!     "/ping",
//!     io(Json::<Ping>::new(), Json::<Pong>::new(), |req, _headers| {
//!         Ok(Pong { pong: req.body().n % 2 == 0 })
//!     }),
//! )?;
//! mux.with_docs(&OpenApiGenerator::new(), typecart::runtime_config::global())?;
//!
//! let response = mux.serve(request);
//! ```

// The derive macro emits `::typecart::...` paths, which must also resolve
// inside this crate.
extern crate self as typecart;

mod error;

pub mod bind;
pub mod convert;
pub mod ids;
pub mod logging;
pub mod middleware;
pub mod openapi;
pub mod primitive;
pub mod router;
pub mod runtime_config;
pub mod typed;

pub use error::Error;
pub use openapi::{OpenApiDocument, OpenApiGenerator};
pub use router::{Endpoint, HttpRequest, HttpResponse, Mux, Route, RouteInfo, Routes};
pub use typecart_macros::Bind;
pub use typed::{a, i, io, o, Cart, HeaderWriter, Request};
