//! # Middleware
//!
//! Hooks the router runs around every request, and the per-request error
//! accumulator the typed handler reports into.
//!
//! [`Mux::standard`](crate::router::Mux::standard) installs
//! [`TracingMiddleware`] and [`ErrorResponder`]; custom middleware is added
//! with [`Mux::use_middleware`](crate::router::Mux::use_middleware).

mod core;
mod errors;
mod tracing;

pub use self::core::{Middleware, RequestHead};
pub use self::errors::{ErrorResponder, RequestErrors};
pub use self::tracing::TracingMiddleware;
