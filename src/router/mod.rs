//! # Router
//!
//! A small pattern router used to register typed handlers, dispatch
//! requests to them and enumerate them for documentation.
//!
//! ## Patterns
//!
//! - `/items` matches literally
//! - `/items/{id}` captures one segment into the `id` path parameter
//! - `/files/*` matches the prefix and everything below it
//!
//! When several patterns match, the one with the most literal segments
//! wins. Sub-routers are mounted under `prefix/*` and see the rest of the
//! path; a mounted router that has no match lets resolution continue.
//!
//! ## Dispatch
//!
//! [`Mux::serve`] assigns the request id, runs `before` hooks, calls the
//! route and runs `after` hooks in reverse order. The per-request
//! [`RequestErrors`](crate::middleware::RequestErrors) accumulator is owned
//! by that call and dropped with it.
//!
//! ```rust,ignore
//! let mut mux = Mux::standard();
//! mux.with_info(|info| {
//!     info.with_title("Pets").with_version("1.0.0");
//! });
//! mux.get("/pets/{id}", get_pet)?;
//! mux.route("/admin", |admin| {
//!     admin.use_middleware(AuditLog);
//!     admin.post("/reindex", reindex)?;
//!     Ok(())
//! })?;
//! let response = mux.serve(request);
//! ```

mod core;
mod matcher;
mod route;

#[cfg(test)]
mod tests;

pub use self::core::{Mux, RouteEntry, RouterInfo, Routes, ANY_METHOD};
pub use self::route::{
    Endpoint, EndpointFn, HttpRequest, HttpResponse, ParamVec, PathParams, Route, RouteInfo,
};
