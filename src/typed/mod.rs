//! # Typed Handlers
//!
//! A [`Cart`] wraps a callback that works on typed values instead of raw
//! requests. Each request runs through a fixed sequence of [`Stage`]s:
//!
//! 1. **AdvertiseContentHeaders**: `Content-Type` from the output converter,
//!    one `Accepts` entry per input MIME type
//! 2. **DecodeBody**: the input converter decodes the body; converters
//!    without MIME types produce their default value and the body is never
//!    looked at
//! 3. **BindInboundFields**: for struct inputs, tagged fields are filled from
//!    path, query, form and headers
//! 4. **Invoke**: the callback gets a [`Request`] and a [`HeaderWriter`]
//! 5. **BindOutboundFields**: tagged output fields become response headers
//! 6. **EncodeBody**: `200` with the encoded body, or `204` without one
//!
//! A failure in any stage is recorded on the request's
//! [`RequestErrors`](crate::middleware::RequestErrors); the handler stops
//! and leaves the response body empty for the error middleware.
//!
//! ## Example
//!
//! ```rust,ignore
//! use typecart::{convert::Json, io, Bind};
//!
//! #[derive(Default, Deserialize, Serialize, JsonSchema, Bind)]
//! struct Ping { n: i64 }
//!
//! #[derive(Default, Deserialize, Serialize, JsonSchema, Bind)]
//! struct Pong { pong: bool }
//!
//! let cart = io(Json::<Ping>::new(), Json::<Pong>::new(), |req, _headers| {
//!     Ok(Pong { pong: req.body().n % 2 == 0 })
//! })
//! .with_info(|info| {
//!     info.with_summary("Parity check");
//! });
//! mux.get("/ping", cart)?;
//! ```

mod core;
mod request;


pub use self::core::{a, i, io, o, Cart, CartInfo, Stage, ACCEPTS};
pub use self::request::{HeaderWriter, Request};
