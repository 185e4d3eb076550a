use http::request::Parts;
use http::{Extensions, HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri};

use crate::ids::RequestId;
use crate::router::PathParams;

/// The bound input value together with the original request head.
///
/// The raw body has already been consumed by the input converter.
#[derive(Debug)]
pub struct Request<T> {
    parts: Parts,
    body: T,
}

impl<T> Request<T> {
    pub(crate) fn new(parts: Parts, body: T) -> Self {
        Self { parts, body }
    }

    /// The decoded and bound input.
    pub fn body(&self) -> &T {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut T {
        &mut self.body
    }

    pub fn into_body(self) -> T {
        self.body
    }

    pub fn into_parts(self) -> (Parts, T) {
        (self.parts, self.body)
    }

    pub fn method(&self) -> &Method {
        &self.parts.method
    }

    pub fn uri(&self) -> &Uri {
        &self.parts.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    pub fn extensions(&self) -> &Extensions {
        &self.parts.extensions
    }

    /// Path parameter captured by the router.
    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.parts.extensions.get::<PathParams>()?.get(name)
    }

    /// Identity assigned by the router, if dispatched through one.
    pub fn request_id(&self) -> Option<RequestId> {
        self.parts.extensions.get::<RequestId>().copied()
    }
}

/// Write access to the response head for a typed handler callback.
///
/// Status and headers only: the body is produced by the output converter
/// after the callback returns, so headers always settle before the body.
#[derive(Debug, Default)]
pub struct HeaderWriter {
    status: Option<StatusCode>,
    headers: HeaderMap,
}

impl HeaderWriter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Insert a header, replacing previous values.
    pub fn insert(&mut self, name: HeaderName, value: HeaderValue) -> &mut Self {
        self.headers.insert(name, value);
        self
    }

    /// Override the status sent with the encoded body.
    pub fn set_status(&mut self, status: StatusCode) -> &mut Self {
        self.status = Some(status);
        self
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub(crate) fn into_parts(self) -> (Option<StatusCode>, HeaderMap) {
        (self.status, self.headers)
    }
}
