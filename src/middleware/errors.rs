use std::time::Duration;

use http::header::{HeaderValue, CONTENT_LENGTH, CONTENT_TYPE};
use serde_json::json;

use super::{Middleware, RequestHead};
use crate::ids::{RequestId, REQUEST_ID_HEADER};
use crate::router::HttpResponse;
use crate::Error;

/// Errors recorded while handling one request.
///
/// Created by the router for every request and passed down by `&mut`, so it
/// lives exactly as long as the request's call stack.
#[derive(Debug)]
pub struct RequestErrors {
    id: RequestId,
    errors: Vec<Error>,
}

impl RequestErrors {
    pub fn new(id: RequestId) -> Self {
        Self {
            id,
            errors: Vec::new(),
        }
    }

    /// Identity of the request the errors belong to.
    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn add_error(&mut self, err: impl Into<Error>) {
        self.errors.push(err.into());
    }

    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    pub fn first(&self) -> Option<&Error> {
        self.errors.first()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Remove and return all recorded errors.
    pub fn take(&mut self) -> Vec<Error> {
        std::mem::take(&mut self.errors)
    }
}

/// Turns recorded request errors into a JSON error response.
///
/// The status is the hint of the first error. The body lists every message:
///
/// ```json
/// {"request_id": "01J...", "errors": ["typecart: malformed json body: ..."]}
/// ```
pub struct ErrorResponder;

impl Middleware for ErrorResponder {
    fn after(
        &self,
        _req: &RequestHead,
        res: &mut HttpResponse,
        errors: &mut RequestErrors,
        _latency: Duration,
    ) {
        let Some(status) = errors.first().map(Error::status) else {
            return;
        };
        let messages: Vec<String> = errors.errors().iter().map(ToString::to_string).collect();
        let body = json!({
            "request_id": errors.id(),
            "errors": messages,
        })
        .to_string()
        .into_bytes();

        *res.status_mut() = status;
        let headers = res.headers_mut();
        headers.clear();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
        if let Ok(id) = HeaderValue::from_str(&errors.id().to_string()) {
            headers.insert(REQUEST_ID_HEADER, id);
        }
        *res.body_mut() = body;
    }
}

