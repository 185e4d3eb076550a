use std::time::Duration;

use http::{HeaderMap, Method, Uri};

use super::RequestErrors;
use crate::ids::RequestId;
use crate::router::{HttpRequest, HttpResponse};

/// Request line and headers, kept by the router for the `after` hooks once
/// the request itself has been handed to the endpoint.
#[derive(Debug, Clone)]
pub struct RequestHead {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub request_id: RequestId,
}

impl RequestHead {
    pub fn from_request(req: &HttpRequest, request_id: RequestId) -> Self {
        Self {
            method: req.method().clone(),
            uri: req.uri().clone(),
            headers: req.headers().clone(),
            request_id,
        }
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }
}

/// Hooks run around every dispatched request.
///
/// `before` hooks run in registration order and may short-circuit with a
/// response. `after` hooks run in reverse order and see the request's
/// error accumulator.
pub trait Middleware: Send + Sync {
    fn before(&self, _req: &RequestHead, _errors: &mut RequestErrors) -> Option<HttpResponse> {
        None
    }

    fn after(
        &self,
        _req: &RequestHead,
        _res: &mut HttpResponse,
        _errors: &mut RequestErrors,
        _latency: Duration,
    ) {
    }
}
