use std::time::Duration;

use tracing::{debug, info, warn};

use super::{Middleware, RequestErrors, RequestHead};
use crate::router::HttpResponse;

/// Logs request arrival at debug level and one line per completed request
/// with method, path, status and latency.
pub struct TracingMiddleware;

impl Middleware for TracingMiddleware {
    fn before(&self, req: &RequestHead, _errors: &mut RequestErrors) -> Option<HttpResponse> {
        debug!(
            request_id = %req.request_id,
            method = %req.method,
            path = %req.path(),
            "request received"
        );
        None
    }

    fn after(
        &self,
        req: &RequestHead,
        res: &mut HttpResponse,
        errors: &mut RequestErrors,
        latency: Duration,
    ) {
        let latency_ms = latency.as_millis() as u64;
        if errors.is_empty() {
            info!(
                request_id = %req.request_id,
                method = %req.method,
                path = %req.path(),
                status = res.status().as_u16(),
                latency_ms,
                "request completed"
            );
        } else {
            warn!(
                request_id = %req.request_id,
                method = %req.method,
                path = %req.path(),
                status = res.status().as_u16(),
                errors = errors.len(),
                latency_ms,
                "request completed with errors"
            );
        }
    }
}
