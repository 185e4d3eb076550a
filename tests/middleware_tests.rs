use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use http::{Method, StatusCode};
use typecart::convert::Json;
use typecart::ids::RequestId;
use typecart::middleware::{Middleware, RequestErrors, RequestHead, TracingMiddleware};
use typecart::{a, o, HttpResponse, Mux, Request};

mod common;
use common::{json_body, request, send, with_header};

#[test]
fn test_error_responder_renders_recorded_errors() {
    let mut mux = Mux::standard();
    mux.get(
        "/fail",
        a(|_: Request<()>, _| -> anyhow::Result<()> { anyhow::bail!("database unavailable") }),
    )
    .unwrap();

    let res = send(&mux, Method::GET, "/fail", b"");
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.headers()["content-type"], "application/json");

    let id = res.headers()["x-request-id"].to_str().unwrap().to_string();
    assert!(id.parse::<RequestId>().is_ok());
    let body = json_body(&res);
    assert_eq!(body["request_id"], id.as_str());
    assert_eq!(body["errors"], serde_json::json!(["database unavailable"]));
    assert_eq!(
        res.headers()["content-length"],
        res.body().len().to_string().as_str()
    );
}

#[test]
fn test_successful_responses_are_untouched() {
    let mut mux = Mux::standard();
    mux.get("/ok", o(Json::<u8>::new(), |_: Request<()>, _| Ok(7)))
        .unwrap();

    let req = with_header(request(Method::GET, "/ok", b""), "x-request-id", "not-a-ulid");
    let res = mux.serve(req);
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.body(), b"7");
    assert!(res.headers().get("x-request-id").is_none());
}

#[test]
fn test_without_error_responder_body_stays_empty() {
    let mut mux = Mux::new();
    mux.use_middleware(TracingMiddleware);
    mux.get(
        "/fail",
        a(|_: Request<()>, _| -> anyhow::Result<()> { anyhow::bail!("nope") }),
    )
    .unwrap();

    let res = send(&mux, Method::GET, "/fail", b"");
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(res.body().is_empty());
}

struct Gate {
    rejected: Arc<AtomicUsize>,
}

impl Middleware for Gate {
    fn before(&self, req: &RequestHead, _errors: &mut RequestErrors) -> Option<HttpResponse> {
        if req.headers.contains_key("x-key") {
            return None;
        }
        self.rejected.fetch_add(1, Ordering::SeqCst);
        let mut res = HttpResponse::new(Vec::new());
        *res.status_mut() = StatusCode::UNAUTHORIZED;
        Some(res)
    }

    fn after(
        &self,
        _req: &RequestHead,
        res: &mut HttpResponse,
        _errors: &mut RequestErrors,
        _latency: Duration,
    ) {
        res.headers_mut().insert("x-gate", "passed".parse().unwrap());
    }
}

#[test]
fn test_before_hook_can_short_circuit() {
    let rejected = Arc::new(AtomicUsize::new(0));
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);

    let mut mux = Mux::standard();
    mux.use_middleware(Gate {
        rejected: Arc::clone(&rejected),
    });
    mux.get(
        "/secret",
        a(move |_: Request<()>, _| {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }),
    )
    .unwrap();

    let res = send(&mux, Method::GET, "/secret", b"");
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(res.headers()["x-gate"], "passed");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(rejected.load(Ordering::SeqCst), 1);

    let res = mux.serve(with_header(request(Method::GET, "/secret", b""), "x-key", "k"));
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
