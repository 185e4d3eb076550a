use std::sync::{Arc, Mutex};
use std::time::Duration;

use http::{Method, StatusCode};

use super::*;
use crate::middleware::{Middleware, RequestErrors, RequestHead};
use crate::Error;

fn text(body: &'static str) -> impl Fn(HttpRequest, &mut RequestErrors) -> HttpResponse {
    move |_req, _errors| HttpResponse::new(body.as_bytes().to_vec())
}

fn echo_param(name: &'static str) -> impl Fn(HttpRequest, &mut RequestErrors) -> HttpResponse {
    move |req, _errors| {
        let value = req
            .extensions()
            .get::<PathParams>()
            .and_then(|p| p.get(name))
            .unwrap_or("-")
            .to_string();
        HttpResponse::new(value.into_bytes())
    }
}

fn send(mux: &Mux, method: Method, uri: &str) -> HttpResponse {
    let mut req = HttpRequest::new(Vec::new());
    *req.method_mut() = method;
    *req.uri_mut() = uri.parse().unwrap();
    mux.serve(req)
}

fn body(res: &HttpResponse) -> &str {
    std::str::from_utf8(res.body()).unwrap()
}

#[test]
fn test_static_beats_parameter() {
    let mut mux = Mux::new();
    mux.method_fn(Method::GET, "/items/{id}", echo_param("id")).unwrap();
    mux.method_fn(Method::GET, "/items/new", text("new")).unwrap();

    assert_eq!(body(&send(&mux, Method::GET, "/items/new")), "new");
    assert_eq!(body(&send(&mux, Method::GET, "/items/42")), "42");
}

#[test]
fn test_not_found_and_method_not_allowed() {
    let mut mux = Mux::new();
    mux.method_fn(Method::GET, "/items", text("list")).unwrap();
    mux.method_fn(Method::POST, "/items", text("create")).unwrap();

    let res = send(&mux, Method::GET, "/nothing");
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let json: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
    assert_eq!(json["error"], "Not Found");
    assert_eq!(json["path"], "/nothing");

    let res = send(&mux, Method::DELETE, "/items");
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(res.headers()["allow"], "GET, POST");
}

#[test]
fn test_custom_fallbacks() {
    let mut mux = Mux::new();
    mux.method_fn(Method::GET, "/a", text("a")).unwrap();
    mux.not_found(EndpointFn(text("missing")))
        .method_not_allowed(EndpointFn(text("nope")));

    assert_eq!(body(&send(&mux, Method::GET, "/b")), "missing");
    assert_eq!(body(&send(&mux, Method::PUT, "/a")), "nope");
}

#[test]
fn test_handler_on_mount_pattern_is_rejected() {
    let mut mux = Mux::new();
    mux.route("/zoo", |zoo| {
        zoo.method_fn(Method::GET, "/animals", text("list"))?;
        Ok(())
    })
    .unwrap();

    let err = mux
        .method_fn(Method::GET, "/zoo/*", text("shadow"))
        .err()
        .unwrap();
    assert!(matches!(err, Error::InvalidPattern { ref pattern, .. } if pattern == "/zoo/*"));
    assert_eq!(body(&send(&mux, Method::GET, "/zoo/animals")), "list");
}

#[test]
fn test_handle_matches_any_method() {
    let mut mux = Mux::new();
    mux.handle("/any", EndpointFn(text("any"))).unwrap();
    for method in [Method::GET, Method::POST, Method::OPTIONS] {
        assert_eq!(body(&send(&mux, method, "/any")), "any");
    }
}

#[test]
fn test_sub_router_sees_rest_and_parent_params() {
    let mut mux = Mux::new();
    mux.route("/shops/{shop}", |shop| {
        shop.method_fn(Method::GET, "/", echo_param("shop"))?;
        shop.method_fn(Method::GET, "/items/{id}", echo_param("id"))?;
        Ok(())
    })
    .unwrap();

    assert_eq!(body(&send(&mux, Method::GET, "/shops/north")), "north");
    assert_eq!(body(&send(&mux, Method::GET, "/shops/north/items/7")), "7");
    assert_eq!(
        send(&mux, Method::GET, "/shops/north/other").status(),
        StatusCode::NOT_FOUND
    );
}

#[test]
fn test_mount_falls_through() {
    let mut mux = Mux::new();
    mux.group(|g| {
        g.method_fn(Method::GET, "/grouped", text("grouped"))?;
        Ok(())
    })
    .unwrap();
    mux.method_fn(Method::GET, "/plain", text("plain")).unwrap();

    assert_eq!(body(&send(&mux, Method::GET, "/grouped")), "grouped");
    assert_eq!(body(&send(&mux, Method::GET, "/plain")), "plain");
}

#[test]
fn test_invalid_pattern_is_rejected() {
    let mut mux = Mux::new();
    let err = mux.method_fn(Method::GET, "/a/{", text("x")).unwrap_err();
    assert!(matches!(err, Error::InvalidPattern { .. }));
}

#[test]
fn test_route_info_is_editable() {
    let mut mux = Mux::new();
    mux.method_fn(Method::GET, "/a", text("a"))
        .unwrap()
        .with_info(|info| {
            info.with_summary("A").with_hidden(true);
        });

    let entries = mux.routes();
    assert_eq!(entries.len(), 1);
    let (method, route) = entries[0].handlers[0];
    assert_eq!(method, "GET");
    assert_eq!(route.info().summary, "A");
    assert!(route.info().hidden);
}

struct Recorder {
    name: &'static str,
    log: Arc<Mutex<Vec<String>>>,
}

impl Middleware for Recorder {
    fn before(&self, _req: &RequestHead, _errors: &mut RequestErrors) -> Option<HttpResponse> {
        self.log.lock().unwrap().push(format!("before {}", self.name));
        None
    }

    fn after(
        &self,
        _req: &RequestHead,
        _res: &mut HttpResponse,
        _errors: &mut RequestErrors,
        _latency: Duration,
    ) {
        self.log.lock().unwrap().push(format!("after {}", self.name));
    }
}

#[test]
fn test_middleware_order_includes_sub_router() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut mux = Mux::new();
    mux.use_middleware(Recorder {
        name: "root",
        log: Arc::clone(&log),
    });
    let inner_log = Arc::clone(&log);
    mux.route("/api", move |api| {
        api.use_middleware(Recorder {
            name: "api",
            log: inner_log,
        });
        api.method_fn(Method::GET, "/x", text("x"))?;
        Ok(())
    })
    .unwrap();

    send(&mux, Method::GET, "/api/x");
    assert_eq!(
        *log.lock().unwrap(),
        vec!["before root", "before api", "after api", "after root"]
    );
}
