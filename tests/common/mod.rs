#![allow(dead_code)]

use http::Method;
use typecart::{HttpRequest, HttpResponse, Mux};

/// Build an in-process request.
pub fn request(method: Method, uri: &str, body: &[u8]) -> HttpRequest {
    let mut req = HttpRequest::new(body.to_vec());
    *req.method_mut() = method;
    *req.uri_mut() = uri.parse().unwrap();
    req
}

pub fn with_header(mut req: HttpRequest, name: &'static str, value: &str) -> HttpRequest {
    req.headers_mut().append(name, value.parse().unwrap());
    req
}

pub fn send(mux: &Mux, method: Method, uri: &str, body: &[u8]) -> HttpResponse {
    mux.serve(request(method, uri, body))
}

pub fn json_body(res: &HttpResponse) -> serde_json::Value {
    serde_json::from_slice(res.body()).unwrap()
}

pub fn text_body(res: &HttpResponse) -> &str {
    std::str::from_utf8(res.body()).unwrap()
}
