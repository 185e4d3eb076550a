use http::{Method, StatusCode};
use typecart::router::{EndpointFn, Routes, ANY_METHOD};
use typecart::middleware::RequestErrors;
use typecart::{HttpRequest, HttpResponse, Mux};

mod common;
use common::{json_body, send, text_body};

fn reply(text: &'static str) -> impl Fn(HttpRequest, &mut RequestErrors) -> HttpResponse {
    move |_, _| HttpResponse::new(text.as_bytes().to_vec())
}

fn zoo() -> Mux {
    let mut mux = Mux::new();
    mux.method_fn(Method::GET, "/", reply("root")).unwrap();
    mux.route("/zoo", |zoo| {
        zoo.method_fn(Method::GET, "/animals", reply("list"))?;
        zoo.method_fn(Method::POST, "/animals", reply("create"))?;
        zoo.method_fn(Method::GET, "/animals/{id}", reply("one"))?;
        zoo.not_found(EndpointFn(reply("no such animal")));
        Ok(())
    })
    .unwrap();
    mux.handle("/files/*", EndpointFn(reply("file"))).unwrap();
    mux
}

#[test]
fn test_dispatch_table() {
    let mux = zoo();
    let cases = [
        (Method::GET, "/", "root"),
        (Method::GET, "/zoo/animals", "list"),
        (Method::POST, "/zoo/animals", "create"),
        (Method::GET, "/zoo/animals/17", "one"),
        (Method::DELETE, "/files/a/b/c.txt", "file"),
        (Method::GET, "/files", "file"),
    ];
    for (method, path, expected) in cases {
        let res = send(&mux, method.clone(), path, b"");
        assert_eq!(text_body(&res), expected, "{method} {path}");
    }
}

#[test]
fn test_fallbacks_are_scoped_to_sub_router() {
    let mux = zoo();

    let res = send(&mux, Method::GET, "/zoo/keepers", b"");
    assert_eq!(text_body(&res), "no such animal");

    let res = send(&mux, Method::GET, "/aquarium", b"");
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(&res)["method"], "GET");

    let res = send(&mux, Method::PUT, "/zoo/animals", b"");
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(res.headers()["allow"], "GET, POST");
}

#[test]
fn test_routes_enumeration() {
    let mux = zoo();
    let entries = mux.routes();
    let patterns: Vec<&str> = entries.iter().map(|e| e.pattern).collect();
    assert_eq!(patterns, ["/", "/zoo/*", "/files/*"]);

    let sub = entries[1].sub_routes.unwrap();
    let sub_patterns: Vec<(&str, Vec<&str>)> = sub
        .routes()
        .into_iter()
        .map(|e| (e.pattern, e.handlers.iter().map(|(m, _)| *m).collect()))
        .collect();
    assert_eq!(
        sub_patterns,
        [
            ("/animals", vec!["GET", "POST"]),
            ("/animals/{id}", vec!["GET"]),
        ]
    );
    assert_eq!(entries[2].handlers[0].0, ANY_METHOD);
    assert_eq!(mux.info().title, "API");
}
