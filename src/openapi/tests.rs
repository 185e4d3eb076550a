use http::Method;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::*;
use crate::convert::{Json, TypeDescriptor};
use crate::middleware::RequestErrors;
use crate::router::{EndpointFn, HttpRequest, HttpResponse, Mux};
use crate::typed::{a, io, o, Request};
use crate::{Bind, Error};

#[derive(Debug, Default, Deserialize, Serialize, JsonSchema, Bind)]
struct Widget {
    name: String,
}

#[derive(Debug, Default, JsonSchema, Bind)]
struct WidgetQuery {
    #[bind(path = "id")]
    id: String,
    #[bind(query = "fields")]
    fields: Vec<String>,
    #[bind(meta = "X-Tenant")]
    tenant: Option<String>,
    #[bind(form = "page")]
    page: u32,
}

#[derive(Debug, Default, JsonSchema, Bind)]
struct Moved {
    #[bind(header = "Location")]
    location: String,
}

fn plain(_req: HttpRequest, _errors: &mut RequestErrors) -> HttpResponse {
    HttpResponse::new(Vec::new())
}

fn widget_cart() -> impl crate::router::Endpoint {
    io(Json::<Widget>::new(), Json::<Widget>::new(), |req, _| {
        Ok(Widget {
            name: req.body().name.clone(),
        })
    })
}

fn generate(mux: &Mux) -> Value {
    let doc = OpenApiGenerator::new().generate(mux).unwrap();
    serde_json::to_value(&doc).unwrap()
}

fn path_keys(doc: &Value) -> Vec<&str> {
    doc["paths"]
        .as_object()
        .map(|paths| paths.keys().map(String::as_str).collect())
        .unwrap_or_default()
}

#[test]
fn test_two_methods_share_one_path_item() {
    let mut mux = Mux::new();
    mux.get("/widget", widget_cart()).unwrap();
    mux.post("/widget", widget_cart())
        .unwrap()
        .with_info(|info| {
            info.with_summary("Create widget");
        });

    let doc = generate(&mux);
    assert_eq!(path_keys(&doc), ["/widget"]);
    let item = &doc["paths"]["/widget"];
    assert!(item["get"].is_object());
    let post = &item["post"];
    assert_eq!(post["summary"], "Create widget");
    assert_eq!(post["requestBody"]["required"], true);
    assert_eq!(
        post["requestBody"]["content"]["application/json"]["schema"]["$ref"],
        "#/components/schemas/Widget"
    );
    assert_eq!(
        post["responses"]["200"]["content"]["application/json"]["schema"]["$ref"],
        "#/components/schemas/Widget"
    );
    assert_eq!(
        doc["components"]["schemas"]["Widget"]["properties"]["name"]["type"],
        "string"
    );
}

#[test]
fn test_hidden_routes_are_left_out() {
    let mut mux = Mux::new();
    mux.get("/visible", widget_cart()).unwrap();
    mux.get("/secret", widget_cart())
        .unwrap()
        .with_info(|info| {
            info.with_hidden(true);
        });

    assert_eq!(path_keys(&generate(&mux)), ["/visible"]);
}

#[test]
fn test_unknown_method_is_an_error() {
    let mut mux = Mux::new();
    let purge = Method::from_bytes(b"PURGE").unwrap();
    mux.method_fn(purge, "/cache", plain).unwrap();

    let err = OpenApiGenerator::new().generate(&mux).unwrap_err();
    match err {
        Error::UnknownMethod { method, pattern } => {
            assert_eq!(method, "PURGE");
            assert_eq!(pattern, "/cache");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_connect_and_any_method_are_skipped() {
    let mut mux = Mux::new();
    mux.method_fn(Method::CONNECT, "/tunnel", plain).unwrap();
    mux.handle("/anything", EndpointFn(plain)).unwrap();

    let doc = OpenApiGenerator::new().generate(&mux).unwrap();
    assert!(doc.paths.as_ref().unwrap().is_empty());
    assert!(doc.components.is_none());
}

#[test]
fn test_sub_routes_are_joined_and_normalized() {
    let mut mux = Mux::new();
    mux.route("/shops/{shop}", |shop| {
        shop.get("/", widget_cart())?;
        shop.route("/items", |items| {
            items.get("/{id}", widget_cart())?;
            Ok(())
        })?;
        Ok(())
    })
    .unwrap();
    mux.group(|g| {
        g.get("/grouped", widget_cart())?;
        Ok(())
    })
    .unwrap();

    let doc = generate(&mux);
    assert_eq!(
        path_keys(&doc),
        ["/grouped", "/shops/{shop}", "/shops/{shop}/items/{id}"]
    );

    let params = doc["paths"]["/shops/{shop}/items/{id}"]["get"]["parameters"]
        .as_array()
        .unwrap();
    let names: Vec<&str> = params.iter().filter_map(|p| p["name"].as_str()).collect();
    assert_eq!(names, ["shop", "id"]);
    for param in params {
        assert_eq!(param["in"], "path");
        assert_eq!(param["required"], true);
        assert_eq!(param["schema"], json!({"type": "string"}));
    }
}

#[test]
fn test_wildcard_route_keeps_its_own_path() {
    let mut mux = Mux::new();
    mux.method_fn(Method::GET, "/files", plain)
        .unwrap()
        .with_info(|info| {
            info.with_summary("list files");
        });
    mux.method_fn(Method::GET, "/files/*", plain)
        .unwrap()
        .with_info(|info| {
            info.with_summary("download file");
        });
    mux.route("/api", |api| {
        api.method_fn(Method::GET, "/files/*", plain)?;
        Ok(())
    })
    .unwrap();

    let doc = generate(&mux);
    assert_eq!(path_keys(&doc), ["/api/files/*", "/files", "/files/*"]);
    assert_eq!(doc["paths"]["/files"]["get"]["summary"], "list files");
    assert_eq!(doc["paths"]["/files/*"]["get"]["summary"], "download file");
}

#[test]
fn test_colliding_patterns_keep_first_operation() {
    let mut mux = Mux::new();
    mux.route("/shop", |shop| {
        shop.method_fn(Method::GET, "/", plain)?.with_info(|info| {
            info.with_summary("from mount");
        });
        Ok(())
    })
    .unwrap();
    mux.method_fn(Method::GET, "/shop", plain)
        .unwrap()
        .with_info(|info| {
            info.with_summary("direct");
        });

    let doc = generate(&mux);
    assert_eq!(path_keys(&doc), ["/shop"]);
    assert_eq!(doc["paths"]["/shop"]["get"]["summary"], "from mount");
}

#[test]
fn test_bindings_become_parameters_and_headers() {
    let mut mux = Mux::new();
    mux.post(
        "/widgets/{id}",
        o(Json::<Widget>::new(), |_: Request<WidgetQuery>, _| {
            Ok(Widget::default())
        }),
    )
    .unwrap();
    mux.delete("/widgets/{id}", a(|_: Request<WidgetQuery>, _| Ok(Moved::default())))
        .unwrap();

    let doc = generate(&mux);
    let item = &doc["paths"]["/widgets/{id}"];

    let post = &item["post"];
    let params: Vec<(&str, &str, bool)> = post["parameters"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| {
            (
                p["name"].as_str().unwrap(),
                p["in"].as_str().unwrap(),
                p["required"].as_bool().unwrap_or(false),
            )
        })
        .collect();
    assert_eq!(
        params,
        [
            ("id", "path", true),
            ("fields", "query", false),
            ("X-Tenant", "header", false),
        ]
    );
    assert_eq!(post["parameters"][1]["schema"]["type"], "array");

    let form = &post["requestBody"]["content"]["application/x-www-form-urlencoded"];
    assert_eq!(form["schema"]["type"], "object");
    assert_eq!(form["schema"]["properties"]["page"]["type"], "integer");

    let delete = &item["delete"];
    let no_content = &delete["responses"]["204"];
    assert_eq!(no_content["description"], "No Content");
    assert!(no_content.get("content").is_none());
    assert_eq!(no_content["headers"]["Location"]["schema"], json!({"type": "string"}));
    assert!(doc["components"]["schemas"]["WidgetQuery"].is_object());
}

#[test]
fn test_bodiless_shapes_are_referenced_from_operation() {
    let mut mux = Mux::new();
    mux.get("/widgets/{id}", a(|_: Request<WidgetQuery>, _| Ok(Moved::default())))
        .unwrap();

    let doc = generate(&mux);
    let get = &doc["paths"]["/widgets/{id}"]["get"];
    assert_eq!(
        get[format!("x-{NO_CONTENT_INPUT}")],
        json!({"$ref": "#/components/schemas/WidgetQuery"})
    );
    assert_eq!(
        get["responses"]["204"][format!("x-{NO_CONTENT_OUTPUT}")],
        json!({"$ref": "#/components/schemas/Moved"})
    );
    assert!(doc["components"]["schemas"]["Moved"].is_object());
    assert!(doc["components"]["schemas"]["WidgetQuery"].is_object());

    // a body-carrying input has no marker
    let mut mux = Mux::new();
    mux.post("/widget", widget_cart()).unwrap();
    let doc = generate(&mux);
    assert!(doc["paths"]["/widget"]["post"]
        .get(format!("x-{NO_CONTENT_INPUT}"))
        .is_none());
}

#[test]
fn test_plain_routes_documented_through_route_info() {
    let mut mux = Mux::new();
    mux.method_fn(Method::GET, "/raw", plain)
        .unwrap()
        .with_info(|info| {
            info.with_description("raw bytes")
                .with_output(TypeDescriptor::file());
        });

    let doc = OpenApiGenerator::new()
        .with_default_response("500", document::response("Internal Server Error"))
        .generate(&mux)
        .unwrap();
    let doc = serde_json::to_value(&doc).unwrap();
    let get = &doc["paths"]["/raw"]["get"];
    assert_eq!(get["description"], "raw bytes");
    assert_eq!(
        get["responses"]["200"]["content"]["application/octet-stream"]["schema"],
        json!({"type": "string", "format": "binary"})
    );
    assert_eq!(get["responses"]["500"]["description"], "Internal Server Error");
}

#[test]
fn test_document_info_and_rendering() {
    let mut mux = Mux::new();
    mux.with_info(|info| {
        info.with_title("Widgets").with_version("1.2.0");
    });
    mux.get("/widget", widget_cart()).unwrap();

    let doc = OpenApiGenerator::new().generate(&mux).unwrap();
    assert_eq!(doc.openapi, OPENAPI_VERSION);
    let value: Value = serde_json::from_slice(&document::to_json(&doc).unwrap()).unwrap();
    assert_eq!(value["info"], json!({"title": "Widgets", "version": "1.2.0"}));
    assert!(value["paths"]["/widget"]["get"].is_object());
    assert!(document::to_yaml(&doc).unwrap().contains("title: Widgets"));

    let reparsed = oas3::from_json(document::to_json_pretty(&doc).unwrap()).unwrap();
    assert_eq!(reparsed.info, doc.info);
    assert_eq!(reparsed.operations().count(), 1);
}
