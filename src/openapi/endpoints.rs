use http::header::{HeaderValue, CONTENT_TYPE};
use minijinja::{context, Environment};

use super::document::{self, OpenApiDocument};
use crate::middleware::RequestErrors;
use crate::router::{Endpoint, HttpRequest, HttpResponse, RouteInfo};
use crate::Error;

const SWAGGER_UI_TEMPLATE: &str = "swagger_ui.html";

/// Serves a generated document as `application/json`.
///
/// The document is rendered once at construction. The route itself is
/// hidden from generated documents.
#[derive(Debug, Clone)]
pub struct SpecEndpoint {
    body: Vec<u8>,
}

impl SpecEndpoint {
    /// # Errors
    ///
    /// [`Error::Document`] when the document cannot be rendered.
    pub fn new(doc: &OpenApiDocument) -> Result<Self, Error> {
        Ok(Self {
            body: document::to_json(doc)?,
        })
    }
}

impl Endpoint for SpecEndpoint {
    fn call(&self, _req: HttpRequest, _errors: &mut RequestErrors) -> HttpResponse {
        let mut res = HttpResponse::new(self.body.clone());
        res.headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        res
    }

    fn info(&self) -> RouteInfo {
        let mut info = RouteInfo::default();
        info.with_summary("OpenAPI document").with_hidden(true);
        info
    }
}

/// Minimal HTML page loading swagger-ui from a CDN and pointing it at the
/// document URL.
///
/// The title is HTML-escaped; the URL is embedded as a JSON string literal.
#[derive(Debug, Clone)]
pub struct SwaggerUi {
    html: String,
}

impl SwaggerUi {
    /// Render the page for a document titled `title` served at `spec_url`.
    ///
    /// # Errors
    ///
    /// [`Error::Document`] when the page template fails to render.
    pub fn new(title: &str, spec_url: &str) -> Result<Self, Error> {
        let mut env = Environment::new();
        env.add_template(SWAGGER_UI_TEMPLATE, include_str!("swagger_ui.html"))
            .map_err(Error::document)?;
        let html = env
            .get_template(SWAGGER_UI_TEMPLATE)
            .and_then(|tmpl| {
                tmpl.render(context! {
                    title => title,
                    spec_url => spec_url,
                })
            })
            .map_err(Error::document)?;
        Ok(Self { html })
    }

    pub fn html(&self) -> &str {
        &self.html
    }
}

impl Endpoint for SwaggerUi {
    fn call(&self, _req: HttpRequest, _errors: &mut RequestErrors) -> HttpResponse {
        let mut res = HttpResponse::new(self.html.as_bytes().to_vec());
        res.headers_mut().insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/html; charset=utf-8"),
        );
        res
    }

    fn info(&self) -> RouteInfo {
        let mut info = RouteInfo::default();
        info.with_hidden(true);
        info
    }
}
