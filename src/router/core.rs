use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use http::header::{HeaderValue, ALLOW, CONTENT_TYPE};
use http::{Method, StatusCode};
use serde_json::json;
use tracing::debug;

use super::matcher::PathMatcher;
use super::route::{Endpoint, EndpointFn, HttpRequest, HttpResponse, ParamVec, PathParams, Route};
use crate::ids::RequestId;
use crate::middleware::{ErrorResponder, Middleware, RequestErrors, RequestHead, TracingMiddleware};
use crate::openapi::{OpenApiGenerator, SpecEndpoint, SwaggerUi};
use crate::runtime_config::CartConfig;
use crate::Error;

/// Method key matching every method, registered by [`Mux::handle`].
pub const ANY_METHOD: &str = "*";

/// Router-level documentation, emitted as the document's `info` object.
#[derive(Debug, Clone)]
pub struct RouterInfo {
    pub title: String,
    pub summary: String,
    pub description: String,
    pub version: String,
}

impl Default for RouterInfo {
    fn default() -> Self {
        Self {
            title: "API".to_string(),
            summary: String::new(),
            description: String::new(),
            version: "0.0.0".to_string(),
        }
    }
}

impl RouterInfo {
    pub fn with_title(&mut self, title: impl Into<String>) -> &mut Self {
        self.title = title.into();
        self
    }

    pub fn with_summary(&mut self, summary: impl Into<String>) -> &mut Self {
        self.summary = summary.into();
        self
    }

    pub fn with_description(&mut self, description: impl Into<String>) -> &mut Self {
        self.description = description.into();
        self
    }

    pub fn with_version(&mut self, version: impl Into<String>) -> &mut Self {
        self.version = version.into();
        self
    }
}

/// One registered pattern as seen by route enumeration.
pub struct RouteEntry<'a> {
    /// Pattern as registered, mounts end in `/*`
    pub pattern: &'a str,
    /// Method name to route, empty for mounts
    pub handlers: Vec<(&'a str, &'a Route)>,
    /// Mounted router, if any
    pub sub_routes: Option<&'a dyn Routes>,
}

/// Route enumeration, consumed by the schema walker.
pub trait Routes {
    fn routes(&self) -> Vec<RouteEntry<'_>>;

    fn info(&self) -> &RouterInfo;
}

enum Node {
    Handlers {
        pattern: String,
        matcher: PathMatcher,
        routes: BTreeMap<String, Route>,
    },
    Mount {
        pattern: String,
        prefix_len: usize,
        matcher: PathMatcher,
        router: Box<Mux>,
    },
}

enum Outcome<'a> {
    Found(&'a Route, ParamVec),
    MethodNotAllowed(Vec<&'a str>),
    NotFound,
}

/// The router: patterns, mounted sub-routers and middleware.
///
/// Registration happens before serving; afterwards the router is only read,
/// so a shared `&Mux` can serve requests and generate documents at the
/// same time.
#[derive(Default)]
pub struct Mux {
    nodes: Vec<Node>,
    middlewares: Vec<Arc<dyn Middleware>>,
    not_found: Option<Route>,
    method_not_allowed: Option<Route>,
    info: RouterInfo,
}

impl Mux {
    pub fn new() -> Self {
        Self::default()
    }

    /// A router with [`TracingMiddleware`] and [`ErrorResponder`] installed.
    pub fn standard() -> Self {
        let mut mux = Self::new();
        mux.use_middleware(TracingMiddleware)
            .use_middleware(ErrorResponder);
        mux
    }

    /// Edit title, summary, description and version.
    pub fn with_info(&mut self, edit: impl FnOnce(&mut RouterInfo)) -> &mut Self {
        edit(&mut self.info);
        self
    }

    pub fn use_middleware(&mut self, middleware: impl Middleware + 'static) -> &mut Self {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    /// Register `endpoint` for `method` requests matching `pattern`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidPattern`] when the pattern does not compile.
    pub fn method(
        &mut self,
        method: Method,
        pattern: &str,
        endpoint: impl Endpoint,
    ) -> Result<&mut Route, Error> {
        self.insert(method.as_str().to_string(), pattern, Route::new(endpoint))
    }

    /// Register a plain closure without documentation.
    pub fn method_fn<F>(&mut self, method: Method, pattern: &str, f: F) -> Result<&mut Route, Error>
    where
        F: Fn(HttpRequest, &mut RequestErrors) -> HttpResponse + Send + Sync + 'static,
    {
        self.method(method, pattern, EndpointFn(f))
    }

    /// Register `endpoint` for every method.
    pub fn handle(&mut self, pattern: &str, endpoint: impl Endpoint) -> Result<&mut Route, Error> {
        self.insert(ANY_METHOD.to_string(), pattern, Route::new(endpoint))
    }

    pub fn get(&mut self, pattern: &str, endpoint: impl Endpoint) -> Result<&mut Route, Error> {
        self.method(Method::GET, pattern, endpoint)
    }

    pub fn post(&mut self, pattern: &str, endpoint: impl Endpoint) -> Result<&mut Route, Error> {
        self.method(Method::POST, pattern, endpoint)
    }

    pub fn put(&mut self, pattern: &str, endpoint: impl Endpoint) -> Result<&mut Route, Error> {
        self.method(Method::PUT, pattern, endpoint)
    }

    pub fn delete(&mut self, pattern: &str, endpoint: impl Endpoint) -> Result<&mut Route, Error> {
        self.method(Method::DELETE, pattern, endpoint)
    }

    pub fn patch(&mut self, pattern: &str, endpoint: impl Endpoint) -> Result<&mut Route, Error> {
        self.method(Method::PATCH, pattern, endpoint)
    }

    /// Build a sub-router mounted at `prefix/*`.
    pub fn route(
        &mut self,
        prefix: &str,
        build: impl FnOnce(&mut Mux) -> Result<(), Error>,
    ) -> Result<&mut Self, Error> {
        let mut sub = Mux::new();
        build(&mut sub)?;
        self.mount(prefix, sub)
    }

    /// Mount `router` under `prefix`. It sees the remaining path.
    pub fn mount(&mut self, prefix: &str, router: Mux) -> Result<&mut Self, Error> {
        let prefix = prefix.trim_end_matches('/');
        let pattern = format!("{prefix}/*");
        let matcher = PathMatcher::compile(&pattern)?;
        self.nodes.push(Node::Mount {
            pattern,
            prefix_len: prefix.len(),
            matcher,
            router: Box::new(router),
        });
        Ok(self)
    }

    /// Inline router sharing this router's prefix, with its own middleware.
    pub fn group(
        &mut self,
        build: impl FnOnce(&mut Mux) -> Result<(), Error>,
    ) -> Result<&mut Self, Error> {
        self.route("", build)
    }

    /// Endpoint used when no pattern matches.
    pub fn not_found(&mut self, endpoint: impl Endpoint) -> &mut Self {
        self.not_found = Some(Route::new(endpoint));
        self
    }

    /// Endpoint used when a pattern matches but not the method.
    pub fn method_not_allowed(&mut self, endpoint: impl Endpoint) -> &mut Self {
        self.method_not_allowed = Some(Route::new(endpoint));
        self
    }

    /// Generate the OpenAPI document for the routes registered so far and
    /// mount it at `config.docs_path`, plus a viewer at `config.docs_ui_path`.
    ///
    /// # Errors
    ///
    /// Generation errors such as [`Error::UnknownMethod`], reported before
    /// anything is mounted.
    pub fn with_docs(
        &mut self,
        generator: &OpenApiGenerator,
        config: &CartConfig,
    ) -> Result<&mut Self, Error> {
        let document = generator.generate(&*self)?;
        let spec = SpecEndpoint::new(&document)?;
        self.get(&config.docs_path, spec)?;
        let ui = SwaggerUi::new(&document.info.title, &config.docs_path)?;
        self.get(&config.docs_ui_path, ui)?;
        Ok(self)
    }

    fn insert(&mut self, method: String, pattern: &str, route: Route) -> Result<&mut Route, Error> {
        let existing = self
            .nodes
            .iter()
            .position(|n| match n {
                Node::Handlers { pattern: p, .. } | Node::Mount { pattern: p, .. } => p == pattern,
            });
        let idx = match existing {
            Some(idx) => idx,
            None => {
                let matcher = PathMatcher::compile(pattern)?;
                self.nodes.push(Node::Handlers {
                    pattern: pattern.to_string(),
                    matcher,
                    routes: BTreeMap::new(),
                });
                self.nodes.len() - 1
            }
        };
        debug!(method = %method, pattern, "route registered");
        match &mut self.nodes[idx] {
            Node::Handlers { routes, .. } => match routes.entry(method) {
                Entry::Occupied(mut entry) => {
                    entry.insert(route);
                    Ok(entry.into_mut())
                }
                Entry::Vacant(entry) => Ok(entry.insert(route)),
            },
            Node::Mount { .. } => Err(Error::InvalidPattern {
                pattern: pattern.to_string(),
                reason: "pattern is already used by a mount".to_string(),
            }),
        }
    }

    /// Resolve `path`, collecting every router passed on the way.
    fn resolve<'a>(&'a self, method: &str, path: &str, chain: &mut Vec<&'a Mux>) -> Outcome<'a> {
        chain.push(self);

        let mut handlers: Vec<(&PathMatcher, &BTreeMap<String, Route>, ParamVec)> = self
            .nodes
            .iter()
            .filter_map(|node| match node {
                Node::Handlers { matcher, routes, .. } => {
                    matcher.matches(path).map(|m| (matcher, routes, m.params))
                }
                Node::Mount { .. } => None,
            })
            .collect();
        // Stable: equal specificity keeps registration order
        handlers.sort_by(|a, b| b.0.specificity().cmp(&a.0.specificity()));

        let mut allowed: Vec<&'a str> = Vec::new();
        for (_, routes, params) in handlers {
            if let Some(route) = routes.get(method).or_else(|| routes.get(ANY_METHOD)) {
                return Outcome::Found(route, params);
            }
            allowed.extend(routes.keys().map(String::as_str));
        }

        let mut mounts: Vec<(usize, &PathMatcher, &Mux)> = self
            .nodes
            .iter()
            .filter_map(|node| match node {
                Node::Mount {
                    prefix_len,
                    matcher,
                    router,
                    ..
                } => Some((*prefix_len, matcher, router.as_ref())),
                Node::Handlers { .. } => None,
            })
            .collect();
        mounts.sort_by(|a, b| b.0.cmp(&a.0));

        // routers under the longest matching non-empty prefix own the 404
        let mut owner: Option<Vec<&'a Mux>> = None;
        for (prefix_len, matcher, router) in mounts {
            let Some(found) = matcher.matches(path) else {
                continue;
            };
            let rest = found.rest.unwrap_or_else(|| "/".to_string());
            let depth = chain.len();
            match router.resolve(method, &rest, chain) {
                Outcome::Found(route, params) => {
                    let mut merged = found.params;
                    merged.extend(params);
                    return Outcome::Found(route, merged);
                }
                Outcome::MethodNotAllowed(methods) => {
                    allowed.extend(methods);
                    chain.truncate(depth);
                }
                Outcome::NotFound => {
                    if owner.is_none() && prefix_len > 0 {
                        owner = Some(chain.split_off(depth));
                    } else {
                        chain.truncate(depth);
                    }
                }
            }
        }

        if allowed.is_empty() {
            chain.extend(owner.unwrap_or_default());
            Outcome::NotFound
        } else {
            allowed.sort_unstable();
            allowed.dedup();
            Outcome::MethodNotAllowed(allowed)
        }
    }

    /// Dispatch one request through middleware and the matched route.
    ///
    /// The request id is taken from `x-request-id` or generated, and stored
    /// in the request extensions together with the [`PathParams`].
    pub fn serve(&self, mut req: HttpRequest) -> HttpResponse {
        let start = Instant::now();
        let request_id = RequestId::from_headers(req.headers());
        req.extensions_mut().insert(request_id);
        let mut errors = RequestErrors::new(request_id);
        let head = RequestHead::from_request(&req, request_id);

        let mut chain = Vec::new();
        let outcome = self.resolve(req.method().as_str(), req.uri().path(), &mut chain);
        let middlewares: Vec<&Arc<dyn Middleware>> =
            chain.iter().flat_map(|mux| mux.middlewares.iter()).collect();

        let mut ran = 0;
        let mut early = None;
        for mw in &middlewares {
            ran += 1;
            if let Some(res) = mw.before(&head, &mut errors) {
                early = Some(res);
                break;
            }
        }

        let mut response = match early {
            Some(res) => res,
            None => match outcome {
                Outcome::Found(route, params) => {
                    req.extensions_mut().insert(PathParams(params));
                    route.call(req, &mut errors)
                }
                Outcome::MethodNotAllowed(allowed) => {
                    match chain.iter().rev().find_map(|m| m.method_not_allowed.as_ref()) {
                        Some(route) => route.call(req, &mut errors),
                        None => method_not_allowed_response(&head, &allowed),
                    }
                }
                Outcome::NotFound => match chain.iter().rev().find_map(|m| m.not_found.as_ref()) {
                    Some(route) => route.call(req, &mut errors),
                    None => json_error(StatusCode::NOT_FOUND, &head),
                },
            },
        };

        for mw in middlewares[..ran].iter().rev() {
            mw.after(&head, &mut response, &mut errors, start.elapsed());
        }
        response
    }
}

fn json_error(status: StatusCode, head: &RequestHead) -> HttpResponse {
    let body = json!({
        "error": status.canonical_reason().unwrap_or_default(),
        "method": head.method.as_str(),
        "path": head.path(),
    });
    let mut res = HttpResponse::new(body.to_string().into_bytes());
    *res.status_mut() = status;
    res.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    res
}

fn method_not_allowed_response(head: &RequestHead, allowed: &[&str]) -> HttpResponse {
    let mut res = json_error(StatusCode::METHOD_NOT_ALLOWED, head);
    let methods: Vec<&str> = allowed.iter().copied().filter(|m| *m != ANY_METHOD).collect();
    if let Ok(value) = HeaderValue::from_str(&methods.join(", ")) {
        res.headers_mut().insert(ALLOW, value);
    }
    res
}

impl Routes for Mux {
    fn routes(&self) -> Vec<RouteEntry<'_>> {
        self.nodes
            .iter()
            .map(|node| match node {
                Node::Handlers { pattern, routes, .. } => RouteEntry {
                    pattern,
                    handlers: routes.iter().map(|(m, r)| (m.as_str(), r)).collect(),
                    sub_routes: None,
                },
                Node::Mount { pattern, router, .. } => RouteEntry {
                    pattern,
                    handlers: Vec::new(),
                    sub_routes: Some(router.as_ref() as &dyn Routes),
                },
            })
            .collect()
    }

    fn info(&self) -> &RouterInfo {
        &self.info
    }
}
