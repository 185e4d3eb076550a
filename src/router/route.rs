use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::convert::TypeDescriptor;
use crate::middleware::RequestErrors;

/// Request type dispatched by the router. The body is already fully received.
pub type HttpRequest = http::Request<Vec<u8>>;
/// Response type produced by endpoints.
pub type HttpResponse = http::Response<Vec<u8>>;

/// Path parameters, stack allocated for up to 8 entries.
pub type ParamVec = SmallVec<[(Arc<str>, String); 8]>;

/// Path parameters of the matched route, stored in the request extensions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(pub ParamVec);

impl PathParams {
    /// Value of the parameter `name`. The last capture wins on duplicates.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn as_slice(&self) -> &[(Arc<str>, String)] {
        &self.0
    }
}

/// Anything the router can dispatch a request to.
pub trait Endpoint: Send + Sync + 'static {
    /// Handle one request.
    ///
    /// Failures are recorded on `errors`; the error middleware decides the
    /// final response.
    fn call(&self, req: HttpRequest, errors: &mut RequestErrors) -> HttpResponse;

    /// Documentation attached when the endpoint is registered.
    fn info(&self) -> RouteInfo {
        RouteInfo::default()
    }
}

/// Adapts a plain closure into an [`Endpoint`] without metadata.
pub struct EndpointFn<F>(pub F);

impl<F> Endpoint for EndpointFn<F>
where
    F: Fn(HttpRequest, &mut RequestErrors) -> HttpResponse + Send + Sync + 'static,
{
    fn call(&self, req: HttpRequest, errors: &mut RequestErrors) -> HttpResponse {
        (self.0)(req, errors)
    }
}

/// Route Metadata: what the schema generator knows about an endpoint.
#[derive(Debug, Clone, Default)]
pub struct RouteInfo {
    pub summary: String,
    pub description: String,
    /// Excluded from generated documents, still routed
    pub hidden: bool,
    pub input: Option<TypeDescriptor>,
    pub output: Option<TypeDescriptor>,
}

impl RouteInfo {
    pub fn with_summary(&mut self, summary: impl Into<String>) -> &mut Self {
        self.summary = summary.into();
        self
    }

    pub fn with_description(&mut self, description: impl Into<String>) -> &mut Self {
        self.description = description.into();
        self
    }

    pub fn with_hidden(&mut self, hidden: bool) -> &mut Self {
        self.hidden = hidden;
        self
    }

    pub fn with_input(&mut self, input: TypeDescriptor) -> &mut Self {
        self.input = Some(input);
        self
    }

    pub fn with_output(&mut self, output: TypeDescriptor) -> &mut Self {
        self.output = Some(output);
        self
    }
}

/// A registered endpoint together with the metadata it owns.
#[derive(Clone)]
pub struct Route {
    endpoint: Arc<dyn Endpoint>,
    info: RouteInfo,
}

impl Route {
    pub fn new<E: Endpoint>(endpoint: E) -> Self {
        let info = endpoint.info();
        Self {
            endpoint: Arc::new(endpoint),
            info,
        }
    }

    /// Edit the metadata before the router starts serving.
    pub fn with_info(&mut self, edit: impl FnOnce(&mut RouteInfo)) -> &mut Self {
        edit(&mut self.info);
        self
    }

    pub fn info(&self) -> &RouteInfo {
        &self.info
    }

    pub fn call(&self, req: HttpRequest, errors: &mut RequestErrors) -> HttpResponse {
        self.endpoint.call(req, errors)
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route").field("info", &self.info).finish()
    }
}
