use std::fmt;

use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::request::Parts;
use http::StatusCode;
use schemars::JsonSchema;
use tracing::{debug, warn};

use super::request::{HeaderWriter, Request};
use crate::bind::{
    binds, decode_fields, encode_fields, Bindable, HeaderDestination, HeaderValues, PathValues,
    Source, UrlValues,
};
use crate::convert::{BodyConverter, NoBody, TypeDescriptor};
use crate::middleware::RequestErrors;
use crate::router::{Endpoint, HttpRequest, HttpResponse, PathParams, RouteInfo};
use crate::runtime_config;
use crate::Error;

/// Informational header listing the MIME types the endpoint accepts.
pub const ACCEPTS: HeaderName = HeaderName::from_static("accepts");

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Steps of one typed request.
///
/// `Errored` is entered from any step; nothing else is written afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    AdvertiseContentHeaders,
    DecodeBody,
    BindInboundFields,
    Invoke,
    BindOutboundFields,
    EncodeBody,
    Done,
    Errored,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Documentation edited through [`Cart::with_info`].
#[derive(Debug, Clone, Default)]
pub struct CartInfo {
    pub summary: String,
    pub description: String,
    pub hidden: bool,
}

impl CartInfo {
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
}

/// A typed endpoint: input converter, output converter and callback.
///
/// Build one with [`io`], [`i`], [`o`] or [`a`] and register it on a
/// [`Mux`](crate::router::Mux).
pub struct Cart<I, O, F> {
    input: I,
    output: O,
    handler: F,
    info: CartInfo,
    input_type: TypeDescriptor,
    output_type: TypeDescriptor,
    max_body_bytes: usize,
}

/// Decode the input body and encode the output body.
pub fn io<I, O, F>(input: I, output: O, handler: F) -> Cart<I, O, F>
where
    I: BodyConverter,
    O: BodyConverter,
    F: Fn(Request<I::Value>, &mut HeaderWriter) -> anyhow::Result<O::Value> + Send + Sync + 'static,
{
    let input_type = input.describe();
    let output_type = output.describe();
    Cart {
        input,
        output,
        handler,
        info: CartInfo::default(),
        input_type,
        output_type,
        max_body_bytes: runtime_config::global().max_body_bytes,
    }
}

/// Decode the input body, write no response body.
///
/// `T` can still carry fields bound to response headers.
pub fn i<I, T, F>(input: I, handler: F) -> Cart<I, NoBody<T>, F>
where
    I: BodyConverter,
    T: Default + JsonSchema + Bindable + 'static,
    F: Fn(Request<I::Value>, &mut HeaderWriter) -> anyhow::Result<T> + Send + Sync + 'static,
{
    io(input, NoBody::new(), handler)
}

/// Read no request body, encode the output body.
///
/// `T` can still carry fields bound from path, query, form and headers.
pub fn o<T, O, F>(output: O, handler: F) -> Cart<NoBody<T>, O, F>
where
    T: Default + JsonSchema + Bindable + 'static,
    O: BodyConverter,
    F: Fn(Request<T>, &mut HeaderWriter) -> anyhow::Result<O::Value> + Send + Sync + 'static,
{
    io(NoBody::new(), output, handler)
}

/// Neither body, both types are used for bound fields only.
pub fn a<T, U, F>(handler: F) -> Cart<NoBody<T>, NoBody<U>, F>
where
    T: Default + JsonSchema + Bindable + 'static,
    U: Default + JsonSchema + Bindable + 'static,
    F: Fn(Request<T>, &mut HeaderWriter) -> anyhow::Result<U> + Send + Sync + 'static,
{
    io(NoBody::new(), NoBody::new(), handler)
}

impl<I, O, F> Cart<I, O, F>
where
    I: BodyConverter,
    O: BodyConverter,
    F: Fn(Request<I::Value>, &mut HeaderWriter) -> anyhow::Result<O::Value> + Send + Sync + 'static,
{
    /// Edit summary, description and visibility.
    pub fn with_info(mut self, edit: impl FnOnce(&mut CartInfo)) -> Self {
        edit(&mut self.info);
        self
    }

    /// Override the body limit taken from `TYPECART_MAX_BODY_BYTES`.
    pub fn with_max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }

    pub fn input_type(&self) -> &TypeDescriptor {
        &self.input_type
    }

    pub fn output_type(&self) -> &TypeDescriptor {
        &self.output_type
    }

    fn check_limit(&self, body: &[u8]) -> Result<(), Error> {
        if body.len() > self.max_body_bytes {
            return Err(Error::BodyRead {
                reason: format!(
                    "body of {} bytes exceeds the limit of {} bytes",
                    body.len(),
                    self.max_body_bytes
                ),
                status: StatusCode::PAYLOAD_TOO_LARGE,
            });
        }
        Ok(())
    }

    fn advertise(&self, writer: &mut HeaderWriter) -> Result<(), Error> {
        let header_value = |name: &HeaderName, mime: &str| {
            HeaderValue::from_str(mime).map_err(|e| Error::InvalidHeader {
                name: name.to_string(),
                reason: e.to_string(),
            })
        };
        let headers = writer.headers_mut();
        if let Some(mime) = self.output_type.content_type() {
            headers.insert(CONTENT_TYPE, header_value(&CONTENT_TYPE, mime)?);
        }
        for mime in self.input_type.mime_types() {
            headers.append(ACCEPTS, header_value(&ACCEPTS, mime)?);
        }
        Ok(())
    }

    fn decode(&self, parts: &Parts, body: &[u8]) -> Result<I::Value, Error> {
        if !self.input_type.has_body() {
            return self.input.deserialize(&[], &parts.headers);
        }
        self.check_limit(body)?;
        self.input.deserialize(body, &parts.headers)
    }

    fn bind_inbound(&self, parts: &Parts, body: &[u8], value: &mut I::Value) -> Result<usize, Error> {
        let params = parts.extensions.get::<PathParams>();
        let path = PathValues::new(params.map(PathParams::as_slice).unwrap_or_default());
        let query = UrlValues::query(parts.uri.query());
        let form = if binds::<I::Value>(Source::Form) && is_form(parts) {
            self.check_limit(body)?;
            UrlValues::form(body)
        } else {
            UrlValues::empty_form()
        };
        let header = HeaderValues::header(&parts.headers);
        let meta = HeaderValues::meta(&parts.headers);
        decode_fields(value, &[&path, &query, &form, &header, &meta])
    }

    fn run(
        &self,
        req: HttpRequest,
        writer: &mut HeaderWriter,
        stage: &mut Stage,
    ) -> Result<(StatusCode, Vec<u8>), Error> {
        let (parts, body) = req.into_parts();

        *stage = Stage::AdvertiseContentHeaders;
        self.advertise(writer)?;

        *stage = Stage::DecodeBody;
        let mut value = self.decode(&parts, &body)?;

        if <I::Value as Bindable>::AGGREGATE {
            *stage = Stage::BindInboundFields;
            let bound = self.bind_inbound(&parts, &body, &mut value)?;
            debug!(bound, "bound inbound fields");
        }

        *stage = Stage::Invoke;
        let output = (self.handler)(Request::new(parts, value), writer).map_err(Error::Handler)?;

        if <O::Value as Bindable>::AGGREGATE {
            *stage = Stage::BindOutboundFields;
            let mut headers = HeaderDestination::new(writer.headers_mut());
            let written = encode_fields(&output, &mut [&mut headers])?;
            debug!(written, "bound outbound fields");
        }

        *stage = Stage::EncodeBody;
        if !self.output_type.has_body() {
            return Ok((writer.status().unwrap_or(StatusCode::NO_CONTENT), Vec::new()));
        }
        let bytes = self.output.serialize(&output, writer.headers())?;
        Ok((writer.status().unwrap_or(StatusCode::OK), bytes))
    }
}

fn is_form(parts: &Parts) -> bool {
    parts
        .headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.trim_start().starts_with(FORM_URLENCODED))
}

impl<I, O, F> Endpoint for Cart<I, O, F>
where
    I: BodyConverter,
    O: BodyConverter,
    F: Fn(Request<I::Value>, &mut HeaderWriter) -> anyhow::Result<O::Value> + Send + Sync + 'static,
{
    fn call(&self, req: HttpRequest, errors: &mut RequestErrors) -> HttpResponse {
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        let mut writer = HeaderWriter::new();
        let mut stage = Stage::Start;

        let (status, body) = match self.run(req, &mut writer, &mut stage) {
            Ok((status, body)) => {
                stage = Stage::Done;
                debug!(%method, %path, %stage, status = status.as_u16(), "typed request done");
                (status, body)
            }
            Err(err) => {
                let failed_at = std::mem::replace(&mut stage, Stage::Errored);
                warn!(
                    request_id = %errors.id(),
                    %method,
                    %path,
                    %failed_at,
                    kind = err.kind(),
                    error = %err,
                    "typed request failed"
                );
                let status = err.status();
                errors.add_error(err);
                (status, Vec::new())
            }
        };

        let (_, headers) = writer.into_parts();
        let mut res = HttpResponse::new(body);
        *res.status_mut() = status;
        *res.headers_mut() = headers;
        res
    }

    fn info(&self) -> RouteInfo {
        RouteInfo {
            summary: self.info.summary.clone(),
            description: self.info.description.clone(),
            hidden: self.info.hidden,
            input: Some(self.input_type.clone()),
            output: Some(self.output_type.clone()),
        }
    }
}
