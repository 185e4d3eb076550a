//! # Body Converters
//!
//! A [`BodyConverter`] turns a typed value into a complete message body and
//! back, and describes itself with a [`TypeDescriptor`]: the reflected shape
//! of the value plus the MIME types it produces or accepts.
//!
//! | Converter        | Value       | MIME types                               |
//! |------------------|-------------|------------------------------------------|
//! | [`Json<T>`]      | `T`         | `application/json`                       |
//! | [`Yaml<T>`]      | `T`         | `application/x-yaml`, `text/yaml`        |
//! | [`Xml<T>`]       | `T`         | `application/xml`                        |
//! | [`Binary`]       | `Vec<u8>`   | chosen by the caller                     |
//! | [`NoBody<T>`]    | `T`         | none                                     |
//!
//! Converters are chosen when a handler is built and hold no per-request
//! state, so one instance serves any number of concurrent requests.
//!
//! An empty MIME set means "no body": the typed handler neither reads the
//! request body nor writes a response body, and the value only carries
//! bound fields.

mod binary;
mod empty;
mod marshal;

use http::HeaderMap;
use schemars::{JsonSchema, Schema, SchemaGenerator};

use crate::bind::{field_schema, Binding, Bindable};
use crate::Error;
pub use binary::Binary;
pub use empty::NoBody;
pub use marshal::{Format, Json, JsonFormat, Marshal, Xml, XmlFormat, Yaml, YamlFormat};

/// Shape and MIME types of a body value.
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    type_name: &'static str,
    mime_types: Vec<String>,
    schema: fn(&mut SchemaGenerator) -> Schema,
    bindings: fn() -> &'static [Binding],
}

impl TypeDescriptor {
    /// Describe `T` as produced or accepted under `mime_types`.
    pub fn of<T>(mime_types: impl IntoIterator<Item = impl Into<String>>) -> Self
    where
        T: JsonSchema + Bindable,
    {
        Self {
            type_name: std::any::type_name::<T>(),
            mime_types: mime_types.into_iter().map(Into::into).collect(),
            schema: field_schema::<T>,
            bindings: T::bindings,
        }
    }

    pub fn json<T: JsonSchema + Bindable>() -> Self {
        Self::of::<T>(JsonFormat::MIME_TYPES.iter().copied())
    }

    pub fn yaml<T: JsonSchema + Bindable>() -> Self {
        Self::of::<T>(YamlFormat::MIME_TYPES.iter().copied())
    }

    pub fn xml<T: JsonSchema + Bindable>() -> Self {
        Self::of::<T>(XmlFormat::MIME_TYPES.iter().copied())
    }

    /// `T` exists only for its bound fields, there is no body.
    pub fn none<T: JsonSchema + Bindable>() -> Self {
        Self::of::<T>(std::iter::empty::<String>())
    }

    /// Raw bytes under the given MIME types.
    pub fn binary(mime_types: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            type_name: "bytes",
            mime_types: mime_types.into_iter().map(Into::into).collect(),
            schema: binary_schema,
            bindings: <Vec<u8> as Bindable>::bindings,
        }
    }

    /// An arbitrary file, `application/octet-stream`.
    pub fn file() -> Self {
        Self::binary(["application/octet-stream"])
    }

    /// Rust type name of the described value.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn mime_types(&self) -> &[String] {
        &self.mime_types
    }

    /// Whether a body is read or written for this type.
    pub fn has_body(&self) -> bool {
        !self.mime_types.is_empty()
    }

    /// Canonical `Content-Type`, the first MIME type.
    pub fn content_type(&self) -> Option<&str> {
        self.mime_types.first().map(String::as_str)
    }

    /// Reflect the value's schema into `generator`.
    pub fn schema(&self, generator: &mut SchemaGenerator) -> Schema {
        (self.schema)(generator)
    }

    /// Field bindings declared by the value type.
    pub fn bindings(&self) -> &'static [Binding] {
        (self.bindings)()
    }
}

fn binary_schema(_: &mut SchemaGenerator) -> Schema {
    schemars::json_schema!({
        "type": "string",
        "format": "binary"
    })
}

/// Translates a typed value to and from a full message body.
pub trait BodyConverter: Send + Sync + 'static {
    /// The typed value carried in the body.
    type Value: Bindable;

    /// Encode `value` as a response body.
    ///
    /// # Errors
    ///
    /// [`Error::BodyEncode`] when the value cannot be represented.
    fn serialize(&self, value: &Self::Value, headers: &HeaderMap) -> Result<Vec<u8>, Error>;

    /// Decode a request body.
    ///
    /// # Errors
    ///
    /// [`Error::BodyDecode`] carrying the parser error when `body` does not
    /// match the declared shape.
    fn deserialize(&self, body: &[u8], headers: &HeaderMap) -> Result<Self::Value, Error>;

    /// Shape and MIME types of the value.
    fn describe(&self) -> TypeDescriptor;
}
