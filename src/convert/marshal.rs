use std::fmt;
use std::marker::PhantomData;

use http::HeaderMap;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{BodyConverter, TypeDescriptor};
use crate::bind::Bindable;
use crate::Error;

/// A structural wire format backed by a serde front-end.
pub trait Format: Send + Sync + 'static {
    /// Name used in error messages
    const NAME: &'static str;
    /// Default MIME types, the first one is sent as `Content-Type`
    const MIME_TYPES: &'static [&'static str];

    fn to_vec<T: Serialize>(value: &T) -> Result<Vec<u8>, Error>;

    fn from_slice<T: DeserializeOwned>(body: &[u8]) -> Result<T, Error>;
}

/// `serde_json`
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormat;

impl Format for JsonFormat {
    const NAME: &'static str = "json";
    const MIME_TYPES: &'static [&'static str] = &["application/json"];

    fn to_vec<T: Serialize>(value: &T) -> Result<Vec<u8>, Error> {
        serde_json::to_vec(value).map_err(|e| Error::body_encode(Self::NAME, e))
    }

    fn from_slice<T: DeserializeOwned>(body: &[u8]) -> Result<T, Error> {
        serde_json::from_slice(body).map_err(|e| Error::body_decode(Self::NAME, e))
    }
}

/// `serde_yaml`
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlFormat;

impl Format for YamlFormat {
    const NAME: &'static str = "yaml";
    const MIME_TYPES: &'static [&'static str] = &["application/x-yaml", "text/yaml"];

    fn to_vec<T: Serialize>(value: &T) -> Result<Vec<u8>, Error> {
        serde_yaml::to_string(value)
            .map(String::into_bytes)
            .map_err(|e| Error::body_encode(Self::NAME, e))
    }

    fn from_slice<T: DeserializeOwned>(body: &[u8]) -> Result<T, Error> {
        serde_yaml::from_slice(body).map_err(|e| Error::body_decode(Self::NAME, e))
    }
}

/// `quick-xml`, the root element is named after the Rust type.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlFormat;

impl Format for XmlFormat {
    const NAME: &'static str = "xml";
    const MIME_TYPES: &'static [&'static str] = &["application/xml"];

    fn to_vec<T: Serialize>(value: &T) -> Result<Vec<u8>, Error> {
        quick_xml::se::to_string(value)
            .map(String::into_bytes)
            .map_err(|e| Error::body_encode(Self::NAME, e))
    }

    fn from_slice<T: DeserializeOwned>(body: &[u8]) -> Result<T, Error> {
        let text = std::str::from_utf8(body).map_err(|e| Error::body_decode(Self::NAME, e))?;
        quick_xml::de::from_str(text).map_err(|e| Error::body_decode(Self::NAME, e))
    }
}

/// Converter delegating to a [`Format`] for the whole value.
pub struct Marshal<T, F> {
    mime_types: Vec<String>,
    _marker: PhantomData<fn() -> (T, F)>,
}

pub type Json<T> = Marshal<T, JsonFormat>;
pub type Yaml<T> = Marshal<T, YamlFormat>;
pub type Xml<T> = Marshal<T, XmlFormat>;

impl<T, F: Format> Marshal<T, F> {
    pub fn new() -> Self {
        Self::with_mime_types(F::MIME_TYPES.iter().copied())
    }

    /// Advertise other MIME types than the format's defaults.
    pub fn with_mime_types(mime_types: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            mime_types: mime_types.into_iter().map(Into::into).collect(),
            _marker: PhantomData,
        }
    }
}

impl<T, F: Format> Default for Marshal<T, F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, F: Format> Clone for Marshal<T, F> {
    fn clone(&self) -> Self {
        Self::with_mime_types(self.mime_types.iter().cloned())
    }
}

impl<T, F: Format> fmt::Debug for Marshal<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Marshal")
            .field("format", &F::NAME)
            .field("value", &std::any::type_name::<T>())
            .field("mime_types", &self.mime_types)
            .finish()
    }
}

impl<T, F> BodyConverter for Marshal<T, F>
where
    T: Serialize + DeserializeOwned + JsonSchema + Bindable + 'static,
    F: Format,
{
    type Value = T;

    fn serialize(&self, value: &T, _headers: &HeaderMap) -> Result<Vec<u8>, Error> {
        F::to_vec(value)
    }

    fn deserialize(&self, body: &[u8], _headers: &HeaderMap) -> Result<T, Error> {
        F::from_slice(body)
    }

    fn describe(&self) -> TypeDescriptor {
        TypeDescriptor::of::<T>(self.mime_types.iter().cloned())
    }
}
