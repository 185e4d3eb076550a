use std::fmt;
use std::marker::PhantomData;

use http::HeaderMap;
use schemars::JsonSchema;

use super::{BodyConverter, TypeDescriptor};
use crate::bind::Bindable;
use crate::Error;

/// The "no body" converter.
///
/// Serializes to zero bytes, deserializes to `T::default()` without looking
/// at the input and advertises no MIME type. `T` still takes part in field
/// binding and documentation.
pub struct NoBody<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> NoBody<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for NoBody<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for NoBody<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for NoBody<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NoBody<{}>", std::any::type_name::<T>())
    }
}

impl<T> BodyConverter for NoBody<T>
where
    T: Default + JsonSchema + Bindable + 'static,
{
    type Value = T;

    fn serialize(&self, _value: &T, _headers: &HeaderMap) -> Result<Vec<u8>, Error> {
        Ok(Vec::new())
    }

    fn deserialize(&self, _body: &[u8], _headers: &HeaderMap) -> Result<T, Error> {
        Ok(T::default())
    }

    fn describe(&self) -> TypeDescriptor {
        TypeDescriptor::none::<T>()
    }
}
