use http::header::{HeaderName, HeaderValue};
use http::HeaderMap;

use super::{Binding, Source};
use crate::Error;

/// A response location the binder can write encoded fields into.
///
/// Only response headers exist today. Cookies would be another destination
/// accepting its own source.
pub trait Destination {
    /// Whether fields bound from `source` are written here.
    fn accepts(&self, source: Source) -> bool;

    /// Store the encoded values of one binding.
    ///
    /// # Errors
    ///
    /// Implementation specific, for headers [`Error::InvalidHeader`].
    fn write(&mut self, binding: &Binding, values: Vec<String>) -> Result<(), Error>;
}

/// Writes `header`-tagged fields as response headers, joined with `,`.
pub struct HeaderDestination<'a> {
    headers: &'a mut HeaderMap,
}

impl<'a> HeaderDestination<'a> {
    pub fn new(headers: &'a mut HeaderMap) -> Self {
        Self { headers }
    }
}

impl Destination for HeaderDestination<'_> {
    fn accepts(&self, source: Source) -> bool {
        source == Source::Header
    }

    fn write(&mut self, binding: &Binding, values: Vec<String>) -> Result<(), Error> {
        let invalid = |reason: String| Error::InvalidHeader {
            name: binding.key.to_string(),
            reason,
        };
        let name = HeaderName::from_bytes(binding.key.as_bytes()).map_err(|e| invalid(e.to_string()))?;
        let value = HeaderValue::from_str(&values.join(",")).map_err(|e| invalid(e.to_string()))?;
        self.headers.insert(name, value);
        Ok(())
    }
}
