use http::HeaderMap;

use super::{BodyConverter, TypeDescriptor};
use crate::Error;

/// Raw bytes passed through unchanged.
#[derive(Debug, Clone)]
pub struct Binary {
    mime_types: Vec<String>,
}

impl Binary {
    pub fn new(mime_types: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            mime_types: mime_types.into_iter().map(Into::into).collect(),
        }
    }

    /// `application/octet-stream`
    pub fn file() -> Self {
        Self::new(["application/octet-stream"])
    }
}

impl BodyConverter for Binary {
    type Value = Vec<u8>;

    fn serialize(&self, value: &Vec<u8>, _headers: &HeaderMap) -> Result<Vec<u8>, Error> {
        Ok(value.clone())
    }

    fn deserialize(&self, body: &[u8], _headers: &HeaderMap) -> Result<Vec<u8>, Error> {
        Ok(body.to_vec())
    }

    fn describe(&self) -> TypeDescriptor {
        TypeDescriptor::binary(self.mime_types.iter().cloned())
    }
}
