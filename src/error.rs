use std::fmt;

use http::StatusCode;

use crate::primitive::Shape;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while converting, binding or documenting typed handlers.
///
/// Request-time variants are recorded on the request's
/// [`RequestErrors`](crate::middleware::RequestErrors) and turned into a
/// response by the error middleware. Schema-generation variants are returned
/// synchronously to whoever triggers generation.
#[derive(Debug)]
pub enum Error {
    /// The primitive codec was asked to handle a non-primitive shape.
    UnsupportedType {
        /// The shape that was rejected
        shape: Shape,
    },
    /// A raw string could not be parsed into the target primitive.
    MalformedValue {
        /// The offending input
        value: String,
        /// Rust type the value was decoded into
        target: &'static str,
        /// Shape of the target
        shape: Shape,
        /// Parser message
        reason: String,
    },
    /// A field carries a source tag but is not a primitive or primitive sequence.
    UnsupportedFieldType {
        /// Field name as declared on the struct
        field: &'static str,
        /// Declared shape of the field
        shape: Shape,
    },
    /// The request body could not be read (I/O or size limit).
    BodyRead {
        /// Human readable reason
        reason: String,
        /// Status hint, `413` when the size limit was hit
        status: StatusCode,
    },
    /// The request body does not match the declared shape.
    BodyDecode {
        /// Wire format name (json, yaml, xml, ...)
        format: &'static str,
        /// Underlying structural parse error
        source: BoxError,
    },
    /// The response value could not be serialized.
    BodyEncode {
        /// Wire format name (json, yaml, xml, ...)
        format: &'static str,
        /// Underlying serializer error
        source: BoxError,
    },
    /// A bound value could not be written as a response header.
    InvalidHeader {
        /// Header name
        name: String,
        /// Reason reported by the `http` crate
        reason: String,
    },
    /// The user callback returned an error.
    Handler(anyhow::Error),
    /// Schema generation met an HTTP method it cannot place in a path item.
    UnknownMethod {
        /// The method as registered on the router
        method: String,
        /// Route pattern the method was registered on
        pattern: String,
    },
    /// A route pattern could not be compiled by the router.
    InvalidPattern {
        /// The pattern as registered
        pattern: String,
        /// Regex compiler message
        reason: String,
    },
    /// The generated document or its viewer page could not be rendered.
    Document(BoxError),
}

impl Error {
    /// Status code suggested to the error middleware for this failure.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Error::MalformedValue { .. } | Error::BodyDecode { .. } => StatusCode::BAD_REQUEST,
            Error::BodyRead { status, .. } => *status,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short machine-readable name of the variant, used in logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Error::UnsupportedType { .. } => "unsupported_type",
            Error::MalformedValue { .. } => "malformed_value",
            Error::UnsupportedFieldType { .. } => "unsupported_field_type",
            Error::BodyRead { .. } => "body_read",
            Error::BodyDecode { .. } => "body_decode",
            Error::BodyEncode { .. } => "body_encode",
            Error::InvalidHeader { .. } => "invalid_header",
            Error::Handler(_) => "handler",
            Error::UnknownMethod { .. } => "unknown_method",
            Error::InvalidPattern { .. } => "invalid_pattern",
            Error::Document(_) => "document",
        }
    }

    pub(crate) fn body_decode<E>(format: &'static str, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::BodyDecode {
            format,
            source: Box::new(err),
        }
    }

    pub(crate) fn document<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Document(Box::new(err))
    }

    pub(crate) fn body_encode<E>(format: &'static str, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::BodyEncode {
            format,
            source: Box::new(err),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnsupportedType { shape } => {
                write!(f, "typecart: {shape} is not a primitive type")
            }
            Error::MalformedValue {
                value,
                target,
                shape,
                reason,
            } => write!(
                f,
                "typecart: cannot decode {value:?} into {target} ({shape}): {reason}"
            ),
            Error::UnsupportedFieldType { field, shape } => write!(
                f,
                "typecart: field `{field}` is tagged for binding but its shape is {shape}"
            ),
            Error::BodyRead { reason, .. } => write!(f, "typecart: cannot read body: {reason}"),
            Error::BodyDecode { format, source } => {
                write!(f, "typecart: malformed {format} body: {source}")
            }
            Error::BodyEncode { format, source } => {
                write!(f, "typecart: cannot encode {format} body: {source}")
            }
            Error::InvalidHeader { name, reason } => {
                write!(f, "typecart: invalid header {name}: {reason}")
            }
            Error::Handler(err) => write!(f, "{err}"),
            Error::UnknownMethod { method, pattern } => {
                write!(f, "unknown method: {method} (route {pattern})")
            }
            Error::InvalidPattern { pattern, reason } => {
                write!(f, "invalid route pattern {pattern:?}: {reason}")
            }
            Error::Document(err) => write!(f, "cannot render schema document: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::BodyDecode { source, .. } | Error::BodyEncode { source, .. } => {
                Some(source.as_ref())
            }
            Error::Handler(err) => Some(&**err),
            Error::Document(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Handler(err)
    }
}
