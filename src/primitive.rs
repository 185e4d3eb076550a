//! # Primitive Codec
//!
//! Converts scalar values to and from their string wire representation, the
//! form they take in headers, query strings, form data and path segments.
//!
//! Supported kinds are booleans, signed and unsigned integers of any width,
//! floating point numbers and strings. Sequences of primitives travel as one
//! comma-joined string (`1,2,3`).
//!
//! Floating point values are rendered with the shortest decimal that parses
//! back to the same value, and nothing is locale dependent.

use std::collections::HashMap;
use std::fmt;

use crate::Error;

/// Separator used for sequences of primitives on the wire.
pub const SEQUENCE_SEPARATOR: char = ',';

/// Primitive kinds understood by the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Bool,
    Int,
    Uint,
    Float,
    String,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Uint => "uint",
            Kind::Float => "float",
            Kind::String => "string",
        };
        f.write_str(s)
    }
}

/// Structural shape of a bindable value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// A single primitive
    Primitive(Kind),
    /// A sequence of primitives
    Sequence(Kind),
    /// A struct, map or other structured value
    Aggregate,
    /// Raw bytes or anything else without inner structure
    Opaque,
}

impl Shape {
    /// Whether values of this shape can be bound from scalar request sources.
    #[must_use]
    pub fn is_bindable(&self) -> bool {
        matches!(self, Shape::Primitive(_) | Shape::Sequence(_))
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Primitive(kind) => write!(f, "{kind}"),
            Shape::Sequence(kind) => write!(f, "[]{kind}"),
            Shape::Aggregate => f.write_str("aggregate"),
            Shape::Opaque => f.write_str("opaque"),
        }
    }
}

/// A scalar with a string wire representation.
pub trait Primitive: Sized {
    /// Kind reported in errors and used for shape checks
    const KIND: Kind;

    /// Encode the value as its wire string.
    fn encode(&self) -> String;

    /// Decode a wire string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedValue`] when `raw` is not a valid literal
    /// for the target type.
    fn decode(raw: &str) -> Result<Self, Error>;
}

fn malformed<T>(raw: &str, kind: Kind, reason: impl fmt::Display) -> Error {
    Error::MalformedValue {
        value: raw.to_string(),
        target: std::any::type_name::<T>(),
        shape: Shape::Primitive(kind),
        reason: reason.to_string(),
    }
}

/// Parse a boolean literal.
///
/// Accepts `1 t T TRUE true True` and `0 f F FALSE false False`.
#[must_use]
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim() {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

impl Primitive for bool {
    const KIND: Kind = Kind::Bool;

    fn encode(&self) -> String {
        if *self { "true" } else { "false" }.to_string()
    }

    fn decode(raw: &str) -> Result<Self, Error> {
        parse_bool(raw).ok_or_else(|| malformed::<bool>(raw, Kind::Bool, "invalid syntax"))
    }
}

impl Primitive for String {
    const KIND: Kind = Kind::String;

    fn encode(&self) -> String {
        self.clone()
    }

    fn decode(raw: &str) -> Result<Self, Error> {
        Ok(raw.to_string())
    }
}

macro_rules! impl_parsed {
    ($kind:expr => $($t:ty),+ $(,)?) => {$(
        impl Primitive for $t {
            const KIND: Kind = $kind;

            fn encode(&self) -> String {
                self.to_string()
            }

            fn decode(raw: &str) -> Result<Self, Error> {
                raw.trim()
                    .parse::<$t>()
                    .map_err(|err| malformed::<$t>(raw, $kind, err))
            }
        }
    )+};
}

impl_parsed!(Kind::Int => i8, i16, i32, i64, i128, isize);
impl_parsed!(Kind::Uint => u8, u16, u32, u64, u128, usize);
impl_parsed!(Kind::Float => f32, f64);

/// Split a comma-joined wire string into its non-empty parts.
pub fn split_sequence(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(SEQUENCE_SEPARATOR).filter(|part| !part.is_empty())
}

/// Encode a sequence of primitives as one comma-joined string.
#[must_use]
pub fn encode_sequence<P: Primitive>(values: &[P]) -> String {
    values
        .iter()
        .map(Primitive::encode)
        .collect::<Vec<_>>()
        .join(",")
}

/// Decode a comma-joined string element-wise into `target`.
///
/// `target` is resized to the number of parts. On error it is left unchanged.
///
/// # Errors
///
/// Returns the first [`Error::MalformedValue`] met while decoding a part.
pub fn decode_sequence<P: Primitive>(raw: &str, target: &mut Vec<P>) -> Result<(), Error> {
    let decoded = split_sequence(raw)
        .map(P::decode)
        .collect::<Result<Vec<_>, _>>()?;
    *target = decoded;
    Ok(())
}

/// An addressable struct field the binder can read and write.
///
/// Implemented for every [`Primitive`], for `Option` and `Vec` of primitives,
/// and for a few structured types so they can be declared (and documented)
/// while binding them is reported as an error.
pub trait FieldValue {
    /// Declared shape of the field.
    fn shape(&self) -> Shape;

    /// Assign raw source strings to the field.
    ///
    /// Scalars use the first value; sequences split and decode all values.
    /// An empty slice leaves the field untouched.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedValue`] for bad literals, [`Error::UnsupportedType`]
    /// for non-primitive shapes.
    fn assign(&mut self, values: &[String]) -> Result<(), Error>;

    /// Encode the current value into wire strings.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedType`] for non-primitive shapes.
    fn to_wire(&self) -> Result<Vec<String>, Error>;
}

macro_rules! impl_scalar_field {
    ($($t:ty),+ $(,)?) => {$(
        impl FieldValue for $t {
            fn shape(&self) -> Shape {
                Shape::Primitive(<$t as Primitive>::KIND)
            }

            fn assign(&mut self, values: &[String]) -> Result<(), Error> {
                if let Some(first) = values.first() {
                    *self = <$t as Primitive>::decode(first)?;
                }
                Ok(())
            }

            fn to_wire(&self) -> Result<Vec<String>, Error> {
                Ok(vec![Primitive::encode(self)])
            }
        }
    )+};
}

impl_scalar_field!(
    bool, String, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64
);

impl<P: Primitive> FieldValue for Option<P> {
    fn shape(&self) -> Shape {
        Shape::Primitive(P::KIND)
    }

    fn assign(&mut self, values: &[String]) -> Result<(), Error> {
        if let Some(first) = values.first() {
            *self = Some(P::decode(first)?);
        }
        Ok(())
    }

    fn to_wire(&self) -> Result<Vec<String>, Error> {
        Ok(self.iter().map(Primitive::encode).collect())
    }
}

impl<P: Primitive> FieldValue for Vec<P> {
    fn shape(&self) -> Shape {
        Shape::Sequence(P::KIND)
    }

    fn assign(&mut self, values: &[String]) -> Result<(), Error> {
        if values.is_empty() {
            return Ok(());
        }
        decode_sequence(&values.join(","), self)
    }

    fn to_wire(&self) -> Result<Vec<String>, Error> {
        Ok(self.iter().map(Primitive::encode).collect())
    }
}

impl FieldValue for serde_json::Value {
    fn shape(&self) -> Shape {
        Shape::Aggregate
    }

    fn assign(&mut self, _values: &[String]) -> Result<(), Error> {
        Err(Error::UnsupportedType {
            shape: Shape::Aggregate,
        })
    }

    fn to_wire(&self) -> Result<Vec<String>, Error> {
        Err(Error::UnsupportedType {
            shape: Shape::Aggregate,
        })
    }
}

impl FieldValue for HashMap<String, String> {
    fn shape(&self) -> Shape {
        Shape::Aggregate
    }

    fn assign(&mut self, _values: &[String]) -> Result<(), Error> {
        Err(Error::UnsupportedType {
            shape: Shape::Aggregate,
        })
    }

    fn to_wire(&self) -> Result<Vec<String>, Error> {
        Err(Error::UnsupportedType {
            shape: Shape::Aggregate,
        })
    }
}
