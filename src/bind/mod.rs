//! # Field Binder
//!
//! Populates the scalar fields of a request value from the non-body parts of
//! an HTTP request (path parameters, query string, form data and headers) and
//! writes the scalar fields of a response value back into response headers.
//!
//! ## Declaring bindings
//!
//! Fields are tagged with `#[bind(...)]` and the `Bind` derive generates the
//! descriptor table ([`Bindable::bindings`]) together with addressable
//! accessors for every tagged field:
//!
//! ```rust,ignore
//! use typecart::Bind;
//!
//! #[derive(Default, serde::Deserialize, schemars::JsonSchema, Bind)]
//! struct ListItems {
//!     #[bind(path = "shop")]
//!     shop: String,
//!     #[bind(query = "ids", header = "X-Ids")]
//!     ids: Vec<u64>,
//!     #[bind(meta = "X-Tenant")]
//!     tenant: Option<String>,
//! }
//! ```
//!
//! ## Precedence
//!
//! For every field the providers are consulted in [`Source::PRIORITY`] order
//! (path, query, form, header, meta). The first provider returning a
//! non-empty value list wins; values from different providers are never
//! merged. Untagged fields are left as they are, usually filled by the body
//! converter.
//!
//! Scalar fields take the first value. Sequence fields split every value on
//! `,` and decode the parts in order.

mod destination;
mod source;


use std::fmt;

use schemars::{JsonSchema, Schema, SchemaGenerator};

pub use crate::primitive::FieldValue;
use crate::primitive::Shape;
use crate::Error;
pub use destination::{Destination, HeaderDestination};
pub use source::{HeaderValues, PathValues, SourceProvider, UrlValues};

/// Request location a field can be bound from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Source {
    /// `{name}` segment of the route pattern
    Path,
    /// URL query string
    Query,
    /// `application/x-www-form-urlencoded` request body
    Form,
    /// Request header (response header when encoding)
    Header,
    /// Request header read under a caller-chosen key
    Meta,
}

impl Source {
    /// Fixed lookup order used by [`decode_fields`].
    pub const PRIORITY: [Source; 5] = [
        Source::Path,
        Source::Query,
        Source::Form,
        Source::Header,
        Source::Meta,
    ];

    /// Attribute name of the source inside `#[bind(...)]`.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Source::Path => "path",
            Source::Query => "query",
            Source::Form => "form",
            Source::Header => "header",
            Source::Meta => "meta",
        }
    }

    /// Inverse of [`Source::tag`].
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::PRIORITY.into_iter().find(|s| s.tag() == tag)
    }

    fn rank(self) -> usize {
        Self::PRIORITY
            .iter()
            .position(|s| *s == self)
            .unwrap_or(Self::PRIORITY.len())
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One `#[bind(source = "key")]` declaration.
#[derive(Debug, Clone, Copy)]
pub struct Binding {
    /// Rust field name
    pub field: &'static str,
    /// Where the value comes from
    pub source: Source,
    /// Source-specific key (header name, query key, path parameter)
    pub key: &'static str,
    /// Reflects the field's schema for documentation
    pub schema: fn(&mut SchemaGenerator) -> Schema,
}

/// Schema reflector stored in generated [`Binding`] tables.
pub fn field_schema<T: JsonSchema>(generator: &mut SchemaGenerator) -> Schema {
    generator.subschema_for::<T>()
}

/// Capability implemented by every type used as handler input or output.
///
/// Derive it with `#[derive(Bind)]` for structs. Scalars, sequences and
/// opaque values implement it with no bindings, so the typed handler skips
/// field binding for them.
pub trait Bindable {
    /// Whether the value is struct-like and takes part in field binding.
    const AGGREGATE: bool = false;

    /// Declared bindings in field declaration order.
    fn bindings() -> &'static [Binding] {
        &[]
    }

    /// Read access to a tagged field.
    fn field(&self, _name: &str) -> Option<&dyn FieldValue> {
        None
    }

    /// Write access to a tagged field.
    fn field_mut(&mut self, _name: &str) -> Option<&mut dyn FieldValue> {
        None
    }
}

macro_rules! unbound {
    ($($t:ty),+ $(,)?) => {$(
        impl Bindable for $t {}
    )+};
}

unbound!(
    (),
    bool,
    String,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    f32,
    f64,
    serde_json::Value,
);

impl<T> Bindable for Vec<T> {}
impl<T> Bindable for Option<T> {}
impl<K, V> Bindable for std::collections::HashMap<K, V> {}
impl<K, V> Bindable for std::collections::BTreeMap<K, V> {}

/// Whether `T` declares any binding for `source`.
#[must_use]
pub fn binds<T: Bindable>(source: Source) -> bool {
    T::bindings().iter().any(|b| b.source == source)
}

fn field_names(bindings: &[Binding]) -> Vec<&'static str> {
    let mut names: Vec<&'static str> = Vec::with_capacity(bindings.len());
    for binding in bindings {
        if !names.contains(&binding.field) {
            names.push(binding.field);
        }
    }
    names
}

/// Populate the tagged fields of `target` from `providers`.
///
/// Returns the number of fields that received a value.
///
/// # Errors
///
/// - [`Error::UnsupportedFieldType`] when a tagged field is not a primitive
///   or a sequence of primitives
/// - [`Error::MalformedValue`] when a raw value does not parse
pub fn decode_fields<T: Bindable>(
    target: &mut T,
    providers: &[&dyn SourceProvider],
) -> Result<usize, Error> {
    let mut ordered: Vec<&dyn SourceProvider> = providers.to_vec();
    ordered.sort_by_key(|p| p.source().rank());

    let bindings = T::bindings();
    let mut bound = 0;
    for field in field_names(bindings) {
        let slot = target.field_mut(field).ok_or(Error::UnsupportedFieldType {
            field,
            shape: Shape::Opaque,
        })?;
        let shape = slot.shape();
        if !shape.is_bindable() {
            return Err(Error::UnsupportedFieldType { field, shape });
        }

        for provider in &ordered {
            let source = provider.source();
            let Some(binding) = bindings
                .iter()
                .find(|b| b.field == field && b.source == source)
            else {
                continue;
            };
            match provider.lookup(binding) {
                Some(values) if !values.is_empty() => {
                    tracing::trace!(field, %source, key = binding.key, "bound field");
                    slot.assign(&values)?;
                    bound += 1;
                    break;
                }
                _ => {}
            }
        }
    }
    Ok(bound)
}

/// Write the tagged fields of `value` into every destination accepting their source.
///
/// Fields encoding to no value (an unset `Option`) are skipped.
///
/// # Errors
///
/// - [`Error::UnsupportedFieldType`] for non-primitive tagged fields
/// - whatever the destination reports, e.g. [`Error::InvalidHeader`]
pub fn encode_fields<T: Bindable>(
    value: &T,
    destinations: &mut [&mut dyn Destination],
) -> Result<usize, Error> {
    let mut written = 0;
    for binding in T::bindings() {
        if !destinations.iter().any(|d| d.accepts(binding.source)) {
            continue;
        }
        let slot = value.field(binding.field).ok_or(Error::UnsupportedFieldType {
            field: binding.field,
            shape: Shape::Opaque,
        })?;
        let shape = slot.shape();
        if !shape.is_bindable() {
            return Err(Error::UnsupportedFieldType {
                field: binding.field,
                shape,
            });
        }
        let values = slot.to_wire()?;
        if values.is_empty() {
            continue;
        }
        for dest in destinations.iter_mut() {
            if dest.accepts(binding.source) {
                dest.write(binding, values.clone())?;
                written += 1;
            }
        }
    }
    Ok(written)
}
