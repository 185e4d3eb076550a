//! OpenAPI 3.1 document model.
//!
//! The model itself is `oas3`; this module adds the constructors and the
//! schema conversion the generator needs.

use std::collections::BTreeMap;

pub use oas3::spec::{
    Components, Header, Info, MediaType, ObjectOrReference, ObjectSchema, Operation, Parameter,
    ParameterIn, PathItem, RequestBody, Response, SchemaType, SchemaTypeSet,
};
use serde_json::{Map, Value};

use crate::Error;

/// A generated OpenAPI 3.1 document.
pub type OpenApiDocument = oas3::OpenApiV3Spec;

pub const OPENAPI_VERSION: &str = "3.1.0";

/// Document with `info` set and no paths yet.
pub fn empty_document(info: Info) -> OpenApiDocument {
    OpenApiDocument {
        openapi: OPENAPI_VERSION.to_string(),
        info,
        servers: Vec::new(),
        paths: Some(BTreeMap::new()),
        components: None,
        security: Vec::new(),
        tags: Vec::new(),
        webhooks: BTreeMap::new(),
        external_docs: None,
        extensions: BTreeMap::new(),
    }
}

/// `info` object; empty strings are left out.
pub fn info(title: &str, summary: &str, description: &str, version: &str) -> Info {
    Info {
        title: title.to_string(),
        summary: non_empty(summary),
        description: non_empty(description),
        terms_of_service: None,
        version: version.to_string(),
        contact: None,
        license: None,
        extensions: BTreeMap::new(),
    }
}

/// Response carrying only a description.
pub fn response(description: &str) -> Response {
    Response {
        description: Some(description.to_string()),
        ..Default::default()
    }
}

/// Operation slot of `item` for an HTTP method, `None` for methods a path
/// item has no field for.
pub fn operation_slot<'a>(item: &'a mut PathItem, method: &str) -> Option<&'a mut Option<Operation>> {
    match method {
        "GET" => Some(&mut item.get),
        "PUT" => Some(&mut item.put),
        "POST" => Some(&mut item.post),
        "DELETE" => Some(&mut item.delete),
        "OPTIONS" => Some(&mut item.options),
        "HEAD" => Some(&mut item.head),
        "PATCH" => Some(&mut item.patch),
        "TRACE" => Some(&mut item.trace),
        _ => None,
    }
}

/// Inline schema of a single JSON type.
pub fn typed_schema(ty: SchemaType) -> ObjectSchema {
    ObjectSchema {
        schema_type: Some(SchemaTypeSet::Single(ty)),
        ..Default::default()
    }
}

/// Convert a reflected JSON schema into the document model.
///
/// # Errors
///
/// [`Error::Document`] when the value is not a schema object or reference.
pub fn schema(value: Value) -> Result<ObjectOrReference<ObjectSchema>, Error> {
    serde_json::from_value(objectify(value)).map_err(Error::document)
}

/// Render as compact JSON.
///
/// # Errors
///
/// [`Error::Document`] if serialization fails.
pub fn to_json(document: &OpenApiDocument) -> Result<Vec<u8>, Error> {
    serde_json::to_vec(document).map_err(Error::document)
}

/// # Errors
///
/// [`Error::Document`] if serialization fails.
pub fn to_json_pretty(document: &OpenApiDocument) -> Result<String, Error> {
    serde_json::to_string_pretty(document).map_err(Error::document)
}

/// # Errors
///
/// [`Error::Document`] if serialization fails.
pub fn to_yaml(document: &OpenApiDocument) -> Result<String, Error> {
    serde_yaml::to_string(document).map_err(Error::document)
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

// Boolean subschemas become `{}` where the model only takes schema objects.
fn objectify(value: Value) -> Value {
    let map = match value {
        Value::Bool(_) => return Value::Object(Map::new()),
        Value::Object(map) => map,
        other => return other,
    };
    map.into_iter()
        .map(|(key, value)| {
            let value = match (key.as_str(), value) {
                ("properties" | "$defs" | "patternProperties", Value::Object(children)) => {
                    Value::Object(children.into_iter().map(|(k, v)| (k, objectify(v))).collect())
                }
                ("allOf" | "anyOf" | "oneOf" | "prefixItems", Value::Array(items)) => {
                    Value::Array(items.into_iter().map(objectify).collect())
                }
                ("items" | "additionalProperties", Value::Object(child)) => {
                    objectify(Value::Object(child))
                }
                (_, value) => value,
            };
            (key, value)
        })
        .collect::<Map<String, Value>>()
        .into()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_schema_keeps_refs_and_inline_types() {
        let reference = schema(json!({"$ref": "#/components/schemas/Widget"})).unwrap();
        assert!(matches!(
            reference,
            ObjectOrReference::Ref { ref ref_path, .. } if ref_path == "#/components/schemas/Widget"
        ));

        let list = schema(json!({"type": "array", "items": {"type": "integer", "format": "int64"}}))
            .unwrap();
        assert_eq!(
            serde_json::to_value(list).unwrap(),
            json!({"type": "array", "items": {"type": "integer", "format": "int64"}})
        );
    }

    #[test]
    fn test_boolean_subschemas_are_accepted() {
        let object = schema(json!({
            "type": "object",
            "properties": {"extra": true, "name": {"type": "string"}},
            "additionalProperties": false
        }))
        .unwrap();
        assert_eq!(
            serde_json::to_value(object).unwrap(),
            json!({
                "type": "object",
                "properties": {"extra": {}, "name": {"type": "string"}},
                "additionalProperties": false
            })
        );
    }

    #[test]
    fn test_operation_slots() {
        let mut item = PathItem::default();
        for method in ["GET", "PUT", "POST", "DELETE", "OPTIONS", "HEAD", "PATCH", "TRACE"] {
            assert!(operation_slot(&mut item, method).is_some(), "{method}");
        }
        assert!(operation_slot(&mut item, "CONNECT").is_none());
        assert!(operation_slot(&mut item, "PURGE").is_none());
    }

    #[test]
    fn test_info_skips_empty_strings() {
        let value = serde_json::to_value(info("Widgets", "", "", "1.0.0")).unwrap();
        assert_eq!(value, json!({"title": "Widgets", "version": "1.0.0"}));
    }
}
