//! JSON envelope codec
//!
//! Wrapped trees travel as JSON with marker objects:
//!
//! | JSON                              | Value                          |
//! |-----------------------------------|--------------------------------|
//! | `{"$ref": X}`                     | `Wrapped(Ref, X)`              |
//! | `{"$reactive": X}`                | `Wrapped(Reactive, X)`         |
//! | `{"$proxy": X}`                   | `Wrapped(Proxy, X)`            |
//! | `{"$opaque": "Class", "data": X}` | `Opaque { class, data: X }`    |
//! | `{"$map": {...}}`                 | literal `Mapping`              |
//!
//! Any other object decodes to a mapping. The encoder escapes literal
//! mappings whose key set would read back as an envelope, so decoding an
//! encoded acyclic value reproduces it.

use crate::constants::{MARKER_MAP, MARKER_OPAQUE, OPAQUE_DATA_KEY};
use crate::error::{DewrapError, Result};
use crate::types::WrapperKind;
use crate::value::{Mapping, Opaque, Value, Wrapper};
use serde_json::{Map, Value as Json};

/// Decode envelope JSON into a [`Value`]
pub fn decode(json: Json) -> Result<Value> {
    Ok(match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(b),
        Json::Number(n) => Value::Number(n),
        Json::String(s) => Value::String(s),
        Json::Array(items) => Value::Sequence(
            items
                .into_iter()
                .map(decode)
                .collect::<Result<Vec<_>>>()?,
        ),
        Json::Object(map) => decode_object(map)?,
    })
}

fn decode_object(mut map: Map<String, Json>) -> Result<Value> {
    match envelope_shape(&map) {
        Some(Shape::Wrapper(kind)) => {
            let inner = map.remove(kind.marker()).unwrap_or(Json::Null);
            Ok(Value::Wrapped(Wrapper::new(kind, decode(inner)?)))
        }
        Some(Shape::Opaque) => {
            let class = match map.remove(MARKER_OPAQUE) {
                Some(Json::String(class)) => class,
                other => {
                    return Err(DewrapError::InvalidEnvelope {
                        reason: format!(
                            "'{}' must name a class as a string, found {}",
                            MARKER_OPAQUE,
                            other.as_ref().map_or("nothing", json_type_name)
                        ),
                    })
                }
            };
            let data = map.remove(OPAQUE_DATA_KEY).unwrap_or(Json::Null);
            Ok(Value::Opaque(Opaque::new(class, decode(data)?)))
        }
        Some(Shape::Escaped) => match map.remove(MARKER_MAP) {
            Some(Json::Object(inner)) => decode_entries(inner),
            other => Err(DewrapError::InvalidEnvelope {
                reason: format!(
                    "'{}' must hold an object, found {}",
                    MARKER_MAP,
                    other.as_ref().map_or("nothing", json_type_name)
                ),
            }),
        },
        None => decode_entries(map),
    }
}

fn decode_entries(map: Map<String, Json>) -> Result<Value> {
    let mut out = Mapping::new();
    for (key, value) in map {
        out.insert(key, decode(value)?);
    }
    Ok(Value::Mapping(out))
}

/// Encode a [`Value`] as envelope JSON
pub fn encode(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Number(n) => Json::Number(n.clone()),
        Value::String(s) => Json::String(s.clone()),
        Value::Sequence(items) => Json::Array(items.iter().map(encode).collect()),
        Value::Mapping(map) => encode_mapping(map),
        Value::Wrapped(wrapper) => {
            let mut out = Map::new();
            out.insert(wrapper.kind().marker().to_string(), wrapper.with(encode));
            Json::Object(out)
        }
        Value::Opaque(opaque) => encode_opaque(opaque),
    }
}

/// Encode a plain [`Value`] as ordinary JSON
///
/// Fails with [`DewrapError::NotPlain`] when a wrapper is present. Opaque
/// instances keep their envelope form.
pub fn to_plain_json(value: &Value) -> Result<Json> {
    if let Some(path) = value.find_wrapper() {
        return Err(DewrapError::NotPlain { path });
    }
    Ok(encode(value))
}

/// Encode a plain mapping as a JSON object
pub fn mapping_to_plain_json(map: &Mapping) -> Result<Map<String, Json>> {
    let mut out = Map::new();
    for (key, value) in map {
        out.insert(key.clone(), to_plain_json(value)?);
    }
    Ok(out)
}

fn encode_mapping(map: &Mapping) -> Json {
    let mut out = Map::new();
    for (key, value) in map {
        out.insert(key.clone(), encode(value));
    }
    if envelope_shape(&out).is_some() {
        let mut wrapped = Map::new();
        wrapped.insert(MARKER_MAP.to_string(), Json::Object(out));
        return Json::Object(wrapped);
    }
    Json::Object(out)
}

fn encode_opaque(opaque: &Opaque) -> Json {
    let mut out = Map::new();
    out.insert(
        MARKER_OPAQUE.to_string(),
        Json::String(opaque.class().to_string()),
    );
    out.insert(OPAQUE_DATA_KEY.to_string(), encode(opaque.data()));
    Json::Object(out)
}

enum Shape {
    Wrapper(WrapperKind),
    Opaque,
    Escaped,
}

fn envelope_shape(map: &Map<String, Json>) -> Option<Shape> {
    match map.len() {
        1 => {
            let key = map.keys().next()?;
            if let Some(kind) = WrapperKind::from_marker(key) {
                Some(Shape::Wrapper(kind))
            } else if key == MARKER_MAP {
                Some(Shape::Escaped)
            } else if key == MARKER_OPAQUE {
                Some(Shape::Opaque)
            } else {
                None
            }
        }
        2 if map.contains_key(MARKER_OPAQUE) && map.contains_key(OPAQUE_DATA_KEY) => {
            Some(Shape::Opaque)
        }
        _ => None,
    }
}

/// Human-readable type name for a JSON value
pub fn json_type_name(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}
