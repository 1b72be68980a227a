//! Conversion between JSON values and D-Bus values.
//!
//! Reads go D-Bus → JSON with no type hints. Writes and method calls go the
//! other way and need a target signature, either taken from the property's
//! current value or from the known MPRIS2 method signatures; values with no
//! hint fall back to [`guess_from_json`].

use std::str::FromStr;

use serde_json::{Map, Number, Value as Json};
use zbus::zvariant::{Array, Dict, ObjectPath, Signature, StructureBuilder, Value};

/// Convert a D-Bus value into its JSON rendering.
///
/// Integers and floats become numbers; strings, object paths and signatures
/// become strings; arrays stay arrays; dicts become objects (basic keys
/// stringified); structs become arrays; nested variants are unwrapped. File
/// descriptors have no JSON rendering and become null.
pub fn to_json(value: &Value<'_>) -> Json {
    match value {
        Value::U8(v) => Json::from(*v),
        Value::Bool(v) => Json::from(*v),
        Value::I16(v) => Json::from(*v),
        Value::U16(v) => Json::from(*v),
        Value::I32(v) => Json::from(*v),
        Value::U32(v) => Json::from(*v),
        Value::I64(v) => Json::from(*v),
        Value::U64(v) => Json::from(*v),
        Value::F64(v) => Number::from_f64(*v).map_or(Json::Null, Json::Number),
        Value::Str(v) => Json::from(v.as_str()),
        Value::Signature(v) => Json::from(v.to_string()),
        Value::ObjectPath(v) => Json::from(v.as_str()),
        Value::Value(v) => to_json(v),
        Value::Array(v) => Json::Array(v.inner().iter().map(to_json).collect()),
        Value::Dict(v) => {
            let mut map = Map::new();
            for (key, val) in v.iter() {
                map.insert(dict_key(key), to_json(val));
            }
            Json::Object(map)
        }
        Value::Structure(v) => Json::Array(v.fields().iter().map(to_json).collect()),
        Value::Fd(_) => Json::Null,
    }
}

/// JSON object keys must be strings; basic D-Bus keys are stringified.
fn dict_key(key: &Value<'_>) -> String {
    match key {
        Value::Str(s) => s.as_str().to_owned(),
        other => match to_json(other) {
            Json::String(s) => s,
            json => json.to_string(),
        },
    }
}

/// Coerce a JSON value into the D-Bus type `sig` calls for.
///
/// # Errors
/// Returns a description of the mismatch when the JSON value cannot
/// represent the signature.
pub fn from_json(json: &Json, sig: &Signature) -> Result<Value<'static>, String> {
    match sig {
        Signature::Unit | Signature::Fd => {
            Err(format!("signature '{sig}' cannot be supplied as JSON"))
        }
        Signature::Bool => json
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| expected("a boolean", json)),
        Signature::U8 => {
            let n = integer(json)?;
            u8::try_from(n).map(Value::U8).map_err(|_| out_of_range("byte", n))
        }
        Signature::I16 => {
            let n = integer(json)?;
            i16::try_from(n).map(Value::I16).map_err(|_| out_of_range("int16", n))
        }
        Signature::U16 => {
            let n = integer(json)?;
            u16::try_from(n).map(Value::U16).map_err(|_| out_of_range("uint16", n))
        }
        Signature::I32 => {
            let n = integer(json)?;
            i32::try_from(n).map(Value::I32).map_err(|_| out_of_range("int32", n))
        }
        Signature::U32 => {
            let n = integer(json)?;
            u32::try_from(n).map(Value::U32).map_err(|_| out_of_range("uint32", n))
        }
        Signature::I64 => integer(json).map(Value::I64),
        Signature::U64 => json
            .as_u64()
            .map(Value::U64)
            .ok_or_else(|| expected("an unsigned integer", json)),
        Signature::F64 => json
            .as_f64()
            .map(Value::F64)
            .ok_or_else(|| expected("a number", json)),
        Signature::Str => json
            .as_str()
            .map(|s| Value::from(s.to_owned()))
            .ok_or_else(|| expected("a string", json)),
        Signature::ObjectPath => {
            let s = json.as_str().ok_or_else(|| expected("an object path string", json))?;
            ObjectPath::try_from(s.to_owned())
                .map(Value::ObjectPath)
                .map_err(|e| format!("'{s}' is not a valid object path: {e}"))
        }
        Signature::Signature => {
            let s = json.as_str().ok_or_else(|| expected("a signature string", json))?;
            Signature::from_str(s)
                .map(Value::Signature)
                .map_err(|e| format!("'{s}' is not a valid signature: {e}"))
        }
        Signature::Variant => Ok(Value::Value(Box::new(guess_from_json(json)?))),
        Signature::Array(child) => {
            let items = json.as_array().ok_or_else(|| expected("an array", json))?;
            let mut array = Array::new(child.signature());
            for item in items {
                array
                    .append(from_json(item, child.signature())?)
                    .map_err(|e| e.to_string())?;
            }
            Ok(Value::Array(array))
        }
        Signature::Dict { key, value } => {
            let entries = json.as_object().ok_or_else(|| expected("an object", json))?;
            let mut dict = Dict::new(key.signature(), value.signature());
            for (k, v) in entries {
                dict.append(
                    from_json(&Json::from(k.clone()), key.signature())?,
                    from_json(v, value.signature())?,
                )
                .map_err(|e| e.to_string())?;
            }
            Ok(Value::Dict(dict))
        }
        Signature::Structure(fields) => {
            let items = json.as_array().ok_or_else(|| expected("an array", json))?;
            let arity = fields.iter().count();
            if items.len() != arity {
                return Err(format!(
                    "structure '{sig}' takes {arity} fields, got {}",
                    items.len()
                ));
            }
            let mut builder = StructureBuilder::new();
            for (item, field) in items.iter().zip(fields.iter()) {
                builder = builder.append_field(from_json(item, field)?);
            }
            builder
                .build()
                .map(Value::Structure)
                .map_err(|e| e.to_string())
        }
    }
}

/// Best-effort D-Bus rendering for a JSON value with no signature to guide
/// it: booleans map to `b`, integers to `x`, floats to `d`, strings to `s`,
/// arrays to `av`, objects to `a{sv}`. JSON null is unrepresentable.
///
/// # Errors
/// Returns a description of the failure for unrepresentable values.
pub fn guess_from_json(json: &Json) -> Result<Value<'static>, String> {
    match json {
        Json::Null => Err("null has no D-Bus representation".to_owned()),
        Json::Bool(b) => Ok(Value::Bool(*b)),
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::I64(i))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::U64(u))
            } else if let Some(f) = n.as_f64() {
                Ok(Value::F64(f))
            } else {
                Err(format!("number {n} has no D-Bus representation"))
            }
        }
        Json::String(s) => Ok(Value::from(s.clone())),
        Json::Array(items) => {
            let mut array = Array::new(&Signature::Variant);
            for item in items {
                array
                    .append(Value::Value(Box::new(guess_from_json(item)?)))
                    .map_err(|e| e.to_string())?;
            }
            Ok(Value::Array(array))
        }
        Json::Object(entries) => {
            let mut dict = Dict::new(&Signature::Str, &Signature::Variant);
            for (k, v) in entries {
                dict.append(
                    Value::from(k.clone()),
                    Value::Value(Box::new(guess_from_json(v)?)),
                )
                .map_err(|e| e.to_string())?;
            }
            Ok(Value::Dict(dict))
        }
    }
}

fn expected(what: &str, got: &Json) -> String {
    format!("expected {what}, got {got}")
}

fn out_of_range(target: &str, n: i64) -> String {
    format!("{n} does not fit in a D-Bus {target}")
}

fn integer(json: &Json) -> Result<i64, String> {
    json.as_i64().ok_or_else(|| expected("an integer", json))
}
