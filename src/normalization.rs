use serde_json::{Map, Value};

use crate::error::NormalizeError;

const COUNT_KEY: &str = "count";

/// Canonicalizes a provider response into a uniform value tree.
///
/// The feed encodes ordered collections as objects carrying a `count` marker
/// plus `"0".."count-1"` keys, each wrapping its payload under a discriminator
/// key (`"player"`, `"transaction"`, ...). Record fields on the other hand come
/// as arrays mixing nested arrays and objects. Three shapes are handled:
///
/// 1. object with `count`: becomes a sequence of the wrapped payloads
/// 2. sequence: becomes a single mapping, later keys overwriting earlier ones
/// 3. anything else: returned as is
///
/// The input is never mutated. A declared `count` is trusted, so an absent
/// index is a fault rather than a shorter sequence.
pub fn normalize(value: &Value) -> Result<Value, NormalizeError> {
    match value {
        Value::Object(map) => match map.get(COUNT_KEY) {
            Some(count) => unwrap_counted(map, count),
            None => Ok(value.clone()),
        },
        Value::Array(items) => merge_sequence(items),
        _ => Ok(value.clone()),
    }
}

fn unwrap_counted(map: &Map<String, Value>, count: &Value) -> Result<Value, NormalizeError> {
    let count = parse_count(count)?;
    let mut out = Vec::with_capacity(count);

    for i in 0..count {
        let element = map
            .get(&i.to_string())
            .ok_or(NormalizeError::MissingIndex(i))?;
        let wrapper = element
            .as_object()
            .ok_or_else(|| NormalizeError::UnexpectedShape {
                at: format!("index {}", i),
                expected: "object",
            })?;

        // Discriminator keys only name the payload type. An element with
        // several of them contributes one entry per key.
        for payload in wrapper.values() {
            out.push(normalize(payload)?);
        }
    }

    Ok(Value::Array(out))
}

fn parse_count(count: &Value) -> Result<usize, NormalizeError> {
    match count {
        Value::Number(n) => n
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| NormalizeError::InvalidCount(n.to_string())),
        Value::String(s) => s
            .trim()
            .parse::<usize>()
            .map_err(|_| NormalizeError::InvalidCount(s.clone())),
        other => Err(NormalizeError::InvalidCount(other.to_string())),
    }
}

fn merge_sequence(items: &[Value]) -> Result<Value, NormalizeError> {
    let mut merged = Map::new();

    // Only objects carry fields; scalars and the empty arrays the feed pads
    // records with contribute nothing.
    for element in items {
        match element {
            Value::Array(sub_elements) => {
                for sub_element in sub_elements {
                    if let Value::Object(fields) = sub_element {
                        merge_into(&mut merged, fields)?;
                    }
                }
            }
            Value::Object(fields) => merge_into(&mut merged, fields)?,
            _ => {}
        }
    }

    Ok(Value::Object(merged))
}

fn merge_into(merged: &mut Map<String, Value>, fields: &Map<String, Value>) -> Result<(), NormalizeError> {
    for (key, value) in fields {
        merged.insert(key.clone(), normalize(value)?);
    }
    Ok(())
}

/// Looks up `key` in a canonical mapping.
pub fn field<'v>(value: &'v Value, key: &str) -> Result<&'v Value, NormalizeError> {
    value
        .as_object()
        .ok_or_else(|| NormalizeError::UnexpectedShape {
            at: format!("key `{}`", key),
            expected: "mapping",
        })?
        .get(key)
        .ok_or_else(|| NormalizeError::MissingKey(key.to_string()))
}

/// Looks up position `index` in a canonical sequence.
pub fn element(value: &Value, index: usize) -> Result<&Value, NormalizeError> {
    value
        .as_array()
        .ok_or_else(|| NormalizeError::UnexpectedShape {
            at: format!("index {}", index),
            expected: "sequence",
        })?
        .get(index)
        .ok_or(NormalizeError::MissingIndex(index))
}

/// Reads a string field, accepting numbers where the feed is loose about it.
pub fn str_field(value: &Value, key: &str) -> Result<String, NormalizeError> {
    match field(value, key)? {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(NormalizeError::InvalidField {
            field: key.to_string(),
            reason: format!("expected string, got {}", other),
        }),
    }
}
