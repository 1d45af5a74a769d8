use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use super::errors::EventError;

// ============================================================================
// Identifier Derivation
// ============================================================================
//
// identifier = sha256(len(type) | type | keys)
// keys       = count | (len(json) | json)*
//
// Each key value is canonicalized first: object keys sorted at every
// depth, integral floats folded into integers. Segments are
// length-prefixed, so ("ab", "c") and ("a", "bc") never share an encoding.
//
// ============================================================================

/// Derive the content-based identifier of a Fresh event
pub fn derive_identifier(event_type: &str, key_values: &[Value]) -> Result<String, EventError> {
    let mut hasher = Sha256::new();

    hasher.update((event_type.len() as u64).to_be_bytes());
    hasher.update(event_type.as_bytes());
    hasher.update(canonical_key_encoding(key_values)?);

    Ok(format!("{:x}", hasher.finalize()))
}

/// Length-prefixed canonical bytes of an ordered list of key values
pub fn canonical_key_encoding(key_values: &[Value]) -> Result<Vec<u8>, EventError> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&(key_values.len() as u64).to_be_bytes());

    for value in key_values {
        let encoded = serde_json::to_vec(&canonicalize(value))?;
        buf.extend_from_slice(&(encoded.len() as u64).to_be_bytes());
        buf.extend_from_slice(&encoded);
    }

    Ok(buf)
}

/// Rebuild `value` with sorted object keys, independent of map ordering
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));

            let mut sorted = Map::new();
            for (key, inner) in entries {
                sorted.insert(key.clone(), canonicalize(inner));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        Value::Number(number) => match number.as_f64() {
            Some(f) if number.is_f64() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                Value::from(f as i64)
            }
            _ => value.clone(),
        },
        _ => value.clone(),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
