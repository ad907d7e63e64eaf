//! Deterministic JSON canonicalization of request bodies.
//!
//! Object keys are sorted at every nesting level, arrays keep their order and
//! scalars are emitted as-is. The output is what gets hashed into the
//! `bodyHash` field, so two bodies that are deep-equal always produce the same
//! string regardless of key insertion order.

use error_stack::{Report, ResultExt};
use serde::Serialize;
use serde_json::{Map, Number, Value};

use crate::error::SigningError;

/// Canonical form of an absent, null or empty-object body.
pub const EMPTY_BODY: &str = "{}";

/// Largest integer an IEEE-754 double represents exactly (2^53).
const MAX_EXACT_INTEGER: u64 = 9_007_199_254_740_992;

/// Returns the canonical JSON text for a request body.
///
/// `None`, `Some(Value::Null)` and an object with no keys all yield `"{}"`.
///
/// # Errors
///
/// Returns [`SigningError::Canonicalization`] if a string cannot be encoded.
pub fn canonicalize(body: Option<&Value>) -> Result<String, Report<SigningError>> {
    let value = match body {
        // Only these three map to `{}`. Other top-level scalars and `[]` are
        // serialized as-is, unlike a JavaScript `Object.keys(body).length`
        // check which would also map `[]`, `0`, `false` and `""` to `{}`.
        None | Some(Value::Null) => return Ok(EMPTY_BODY.to_string()),
        Some(Value::Object(map)) if map.is_empty() => return Ok(EMPTY_BODY.to_string()),
        Some(value) => value,
    };

    let mut out = String::new();
    write_value(value, &mut out)?;
    Ok(out)
}

/// Canonicalizes any serializable body by converting it to a JSON value first.
///
/// # Errors
///
/// Returns [`SigningError::Canonicalization`] if the value cannot be
/// represented as JSON (for example a map with non-string keys).
pub fn canonicalize_serializable<T: Serialize + ?Sized>(
    body: &T,
) -> Result<String, Report<SigningError>> {
    let value = serde_json::to_value(body).change_context(SigningError::Canonicalization {
        message: "Request body is not representable as JSON".into(),
    })?;
    canonicalize(Some(&value))
}

fn write_value(value: &Value, out: &mut String) -> Result<(), Report<SigningError>> {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&number_text(n)),
        Value::String(s) => write_string(s, out)?,
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(item, out)?;
            }
            out.push(']');
        }
        Value::Object(map) => write_object(map, out)?,
    }
    Ok(())
}

fn write_object(map: &Map<String, Value>, out: &mut String) -> Result<(), Report<SigningError>> {
    let mut entries: Vec<(&String, &Value)> = map.iter().collect();
    // UTF-16 code unit order, the order a JavaScript verifier sorts keys in.
    entries.sort_by(|(a, _), (b, _)| a.encode_utf16().cmp(b.encode_utf16()));

    out.push('{');
    for (i, (key, value)) in entries.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_string(key, out)?;
        out.push(':');
        write_value(value, out)?;
    }
    out.push('}');
    Ok(())
}

fn write_string(s: &str, out: &mut String) -> Result<(), Report<SigningError>> {
    let quoted = serde_json::to_string(s).change_context(SigningError::Canonicalization {
        message: "Failed to encode JSON string".into(),
    })?;
    out.push_str(&quoted);
    Ok(())
}

/// Renders a number the way ECMAScript `Number::toString` does, which is
/// what `JSON.stringify` emits on the verifying side: `1.0` becomes `1`,
/// `1e17` is written out in full and `0.000001` keeps decimal form.
fn number_text(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        if i.unsigned_abs() <= MAX_EXACT_INTEGER {
            return i.to_string();
        }
    } else if let Some(u) = n.as_u64() {
        if u <= MAX_EXACT_INTEGER {
            return u.to_string();
        }
    }

    match n.as_f64() {
        Some(f) => ryu_js::Buffer::new().format(f).to_string(),
        None => n.to_string(),
    }
}
