//! Typed access to CALL parameters for handler implementations

use serde_json::{Number, Value as JsonValue};

use plugwire_ipc::Params;

use crate::registry::HandlerError;

/// Fetch a required parameter
pub fn require<'a>(params: &'a Params, name: &str) -> Result<&'a JsonValue, HandlerError> {
    params.get(name).ok_or_else(|| HandlerError::missing(name))
}

/// Fetch a required numeric parameter, keeping its integer/float nature
pub fn require_number<'a>(params: &'a Params, name: &str) -> Result<&'a Number, HandlerError> {
    match require(params, name)? {
        JsonValue::Number(n) => Ok(n),
        _ => Err(HandlerError::invalid(name, "a number")),
    }
}

/// Fetch a required numeric parameter as `f64`
pub fn require_f64(params: &Params, name: &str) -> Result<f64, HandlerError> {
    require_number(params, name)?
        .as_f64()
        .ok_or_else(|| HandlerError::invalid(name, "a number"))
}

/// Fetch a required non-negative whole number.
///
/// Hosts that only speak floating point send `10.0` for `10`; that is
/// accepted, `10.5` is not.
pub fn require_u64(params: &Params, name: &str) -> Result<u64, HandlerError> {
    let number = require_number(params, name)?;
    if let Some(n) = number.as_u64() {
        return Ok(n);
    }
    match number.as_f64() {
        Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => Ok(f as u64),
        _ => Err(HandlerError::invalid(name, "a non-negative integer")),
    }
}

/// Fetch a required string parameter
pub fn require_str<'a>(params: &'a Params, name: &str) -> Result<&'a str, HandlerError> {
    require(params, name)?
        .as_str()
        .ok_or_else(|| HandlerError::invalid(name, "a string"))
}

/// Fetch a required array parameter
pub fn require_array<'a>(params: &'a Params, name: &str) -> Result<&'a [JsonValue], HandlerError> {
    require(params, name)?
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| HandlerError::invalid(name, "an array"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: JsonValue) -> Params {
        match value {
            JsonValue::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn test_missing_and_mistyped() {
        let p = params(json!({"a": "two"}));
        assert_eq!(require_f64(&p, "b"), Err(HandlerError::missing("b")));
        assert_eq!(
            require_f64(&p, "a"),
            Err(HandlerError::invalid("a", "a number"))
        );
        assert_eq!(
            require_array(&p, "a"),
            Err(HandlerError::invalid("a", "an array"))
        );
    }

    #[test]
    fn test_number_kinds() {
        let p = params(json!({"i": 7, "f": 2.5, "whole": 10.0, "neg": -3}));
        assert!(require_number(&p, "i").unwrap().is_i64());
        assert!(require_number(&p, "f").unwrap().is_f64());
        assert_eq!(require_f64(&p, "i"), Ok(7.0));
        assert_eq!(require_u64(&p, "whole"), Ok(10));
        assert!(require_u64(&p, "f").is_err());
        assert!(require_u64(&p, "neg").is_err());
    }

    #[test]
    fn test_strings() {
        let p = params(json!({"str": "hello", "arr": ["a", 1]}));
        assert_eq!(require_str(&p, "str"), Ok("hello"));
        assert_eq!(require_array(&p, "arr").unwrap().len(), 2);
    }
}
