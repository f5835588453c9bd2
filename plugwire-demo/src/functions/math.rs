//! Arithmetic functions

use serde_json::{Number, Value as JsonValue};

use plugwire_plugin::params::{require_f64, require_number};
use plugwire_plugin::{FunctionRegistry, HandlerError, HandlerResult, Params, PluginResult};

pub fn register(registry: &mut FunctionRegistry) -> PluginResult<()> {
    registry.add("add", add)?;
    registry.add("subtract", subtract)?;
    registry.add("multiply", multiply)?;
    registry.add("divide", divide)?;
    registry.add("power", power)?;
    registry.add("sqrt", sqrt)?;
    Ok(())
}

/// `a + b`
pub fn add(params: &Params) -> HandlerResult {
    binary(params, i64::checked_add, |a, b| a + b)
}

/// `a - b`
pub fn subtract(params: &Params) -> HandlerResult {
    binary(params, i64::checked_sub, |a, b| a - b)
}

/// `a * b`
pub fn multiply(params: &Params) -> HandlerResult {
    binary(params, i64::checked_mul, |a, b| a * b)
}

/// `a / b`, always a float
pub fn divide(params: &Params) -> HandlerResult {
    let a = require_f64(params, "a")?;
    let b = require_f64(params, "b")?;
    if b == 0.0 {
        return Err(HandlerError::failed("division by zero"));
    }
    finite(a / b)
}

/// `base ^ exponent`
pub fn power(params: &Params) -> HandlerResult {
    let base = require_f64(params, "base")?;
    let exponent = require_f64(params, "exponent")?;
    finite(base.powf(exponent))
}

/// Square root of `num`
pub fn sqrt(params: &Params) -> HandlerResult {
    let num = require_f64(params, "num")?;
    if num < 0.0 {
        return Err(HandlerError::failed("cannot take the square root of a negative number"));
    }
    finite(num.sqrt())
}

/// Integer operands stay integers unless the result overflows
fn binary(
    params: &Params,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> HandlerResult {
    let a = require_number(params, "a")?;
    let b = require_number(params, "b")?;

    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        if let Some(result) = int_op(x, y) {
            return Ok(JsonValue::from(result));
        }
    }

    finite(float_op(require_f64(params, "a")?, require_f64(params, "b")?))
}

fn finite(value: f64) -> HandlerResult {
    Number::from_f64(value)
        .map(JsonValue::Number)
        .ok_or_else(|| HandlerError::failed("result is not a finite number"))
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
    fn test_integer_arithmetic_stays_integral() {
        assert_eq!(add(&params(json!({"a": 2, "b": 3}))), Ok(json!(5)));
        assert_eq!(subtract(&params(json!({"a": 2, "b": 3}))), Ok(json!(-1)));
        assert_eq!(multiply(&params(json!({"a": 4, "b": 3}))), Ok(json!(12)));
        assert_eq!(
            serde_json::to_string(&add(&params(json!({"a": 2, "b": 3}))).unwrap()).unwrap(),
            "5"
        );
    }

    #[test]
    fn test_float_arithmetic() {
        assert_eq!(add(&params(json!({"a": 1.5, "b": 2}))), Ok(json!(3.5)));
        assert_eq!(divide(&params(json!({"a": 10, "b": 4}))), Ok(json!(2.5)));
        assert_eq!(power(&params(json!({"base": 2, "exponent": 10}))), Ok(json!(1024.0)));
        assert_eq!(sqrt(&params(json!({"num": 16}))), Ok(json!(4.0)));
    }

    #[test]
    fn test_overflow_falls_back_to_float() {
        let result = add(&params(json!({"a": i64::MAX, "b": 1}))).unwrap();
        assert!(result.is_f64());
    }

    #[test]
    fn test_domain_errors() {
        assert_eq!(
            divide(&params(json!({"a": 1, "b": 0}))),
            Err(HandlerError::failed("division by zero"))
        );
        assert!(sqrt(&params(json!({"num": -4}))).is_err());
        assert!(power(&params(json!({"base": 10, "exponent": 1000}))).is_err());
    }

    #[test]
    fn test_parameter_errors() {
        assert_eq!(
            add(&params(json!({"a": 1}))),
            Err(HandlerError::missing("b"))
        );
        assert_eq!(
            add(&params(json!({"a": "1", "b": 2}))),
            Err(HandlerError::invalid("a", "a number"))
        );
    }
}
