//! Number sequences

use serde_json::json;

use plugwire_plugin::params::require_u64;
use plugwire_plugin::{FunctionRegistry, HandlerError, HandlerResult, Params, PluginResult};

/// Terms returned when `n` is omitted
const DEFAULT_TERMS: u64 = 10;

/// Longest prefix whose terms all fit in a `u64`
pub const MAX_FIBONACCI_TERMS: u64 = 93;

pub fn register(registry: &mut FunctionRegistry) -> PluginResult<()> {
    registry.add("fibonacci", fibonacci)?;
    Ok(())
}

/// First `n` Fibonacci numbers, starting `0, 1, 1, 2, ...`
pub fn fibonacci(params: &Params) -> HandlerResult {
    let n = match params.get("n") {
        Some(_) => require_u64(params, "n")?,
        None => DEFAULT_TERMS,
    };
    if n > MAX_FIBONACCI_TERMS {
        return Err(HandlerError::failed(format!(
            "n must be at most {}, got {}",
            MAX_FIBONACCI_TERMS, n
        )));
    }

    let mut terms = Vec::with_capacity(n as usize);
    let (mut current, mut next) = (0u64, 1u64);
    for _ in 0..n {
        terms.push(current);
        (current, next) = (next, current.saturating_add(next));
    }
    Ok(json!(terms))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value as JsonValue;

    fn with_n(n: JsonValue) -> Params {
        let mut params = Params::new();
        params.insert("n".to_string(), n);
        params
    }

    #[test]
    fn test_first_terms() {
        assert_eq!(fibonacci(&with_n(json!(0))), Ok(json!([])));
        assert_eq!(fibonacci(&with_n(json!(1))), Ok(json!([0])));
        assert_eq!(
            fibonacci(&with_n(json!(7))),
            Ok(json!([0, 1, 1, 2, 3, 5, 8]))
        );
    }

    #[test]
    fn test_default_and_float_count() {
        let default = fibonacci(&Params::new()).unwrap();
        assert_eq!(default.as_array().unwrap().len(), 10);
        assert_eq!(fibonacci(&with_n(json!(10.0))), Ok(default));
    }

    #[test]
    fn test_upper_bound() {
        let terms = fibonacci(&with_n(json!(93))).unwrap();
        assert_eq!(terms[92], json!(7540113804746346429u64));
        assert!(fibonacci(&with_n(json!(94))).is_err());
        assert!(fibonacci(&with_n(json!(-1))).is_err());
    }
}
