//! String transforms

use serde_json::{json, Value as JsonValue};

use plugwire_plugin::params::{require_array, require_str};
use plugwire_plugin::{FunctionRegistry, HandlerResult, Params, PluginResult};

pub fn register(registry: &mut FunctionRegistry) -> PluginResult<()> {
    registry.add("toUpper", to_upper)?;
    registry.add("toLower", to_lower)?;
    registry.add("reverse", reverse)?;
    registry.add("trim", trim)?;
    registry.add("replace", replace)?;
    registry.add("split", split)?;
    registry.add("join", join)?;
    registry.add("contains", contains)?;
    registry.add("countWords", count_words)?;
    registry.add("isPalindrome", is_palindrome)?;
    Ok(())
}

pub fn to_upper(params: &Params) -> HandlerResult {
    Ok(json!(require_str(params, "str")?.to_uppercase()))
}

pub fn to_lower(params: &Params) -> HandlerResult {
    Ok(json!(require_str(params, "str")?.to_lowercase()))
}

/// Reverses by character, not by byte
pub fn reverse(params: &Params) -> HandlerResult {
    Ok(json!(require_str(params, "str")?.chars().rev().collect::<String>()))
}

pub fn trim(params: &Params) -> HandlerResult {
    Ok(json!(require_str(params, "str")?.trim()))
}

/// Replace every occurrence of `old` with `new`
pub fn replace(params: &Params) -> HandlerResult {
    let text = require_str(params, "str")?;
    let old = require_str(params, "old")?;
    let new = require_str(params, "new")?;
    Ok(json!(text.replace(old, new)))
}

/// Split on `sep`; an empty separator splits into characters
pub fn split(params: &Params) -> HandlerResult {
    let text = require_str(params, "str")?;
    let sep = require_str(params, "sep")?;
    let parts: Vec<String> = if sep.is_empty() {
        text.chars().map(String::from).collect()
    } else {
        text.split(sep).map(str::to_string).collect()
    };
    Ok(json!(parts))
}

/// Join `arr` with `sep`; non-string items are joined as their JSON text
pub fn join(params: &Params) -> HandlerResult {
    let items = require_array(params, "arr")?;
    let sep = require_str(params, "sep")?;
    let parts: Vec<String> = items
        .iter()
        .map(|item| match item {
            JsonValue::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect();
    Ok(json!(parts.join(sep)))
}

pub fn contains(params: &Params) -> HandlerResult {
    let text = require_str(params, "str")?;
    let substr = require_str(params, "substr")?;
    Ok(json!(text.contains(substr)))
}

pub fn count_words(params: &Params) -> HandlerResult {
    Ok(json!(require_str(params, "str")?.split_whitespace().count()))
}

/// Palindrome check over letters and digits only, case-insensitive
pub fn is_palindrome(params: &Params) -> HandlerResult {
    let cleaned: Vec<char> = require_str(params, "str")?
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect();
    Ok(json!(cleaned.iter().eq(cleaned.iter().rev())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use plugwire_plugin::HandlerError;

    fn params(value: JsonValue) -> Params {
        match value {
            JsonValue::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn test_case_and_trim() {
        assert_eq!(to_upper(&params(json!({"str": "plugWire"}))), Ok(json!("PLUGWIRE")));
        assert_eq!(to_lower(&params(json!({"str": "plugWire"}))), Ok(json!("plugwire")));
        assert_eq!(trim(&params(json!({"str": "  padded \n"}))), Ok(json!("padded")));
    }

    #[test]
    fn test_reverse_is_char_aware() {
        assert_eq!(reverse(&params(json!({"str": "héllo"}))), Ok(json!("olléh")));
    }

    #[test]
    fn test_replace_split_join() {
        assert_eq!(
            replace(&params(json!({"str": "a-b-c", "old": "-", "new": "+"}))),
            Ok(json!("a+b+c"))
        );
        assert_eq!(
            split(&params(json!({"str": "a,b,,c", "sep": ","}))),
            Ok(json!(["a", "b", "", "c"]))
        );
        assert_eq!(
            split(&params(json!({"str": "abc", "sep": ""}))),
            Ok(json!(["a", "b", "c"]))
        );
        assert_eq!(
            join(&params(json!({"arr": ["x", 1, true], "sep": "/"}))),
            Ok(json!("x/1/true"))
        );
    }

    #[test]
    fn test_predicates_and_counts() {
        assert_eq!(
            contains(&params(json!({"str": "haystack", "substr": "st"}))),
            Ok(json!(true))
        );
        assert_eq!(
            count_words(&params(json!({"str": "  one two\tthree "}))),
            Ok(json!(3))
        );
        assert_eq!(
            is_palindrome(&params(json!({"str": "A man, a plan, a canal: Panama"}))),
            Ok(json!(true))
        );
        assert_eq!(is_palindrome(&params(json!({"str": "plugwire"}))), Ok(json!(false)));
    }

    #[test]
    fn test_missing_string() {
        assert_eq!(to_upper(&Params::new()), Err(HandlerError::missing("str")));
        assert_eq!(
            to_upper(&params(json!({"str": 5}))),
            Err(HandlerError::invalid("str", "a string"))
        );
    }
}
