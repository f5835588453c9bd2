//! Function sets the demo plugin can expose

pub mod math;
pub mod sequences;
pub mod strings;

use clap::ValueEnum;
use std::fmt;

use plugwire_plugin::{FunctionRegistry, PluginResult};

/// A named group of functions, selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FunctionSet {
    /// add, subtract, multiply, divide, power, sqrt
    Math,
    /// toUpper, toLower, reverse, trim, replace, split, join, contains, countWords, isPalindrome
    Strings,
    /// fibonacci
    Sequences,
}

impl FunctionSet {
    pub const ALL: [FunctionSet; 3] = [FunctionSet::Math, FunctionSet::Strings, FunctionSet::Sequences];

    /// Add this set's functions to `registry`
    pub fn register(self, registry: &mut FunctionRegistry) -> PluginResult<()> {
        match self {
            FunctionSet::Math => math::register(registry),
            FunctionSet::Strings => strings::register(registry),
            FunctionSet::Sequences => sequences::register(registry),
        }
    }
}

impl fmt::Display for FunctionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FunctionSet::Math => "math",
            FunctionSet::Strings => "strings",
            FunctionSet::Sequences => "sequences",
        };
        f.write_str(name)
    }
}

/// Registry holding every function of `sets`; a set listed twice is registered once
pub fn build_registry(sets: &[FunctionSet]) -> PluginResult<FunctionRegistry> {
    let mut registry = FunctionRegistry::new();
    let mut seen = Vec::with_capacity(sets.len());
    for set in sets {
        if seen.contains(set) {
            continue;
        }
        set.register(&mut registry)?;
        seen.push(*set);
    }
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_registry_all_sets() {
        let registry = build_registry(&FunctionSet::ALL).unwrap();
        assert_eq!(registry.len(), 17);
        assert_eq!(&registry.names()[..2], ["add", "subtract"]);
        assert!(registry.contains("isPalindrome"));
        assert!(registry.contains("fibonacci"));
    }

    #[test]
    fn test_duplicate_sets_registered_once() {
        let registry = build_registry(&[FunctionSet::Sequences, FunctionSet::Sequences]).unwrap();
        assert_eq!(registry.names(), ["fibonacci"]);
    }
}
