//! Example function sets for the plugwire demo plugin

pub mod functions;

pub use functions::{build_registry, FunctionSet};
