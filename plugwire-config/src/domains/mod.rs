//! Configuration domains

pub mod logging;
pub mod plugin;
pub mod utils;
