//! CLI argument parsing definitions

use clap::Parser;
use std::path::PathBuf;

use plugwire_demo::FunctionSet;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Endpoint address, used when GOPROC_PLUGIN_ADDRESS is not set
    #[arg(value_name = "ADDRESS")]
    pub address: Option<String>,

    /// Path to configuration file (YAML, or JSON with a .json extension)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Set the log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Function sets to expose
    #[arg(
        long,
        value_enum,
        value_delimiter = ',',
        default_values_t = FunctionSet::ALL
    )]
    pub functions: Vec<FunctionSet>,
}
