use anyhow::{Context, Result};
use clap::Parser;
use std::time::Duration;
use tracing::{info, warn};

use plugwire_config::ConfigLoader;
use plugwire_demo::build_registry;
use plugwire_logging::init_logging_from_config;
use plugwire_plugin::Plugin;

mod cli;
use cli::Cli;

/// How long exit waits for handlers abandoned by a stop
const HANDLER_GRACE: Duration = Duration::from_secs(2);

fn main() -> Result<()> {
    let cli = Cli::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build async runtime")?;
    let outcome = runtime.block_on(run(cli));
    runtime.shutdown_timeout(HANDLER_GRACE);
    outcome
}

async fn run(cli: Cli) -> Result<()> {

    let mut config = ConfigLoader::new()
        .load(cli.config.as_ref())
        .context("Failed to load configuration")?
        .with_fallback_address(cli.address.clone());

    if let Some(level) = &cli.log_level {
        config.logging.level = level.parse().map_err(anyhow::Error::msg)?;
    }
    init_logging_from_config(&config.logging)?;

    let registry = build_registry(&cli.functions).context("Failed to register functions")?;
    let plugin = Plugin::new(registry, config);
    info!(functions = ?plugin.function_names(), "Starting demo plugin");

    tokio::select! {
        started = plugin.start() => started.context("Plugin failed to start")?,
        _ = shutdown_signal() => {
            info!("Shutdown signal received before start-up completed");
            plugin.stop().await;
            return Ok(());
        }
    }

    tokio::select! {
        _ = plugin.wait() => info!("Session ended by host"),
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
            plugin.stop().await;
        }
    }

    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on Unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
