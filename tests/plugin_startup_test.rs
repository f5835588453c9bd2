//! Start-up paths: endpoint preparation, accept deadline, handshake deadline

#![cfg(unix)]

mod common;

use anyhow::Result;
use std::time::Duration;

use common::{init_test_logging, ScriptedHost};
use plugwire_config::PluginConfig;
use plugwire_demo::{build_registry, FunctionSet};
use plugwire_ipc::{IpcError, MessageType};
use plugwire_plugin::{Plugin, PluginError};

fn config_for(address: &std::path::Path) -> PluginConfig {
    PluginConfig {
        address: Some(address.to_string_lossy().into_owned()),
        ..PluginConfig::default()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_start_creates_directory_and_replaces_stale_socket() -> Result<()> {
    init_test_logging();
    let dir = tempfile::tempdir()?;
    let socket = dir.path().join("run").join("plugin.sock");
    std::fs::create_dir_all(dir.path().join("run"))?;
    std::fs::write(&socket, b"left over from a crashed run")?;

    let plugin = std::sync::Arc::new(Plugin::new(
        build_registry(&[FunctionSet::Sequences])?,
        config_for(&socket),
    ));
    let starter = {
        let plugin = plugin.clone();
        tokio::spawn(async move { plugin.start().await })
    };

    let mut host = ScriptedHost::connect(&socket).await?;
    assert_eq!(host.accept_registration().await?, ["fibonacci"]);
    starter.await??;

    plugin.stop().await;
    Ok(())
}

#[tokio::test]
async fn test_accept_timeout_without_host() -> Result<()> {
    init_test_logging();
    let dir = tempfile::tempdir()?;
    let config = PluginConfig {
        accept_timeout: Some(Duration::from_millis(100)),
        ..config_for(&dir.path().join("lonely.sock"))
    };

    let plugin = Plugin::new(build_registry(&[FunctionSet::Math])?, config);
    let result = plugin.start().await;

    assert!(matches!(result, Err(PluginError::Ipc(IpcError::Timeout(100)))));
    assert!(!plugin.is_running());
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_handshake_deadline_closes_connection() -> Result<()> {
    init_test_logging();
    let dir = tempfile::tempdir()?;
    let socket = dir.path().join("silent.sock");
    let config = PluginConfig {
        handshake_timeout: Duration::from_millis(200),
        ..config_for(&socket)
    };

    let plugin = std::sync::Arc::new(Plugin::new(build_registry(&[FunctionSet::Math])?, config));
    let starter = {
        let plugin = plugin.clone();
        tokio::spawn(async move { plugin.start().await })
    };

    let mut host = ScriptedHost::connect(&socket).await?;
    assert_eq!(host.recv().await?.message_type, MessageType::Register);

    // Never acknowledge
    let result = starter.await?;
    assert!(matches!(result, Err(PluginError::HandshakeTimeout { .. })));
    assert!(host.is_closed().await);
    assert!(!plugin.is_running());
    Ok(())
}

#[tokio::test]
async fn test_missing_address() -> Result<()> {
    let plugin = Plugin::new(build_registry(&[FunctionSet::Math])?, PluginConfig::default());
    assert!(matches!(plugin.start().await, Err(PluginError::NoAddress)));
    Ok(())
}
