// # drivewatchd - Drive Watch Daemon
//
// Thin integration layer: all monitoring logic lives in drivewatch-core.
//
// The daemon is responsible for:
// 1. Loading the TOML configuration file
// 2. Initializing logging and the runtime
// 3. Registering message senders and building the snapshot source
// 4. Running the monitor engine until SIGINT/SIGTERM
//
// ## Environment
//
// - `DRIVEWATCH_CONFIG`: path to the configuration file (default `config.toml`)
// - `DRIVEWATCH_LOG_LEVEL`: overrides `general.log_level`
//
// ## Example
//
// ```bash
// export DRIVEWATCH_CONFIG=/etc/drivewatch/config.toml
// drivewatchd
// ```

use anyhow::{Context, Result};
use drivewatch_core::{EngineSettings, MonitorConfig, MonitorEngine, Notifier, SenderRegistry};
use std::env;
use std::future::Future;
use std::process::ExitCode;
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

const CONFIG_PATH_VAR: &str = "DRIVEWATCH_CONFIG";
const LOG_LEVEL_VAR: &str = "DRIVEWATCH_LOG_LEVEL";
const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DriveWatchExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (the monitor faulted)
    RuntimeError = 2,
}

impl From<DriveWatchExitCode> for ExitCode {
    fn from(code: DriveWatchExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Load and validate configuration, applying the log level override
fn load_config(path: &str, log_level_override: Option<String>) -> Result<MonitorConfig> {
    let mut config = MonitorConfig::from_file(path)
        .with_context(|| format!("failed to load configuration from {}", path))?;

    if let Some(level) = log_level_override.filter(|l| !l.trim().is_empty()) {
        config.general.log_level = level.trim().to_string();
    }

    config.validate()?;
    Ok(config)
}

fn parse_log_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn main() -> ExitCode {
    let config_path = env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

    let config = match load_config(&config_path, env::var(LOG_LEVEL_VAR).ok()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return DriveWatchExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_log_level(&config.general.log_level))
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DriveWatchExitCode::ConfigError.into();
    }

    info!("Starting drivewatchd");
    info!(
        "Configuration loaded from {}: alert service '{}', polling every {}s",
        config_path,
        config.general.alert_backend(),
        config.monitor.poll_interval_secs
    );

    // One thread of control; every step of a poll cycle is awaited in turn
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DriveWatchExitCode::RuntimeError.into();
        }
    };

    rt.block_on(run_daemon(config)).into()
}

/// Wire the engine together and run it until shutdown
async fn run_daemon(config: MonitorConfig) -> DriveWatchExitCode {
    let mut registry = SenderRegistry::new();
    drivewatch_notify_telegram::register(&mut registry);
    drivewatch_notify_twilio::register(&mut registry);
    info!("Registered message senders: {:?}", registry.list_senders());

    let notifier = match Notifier::from_registry(&registry, &config) {
        Ok(notifier) => notifier,
        Err(e) => {
            error!("Failed to set up notifications: {}", e);
            return DriveWatchExitCode::ConfigError;
        }
    };

    // Listeners must exist before the first cycle so an early signal is kept
    let shutdown = match shutdown_signal() {
        Ok(shutdown) => shutdown,
        Err(e) => {
            error!("Failed to install signal handlers: {}", e);
            return DriveWatchExitCode::ConfigError;
        }
    };

    let source = drivewatch_source_chrome::chrome_source(&config);
    let (mut engine, mut events) =
        MonitorEngine::new(Box::new(source), notifier, EngineSettings::from(&config));

    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            debug!("Monitor event: {:?}", event);
        }
    });

    match engine.run_until(shutdown).await {
        Ok(()) => {
            info!("Shutting down drivewatchd");
            DriveWatchExitCode::CleanShutdown
        }
        Err(e) => {
            error!("Monitor stopped after a fault: {}", e);
            DriveWatchExitCode::RuntimeError
        }
    }
}

/// Future that resolves on SIGTERM or SIGINT
#[cfg(unix)]
fn shutdown_signal() -> Result<impl Future<Output = ()>> {
    let mut sigterm = signal(SignalKind::terminate()).context("Failed to setup SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to setup SIGINT handler")?;

    Ok(async move {
        let name = tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        };
        info!("Received shutdown signal: {}", name);
    })
}

/// Future that resolves on CTRL-C
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
fn shutdown_signal() -> Result<impl Future<Output = ()>> {
    Ok(async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received shutdown signal: SIGINT"),
            Err(e) => error!("Failed to wait for CTRL-C: {}", e),
        }
    })
}
