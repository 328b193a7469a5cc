//! # nodedb-cli
//!
//! Composition root for the embedded store: loads configuration, wires up
//! logging, opens a [`storage_api::Store`], and runs a small demonstration
//! workload before committing and waiting for a shutdown signal.
//!
//! The store itself has no network surface — it's an embedded, in-process
//! engine, not a client/server protocol — so this binary exists only to
//! exercise it and to host the ambient logging/config/shutdown machinery
//! real deployments need.

use crate::config::EngineConfig;
use crate::engine_environment::EngineEnvironment;
use std::error::Error;
use std::path::PathBuf;
use storage_api::Collection;
use tokio_util::sync::CancellationToken;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

mod config;
mod engine_environment;

#[tokio::main]
async fn main() {
    let cfg = match EngineConfig::load_from_file("nodedb.toml") {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };

    let logging_guard = match init_logging(&cfg.storage.logs_dir) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("failed to initialize logging: {e}");
            std::process::exit(2);
        }
    };

    let env = match EngineEnvironment::open(cfg) {
        Ok(e) => e,
        Err(e) => {
            tracing::error!("failed to open store: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run_demo_workload(&env) {
        tracing::error!("demo workload failed: {e}");
    }

    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            wait_for_shutdown_signal().await;
            tracing::info!("shutdown signal received; beginning graceful shutdown");
            shutdown.cancel();
        });
    }
    shutdown.cancelled().await;

    if let Err(e) = env.store.commit(true) {
        tracing::error!("final commit failed: {e}");
    }
    if let Err(e) = env.store.close() {
        tracing::error!("failed to close store: {e}");
    }

    drop(logging_guard);
    tracing::info!("shutdown complete");
}

/// Exercises a handful of the store's operations so a freshly opened store
/// is never entirely empty, the way a startup smoke check would.
fn run_demo_workload(env: &EngineEnvironment) -> Result<(), storage_api::StoreError> {
    let store = &env.store;
    let greeting = match store.find(None, Collection::Keys, b"greeting")? {
        Some(existing) => existing,
        None => store.create_key(None, b"greeting")?,
    };
    if store.find(Some(greeting), Collection::Values, b"text")?.is_none() {
        store.create_string(greeting, b"text", "hello, nodedb")?;
    }
    store.commit(false)?;
    tracing::info!("demo workload complete");
    Ok(())
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigint = signal(SignalKind::interrupt()).expect("sigint handler");
        let mut sigterm = signal(SignalKind::terminate()).expect("sigterm handler");

        tokio::select! {
            _ = sigint.recv() => {},
            _ = sigterm.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.expect("ctrl_c handler");
    }
}

/// Sets up logging for the process.
pub fn init_logging(log_dir: &PathBuf) -> Result<WorkerGuard, Box<dyn Error + Send + Sync>> {
    let file_appender = tracing_appender::rolling::daily(log_dir, "nodedb.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    let console_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false)
        .with_level(true)
        .compact();

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .json()
        .with_current_span(true)
        .with_span_list(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}
