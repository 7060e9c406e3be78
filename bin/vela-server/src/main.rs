//! vela-server – entry point.
//!
//! Startup order:
//! 1. Parse command-line arguments and environment configuration.
//! 2. Initialise structured tracing (JSON or human-readable).
//! 3. Load the model once; on failure keep serving with an unloaded handle.
//! 4. Build the Axum router and start the HTTP server with graceful shutdown.

mod config;
mod error;
mod middleware;
mod routes;
mod schemas;
mod state;

use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn};
use vela_core::{ModelHandle, RemoteEngine};

use crate::config::{Cli, Config};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Configuration ───────────────────────────────────────────────────────
    let cli = Cli::parse();
    let cfg = Config::from_env();

    // ── 2. Tracing ─────────────────────────────────────────────────────────────
    init_tracing(&cfg);
    info!(version = env!("CARGO_PKG_VERSION"), "vela-server starting");

    // ── 3. Model ───────────────────────────────────────────────────────────────
    let model = match RemoteEngine::load(&cli.engine_url, &cli.model, &cfg.load_options).await {
        Ok(engine) => ModelHandle::loaded(Arc::new(engine)),
        Err(e) => {
            error!(
                model = %cli.model,
                error = ?e,
                "model failed to load; chat completions will return 500 until restart"
            );
            ModelHandle::unloaded()
        }
    };

    // ── 4. HTTP server with graceful shutdown ──────────────────────────────────
    let state = Arc::new(AppState::new(cfg, model));
    let app = routes::build(state);

    let listener = tokio::net::TcpListener::bind((cli.host.as_str(), cli.port)).await?;
    info!(addr = %listener.local_addr()?, "HTTP server listening");
    info!(
        "local endpoint: http://localhost:{}/v1/chat/completions",
        cli.port
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("vela-server stopped");
    Ok(())
}

/// Install the global subscriber. `RUST_LOG` wins over `VELA_LOG`.
fn init_tracing(cfg: &Config) {
    let env_filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => match cfg.log_level.parse::<tracing_subscriber::EnvFilter>() {
            Ok(f) => f,
            Err(e) => {
                eprintln!(
                    "WARN: VELA_LOG='{}' is not a valid tracing filter ({}); \
                     falling back to 'info'",
                    cfg.log_level, e
                );
                tracing_subscriber::EnvFilter::new("info")
            }
        },
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_ids(true);

    if cfg.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

/// Returns a future that resolves when SIGINT (Ctrl-C) or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install CTRL+C signal handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => warn!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c    => {}
        _ = terminate => {}
    }

    info!("shutdown signal received; starting graceful shutdown");
}
