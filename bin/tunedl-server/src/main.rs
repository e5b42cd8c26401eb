//! tunedl-server – entry point.
//!
//! Startup order:
//! 1. Parse configuration from environment variables.
//! 2. Initialise structured tracing (JSON in production, pretty in dev).
//! 3. Probe the yt-dlp binary and build the job dispatcher.
//! 4. Build the Axum router and start the HTTP server with graceful shutdown.

mod config;
mod error;
mod middleware;
mod routes;
mod schemas;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};
use tunedl_core::extractor::YtDlpExtractor;
use tunedl_core::{Dispatcher, JobRegistry};

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Configuration ───────────────────────────────────────────────────────
    let cfg = Config::from_env();

    // ── 2. Tracing ─────────────────────────────────────────────────────────────
    let env_filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => match cfg.log_level.parse::<tracing_subscriber::EnvFilter>() {
            Ok(f) => f,
            Err(e) => {
                eprintln!(
                    "WARN: TUNEDL_LOG='{}' is not a valid tracing filter ({}); \
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

    info!(version = env!("CARGO_PKG_VERSION"), "tunedl-server starting");

    // ── 3. Extractor + dispatcher ──────────────────────────────────────────────
    let mut extractor = YtDlpExtractor::new(&cfg.ytdlp_path);
    if let Some(ffmpeg) = &cfg.ffmpeg_path {
        extractor = extractor.with_ffmpeg_location(ffmpeg);
    }
    if !extractor.is_available().await {
        // Jobs will still be accepted and fail individually.
        warn!(path = %cfg.ytdlp_path, "yt-dlp not found; downloads will fail");
    }

    let dispatcher = Dispatcher::new(
        JobRegistry::new(),
        Arc::new(extractor),
        cfg.output_dir.clone(),
    );
    info!(output_dir = %cfg.output_dir, "dispatcher ready");

    let state = Arc::new(AppState::new(cfg.clone(), dispatcher));

    // ── 4. HTTP server with graceful shutdown ──────────────────────────────────
    let app = routes::build(Arc::clone(&state));
    let addr: SocketAddr = cfg.bind_address.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let unfinished = state.reporter.list_all().await.stats.map_or(0, |s| {
        s.downloading + s.processing
    });
    if unfinished > 0 {
        warn!(unfinished, "shutting down with jobs still running");
    }

    info!("tunedl-server stopped");
    Ok(())
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
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("shutdown signal received; starting graceful shutdown");
}
