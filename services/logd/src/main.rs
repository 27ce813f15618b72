use anyhow::{bail, Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use logd::config::{Cli, Layout};
use logd::server::build_router;
use logd::state::AppState;
use logd::telemetry;
use logstore::{LogStore, MemStore, PgBlobStore, PgRowStore};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    telemetry::init_telemetry()?;

    match cli.layout {
        Layout::Blob => {
            let store = PgBlobStore::connect(require_conn(&cli)?)
                .await
                .context("failed to open backend")?;
            store.migrate().await.context("failed to run migrations")?;
            store.ping().await.context("backend ping failed")?;
            info!("postgres: ok (blob frontier layout)");
            serve(store, cli.port).await
        }
        Layout::Rows => {
            let store = PgRowStore::connect(require_conn(&cli)?)
                .await
                .context("failed to open backend")?;
            store.migrate().await.context("failed to run migrations")?;
            store.ping().await.context("backend ping failed")?;
            info!("postgres: ok (row-per-entry frontier layout)");
            serve(store, cli.port).await
        }
        Layout::Memory => {
            info!("memory store: ok (state is not durable)");
            serve(MemStore::new(), cli.port).await
        }
    }
}

fn require_conn(cli: &Cli) -> Result<&str> {
    if cli.conn.is_empty() {
        bail!("--conn is required for layout {:?}", cli.layout);
    }
    Ok(&cli.conn)
}

async fn serve<S: LogStore>(store: S, port: u16) -> Result<()> {
    let state = Arc::new(AppState::new(store));
    let app = build_router(state);

    let listener = TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("failed to bind port {port}"))?;
    info!("logd listening on http://0.0.0.0:{port}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("shutdown complete");
    Ok(())
}

/// Resolves on SIGINT or SIGTERM. In-flight requests (and their commits)
/// complete before the server exits.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received, draining in-flight requests");
}
