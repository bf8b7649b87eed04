use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::{error, info};

use guestbook_api::config::{Config, Mode};
use guestbook_api::ondemand;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "guestbook_server=debug,guestbook_api=debug,guestbook_db=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;
    let addr: SocketAddr = config.bind_addr().parse()?;

    match config.mode {
        Mode::Standalone => run_standalone(&config, addr).await,
        Mode::OnDemand => run_on_demand(addr).await,
    }
}

/// Build the app up front and serve it until shutdown.
async fn run_standalone(config: &Config, addr: SocketAddr) -> anyhow::Result<()> {
    let app = guestbook_api::build_app(config)?;

    let listener = TcpListener::bind(addr).await?;
    info!("Guestbook server listening on {} (prefix '{}')", addr, config.api_prefix);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Guestbook server stopped");
    Ok(())
}

/// Accept connections right away; the app itself is only built when the
/// first request arrives and is then shared by every connection.
async fn run_on_demand(addr: SocketAddr) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Guestbook on-demand handler listening on {}", addr);

    ondemand::serve(listener, ondemand::global(), ondemand::init_from_env, shutdown_signal()).await
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(e) => {
                    error!("failed to install SIGTERM handler: {}", e);
                    ctrl_c.await.ok();
                    return;
                }
            };
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
