mod bootstrap;
mod health;
mod quotes;

use std::time::Duration;

use anyhow::Result;
use quotebox_core::config::{AppConfig, LoadOptions};

fn init_logging(config: &AppConfig) {
    use quotebox_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    // Load config and initialize logging before any other operations
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config).await?;

    let address = app.config.listen_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let server = axum::serve(listener, app.router()).with_graceful_shutdown(async move {
        let _ = stop_rx.await;
    });
    let mut serve_task = tokio::spawn(async move { server.await });

    tracing::info!(
        event_name = "system.server.started",
        correlation_id = "bootstrap",
        bind_address = %address,
        "quotebox-server listening"
    );

    wait_for_shutdown().await?;
    tracing::info!(
        event_name = "system.server.stopping",
        correlation_id = "shutdown",
        "quotebox-server no longer accepting connections"
    );

    // Stop accepting first, give in-flight requests the grace period, then release storage.
    let _ = stop_tx.send(());
    let grace = Duration::from_secs(app.config.server.graceful_shutdown_secs);
    match tokio::time::timeout(grace, &mut serve_task).await {
        Ok(Ok(Ok(()))) => {}
        Ok(Ok(Err(error))) => {
            tracing::warn!(
                event_name = "system.server.error",
                correlation_id = "shutdown",
                error = %error,
                "http server terminated with an error"
            );
        }
        Ok(Err(error)) => {
            tracing::warn!(
                event_name = "system.server.error",
                correlation_id = "shutdown",
                error = %error,
                "http server task failed"
            );
        }
        Err(_) => {
            serve_task.abort();
            tracing::warn!(
                event_name = "system.server.drain_timeout",
                correlation_id = "shutdown",
                grace_secs = app.config.server.graceful_shutdown_secs,
                "in-flight requests did not finish within the grace period"
            );
        }
    }

    app.repository.close().await?;
    tracing::info!(
        event_name = "system.server.stopped",
        correlation_id = "shutdown",
        "storage released"
    );

    Ok(())
}

async fn wait_for_shutdown() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result?,
            _ = terminate.recv() => {}
        }
    }

    #[cfg(not(unix))]
    tokio::signal::ctrl_c().await?;

    Ok(())
}
