use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, Router};
use quotebox_core::config::AppConfig;
use quotebox_db::{connect_with_settings, schema, DbPool, QuoteRepository, SqlQuoteRepository};
use thiserror::Error;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;

use crate::{health, quotes};

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub repository: Arc<dyn QuoteRepository>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database schema setup failed: {0}")]
    Schema(#[source] sqlx::Error),
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    schema::ensure(&db_pool).await.map_err(BootstrapError::Schema)?;
    info!(
        event_name = "system.bootstrap.schema_ready",
        correlation_id = "bootstrap",
        "quotes schema ensured"
    );

    let repository: Arc<dyn QuoteRepository> = Arc::new(SqlQuoteRepository::new(db_pool.clone()));

    Ok(Application { config, db_pool, repository })
}

impl Application {
    /// Quote and health routes behind request tracing and the per-request timeout.
    pub fn router(&self) -> Router {
        let request_timeout = Duration::from_secs(self.config.server.request_timeout_secs);

        quotes::router(self.repository.clone())
            .merge(health::router(self.db_pool.clone()))
            .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, request_timeout))
            .layer(TraceLayer::new_for_http())
    }
}
