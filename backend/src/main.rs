//! Backend entry-point: loads settings, wires adapters, and serves the REST API.

mod server;

use std::io;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use campus_events::inbound::http::health::HealthState;
use campus_events::inbound::http::session_config::{BuildMode, resolve_session_settings};
use campus_events::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use server::{ServerConfig, ServerSettings, create_server};

async fn connect_database(url: String, pool_size: u32) -> io::Result<DbPool> {
    let migration_url = url.clone();
    let applied = tokio::task::spawn_blocking(move || run_pending_migrations(&migration_url))
        .await
        .map_err(|err| io::Error::other(format!("migration task failed: {err}")))?
        .map_err(|err| io::Error::other(err.to_string()))?;
    info!(applied, "database migrations applied");

    DbPool::new(PoolConfig::new(url).with_max_size(pool_size))
        .await
        .map_err(|err| io::Error::other(err.into_message()))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load()
        .map_err(|err| io::Error::other(format!("failed to load settings: {err}")))?;
    let bind_addr = settings
        .bind_addr()
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;
    let session = resolve_session_settings(
        &DefaultEnv::new(),
        &settings.session_key_file(),
        settings.cookie_secure,
        BuildMode::from_debug_assertions(),
    )
    .map_err(io::Error::other)?;

    let mut config = ServerConfig::new(session, bind_addr, settings.upload_dir())
        .with_max_upload_bytes(settings.max_upload_bytes());
    if let Some(url) = settings.database_url() {
        let pool = connect_database(url.to_owned(), settings.db_pool_size()).await?;
        config = config.with_db_pool(pool);
    }

    let health_state = web::Data::new(HealthState::new());
    info!(addr = %config.bind_addr(), "starting server");
    create_server(health_state, config)?.await
}
