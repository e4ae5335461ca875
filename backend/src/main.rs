//! Socialgate entry-point: loads settings, prepares storage and serves HTTP.

mod server;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use socialgate::inbound::http::health::HealthState;
use socialgate::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use socialgate::settings::AppSettings;

use server::{ServerConfig, create_server};

#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().wrap_err("failed to load settings")?;
    info!(settings = ?settings, "starting socialgate");

    let mut config = ServerConfig::new(settings.clone());
    if let Some(url) = settings.database_url.as_deref() {
        run_migrations(url)
            .await
            .wrap_err("failed to apply database migrations")?;
        let pool = DbPool::new(PoolConfig::new(url))
            .await
            .wrap_err("failed to build the database pool")?;
        config = config.with_db_pool(pool);
    }

    let bind_addr = config.bind_addr();
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)
        .await
        .wrap_err_with(|| format!("failed to start the server on {bind_addr}"))?;
    info!(%bind_addr, "listening");
    server.await.wrap_err("server terminated with an error")
}
