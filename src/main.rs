use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::info;

use pharmacy_api as api;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = api::config::load_config().context("failed to load configuration")?;
    api::config::init_tracing(&cfg.log_level, cfg.log_json);

    let db = api::db::establish_connection(&cfg.database_url)
        .await
        .context("failed to connect to database")?;
    if cfg.auto_migrate {
        api::db::run_migrations(&db)
            .await
            .context("failed to run migrations")?;
    }

    tokio::fs::create_dir_all(&cfg.uploads_dir)
        .await
        .context("failed to create uploads directory")?;

    let state = api::AppState {
        db: Arc::new(db),
        config: cfg.clone(),
    };
    let app = api::app_router(state);

    let addr: SocketAddr = cfg
        .server_addr()
        .parse()
        .context("invalid host/port configuration")?;
    info!(%addr, environment = %cfg.environment, "pharmacy-api listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind server address")?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
    info!("shutdown signal received");
}
