use anyhow::Context;
use folio_server::{
    app::build_router,
    config::{ServerConfig, StorageMode},
    db::{migrations::run_migrations, pool::create_pg_pool},
    logging::init_tracing,
    repository::Repositories,
    rpc::AppState,
};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env();
    init_tracing(&config.log_filter, config.log_format);
    config.validate().context("refusing to start with development settings")?;

    if config.is_dev_auth_secret() {
        warn!("using the development auth secret; set FOLIO_AUTH_SECRET outside local development");
    }

    let repositories = match config.storage_mode() {
        StorageMode::Postgres { database_url } => {
            let pool = create_pg_pool(&database_url, &config.pool)
                .await
                .context("failed to configure postgres pool")?;
            run_migrations(&pool).await?;
            Repositories::postgres(pool)
        }
        StorageMode::Memory => {
            warn!("no valid FOLIO_DATABASE_URL; serving in-memory demo data");
            Repositories::memory_with_fixtures()
        }
    };

    let storage = repositories.backend_name();
    let state = AppState::from_config(&config, repositories)?;
    let app = build_router(state, config.cors_origins.as_deref());

    let listener = TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind listener on {}", config.listen_addr))?;

    info!(listen_addr = %config.listen_addr, storage, "starting folio server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("folio server exited unexpectedly")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            error!(%error, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                error!(%error, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("shutdown signal received");
}
