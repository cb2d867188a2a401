use std::sync::Arc;

use kunai_app::app::api::routes;
use kunai_app::config::ConfigHandler;
use kunai_app::db_handler::DbProviderHandler;
use kunai_core::config::load_config;
use kunai_db::db::connection::create_pool;
use kunai_db::db::migrate::run_migrations;
use kunai_service::auth::{AuthzEngine, AuthzEngineHandler, TokenService, TokenServiceHandler};
use salvo::conn::TcpListener;
use salvo::{Listener, Router};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    tracing::info!("Starting Kunai task management server");

    let config = load_config()?;

    // The signing secret stays out of the logs.
    tracing::info!(
        server = %config.server.bind_addr(),
        database = %config.database.url,
        log_level = %config.logging.level,
        "Configuration loaded"
    );

    if let Ok(filter) = EnvFilter::try_new(config.logging.level.as_str()) {
        if let Err(e) = filter_handle.modify(|current| *current = filter) {
            tracing::warn!(error = %e, "Failed to update log filter from config");
        }
    } else {
        tracing::warn!(level = %config.logging.level, "Invalid log level in config, keeping debug");
    }

    run_migrations(&config.database.url).await?;

    let pool = create_pool(
        &config.database.url,
        u32::from(config.database.max_connections),
    )
    .await?;

    tracing::info!("Database connection pool created.");

    let tokens = TokenService::new(&config.auth.secret, config.auth.token_ttl_secs);

    let bind_addr = config.server.bind_addr();
    let acceptor = TcpListener::new(bind_addr.clone()).bind().await;

    let router = Router::new()
        .hoop(DbProviderHandler { provider: pool })
        .hoop(ConfigHandler {
            settings: config.clone(),
        })
        .hoop(TokenServiceHandler {
            tokens: Arc::new(tokens),
        })
        .hoop(AuthzEngineHandler {
            engine: Arc::new(AuthzEngine::new()),
        })
        .push(routes());

    tracing::info!("Server listening on {bind_addr}");

    salvo::Server::new(acceptor).serve(router).await;

    Ok(())
}
