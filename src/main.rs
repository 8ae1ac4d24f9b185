use mimalloc::MiMalloc;
use quill_api::config::Config;
use quill_api::db::repository;
use quill_api::router::{QuillState, quill_router};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::load()?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        cluster_endpoint = %cfg.endpoint().unwrap_or("<none>"),
        aws_region = %cfg.aws_region,
        listen_addr = %cfg.listen_addr,
        loglevel = %cfg.loglevel,
        token_validity_secs = cfg.token_validity_secs,
        sessions = cfg.session_secret().is_some(),
    );

    if cfg.endpoint().is_none() {
        warn!("CLUSTER_ENDPOINT is not set; database operations will fail");
    }
    if cfg.session_secret().is_none() {
        warn!("JWT_SECRET is not set; login and protected routes are unavailable");
    }

    let state = QuillState::from_config(&cfg).await;

    if cfg.init_schema {
        state
            .factory()
            .scoped(|conn| Box::pin(repository::init_schema(conn)))
            .await?;
        info!("schema initialized");
    }

    let app = quill_router(state);

    let listener = TcpListener::bind(&cfg.listen_addr).await?;
    info!("HTTP server listening on {}", cfg.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
    }
    info!("shutting down");
}
