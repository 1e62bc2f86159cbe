use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{Router, middleware};
use tower_http::trace::TraceLayer;

use todo_app::{
    auth::bootstrap::init_providers,
    config::AppConfig,
    db,
    logging::init_tracing,
    middleware::{catch_panic_layer, json_error_middleware},
    outputs::ClientOutputs,
    routes::{API_PREFIX, router},
    services::ServiceContext,
    state::AppState,
};

#[tokio::main]
async fn main() {
    // No subscriber exists until the config is known, so config errors go straight to stderr.
    let cfg = match AppConfig::from_env().context("failed to load config") {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("{err:?}");
            std::process::exit(1);
        }
    };
    init_tracing(&cfg.logging);

    if let Err(err) = run(cfg).await {
        tracing::error!("server failed: {err:?}");
        std::process::exit(1);
    }
}

async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let db = db::connect(&cfg.database).await?;
    let services = ServiceContext::new(&db);
    let providers = init_providers(&cfg.auth, &services)?;

    if let Some(path) = cfg.general.outputs_path.as_deref() {
        ClientOutputs::from_config(&cfg).write(path)?;
        tracing::info!(path, "client outputs written");
    }

    let addr: SocketAddr = format!("{}:{}", cfg.general.host, cfg.general.port)
        .parse()
        .context("invalid host/port")?;
    let state = AppState::new(cfg, db, providers);

    let app = Router::new()
        .merge(router(Arc::clone(&state)))
        .layer(middleware::from_fn(json_error_middleware))
        .layer(catch_panic_layer())
        .layer(TraceLayer::new_for_http());

    tracing::info!("listening on http://{}", addr);
    tracing::info!("client outputs at {}{API_PREFIX}/outputs.json", state.config.public_url());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
