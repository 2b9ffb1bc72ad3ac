mod config;
mod db;
mod error;
mod grid;
mod routes;
mod services;
mod state;
mod widgets;

#[tokio::main]
async fn main() {
    let dotenv = dotenvy::dotenv();
    tracing_subscriber::fmt::init();
    match dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => tracing::debug!("no .env file"),
        Err(e) => tracing::warn!(error = %e, "ignoring malformed .env"),
    }

    let config = config::HestiaConfig::from_env();

    let pool = db::init_pool(&config.database_url, config.db_max_connections)
        .await
        .expect("database init failed");
    let dashboard = services::persistence::load_dashboard(&pool)
        .await
        .expect("dashboard load failed");
    let state = state::AppState::new(pool, dashboard);

    // Spawn background persistence task.
    let persistence = services::persistence::spawn_persistence_task(state.clone(), config.flush_interval_ms);

    let app = routes::app(state.clone(), &config.web_dir);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .expect("failed to bind");

    tracing::info!(port = config.port, web_dir = %config.web_dir.display(), "hestia listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server failed");

    persistence.abort();
    match services::persistence::flush_if_dirty(&state).await {
        Ok(true) => tracing::info!("final flush written"),
        Ok(false) => {}
        Err(e) => tracing::error!(error = %e, "final flush failed"),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
