#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use codeurl::AppCore;
use codeurl::api;
use codeurl::config::AppConfig;
use codeurl::services;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,codeurl=debug".into()),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting CodeUrl server");

    let config = AppConfig::load().expect("Failed to load configuration");
    let core = Arc::new(
        AppCore::new(&config.db_path, config.clone()).expect("Failed to initialize app core"),
    );

    spawn_cleanup_task(core.clone());

    let app = api::router(core.clone());

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind to {addr}: {e}"));

    tracing::info!("CodeUrl running on http://{addr}");

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}

/// Periodic expiry sweep; the interval comes from configuration.
fn spawn_cleanup_task(core: Arc<AppCore>) {
    let interval = Duration::from_secs(core.config.cleanup_interval_secs);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick fires immediately; skip it so startup stays fast.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if let Err(e) = services::cleanup::run_cleanup(&core) {
                tracing::error!(error = %e, "cleanup pass failed");
            }
        }
    });
}
