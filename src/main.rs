use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use sprilliblo_api::realtime::RealtimeHub;
use sprilliblo_api::state::AppState;
use sprilliblo_api::storage::{LocalDiskStorage, S3Storage};
use sprilliblo_api::{app, config, database};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = config::config();
    tracing::info!("starting in {:?} mode", config.environment);

    let pool = database::connect()
        .await
        .unwrap_or_else(|e| panic!("database connection failed: {e}"));

    let library_store = Arc::new(
        S3Storage::from_env(
            config.media.s3_bucket.clone(),
            config.media.public_base_url.clone(),
        )
        .await,
    );
    let legacy_store = Arc::new(LocalDiskStorage::new(
        &config.media.legacy_upload_dir,
        "/api/media".to_string(),
    ));

    let state = AppState::new(pool, Arc::new(RealtimeHub::new()), library_store, legacy_store);
    let app = app(state);

    let port = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);
    let bind_addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {bind_addr}: {e}"));

    tracing::info!("listening on http://{}", bind_addr);
    axum::serve(listener, app).await.expect("server");
}
