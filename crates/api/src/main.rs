use parley_api::{build_router, state::AppState};
use parley_config::Settings;
use parley_db::{connect, indexes::ensure_indexes};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file (silently ignore if missing)
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "parley_api=debug,parley_services=debug,parley_db=debug,tower_http=debug".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load config
    let settings = Settings::load()?;
    info!("Starting Parley API on {}:{}", settings.app.host, settings.app.port);
    info!(
        grace_window_secs = settings.unread.grace_window_secs,
        heartbeat_interval_secs = settings.unread.heartbeat_interval_secs,
        hub_queue = settings.hub.queue_capacity,
        "Engine tunables"
    );

    // Connect to MongoDB
    let db = connect(&settings).await?;

    // Ensure indexes
    ensure_indexes(&db).await?;

    // Build app state (spawns the hub worker)
    let app_state = AppState::new(db, settings.clone());

    // Build router
    let app = build_router(app_state);

    // Start server
    let addr = format!("{}:{}", settings.app.host, settings.app.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
