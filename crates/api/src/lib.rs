pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;
pub mod ws;

use axum::{
    Router,
    routing::{get, post},
};
use state::AppState;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let room_routes = Router::new()
        .route("/", get(routes::room::list))
        .route("/", post(routes::room::create))
        .route("/{room_id}/join", post(routes::room::join))
        .route("/{room_id}/leave", post(routes::room::leave))
        .route("/{room_id}/member", get(routes::room::members))
        .route("/{room_id}/read", post(routes::read::mark_read));

    let message_routes = Router::new()
        .route("/", get(routes::message::list))
        .route("/", post(routes::message::create));

    let hub_routes = Router::new().route("/grant", get(routes::hub::grant));

    let api = Router::new()
        .nest("/room", room_routes)
        .nest("/room/{room_id}/message", message_routes)
        .nest("/hub", hub_routes);

    let health = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api)
        .merge(health)
        .route("/ws", get(ws::handler::ws_upgrade))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
