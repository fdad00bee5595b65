use axum::{Json, extract::State};

use crate::{error::ApiError, extractors::auth::AuthUser, state::AppState};

/// The topics the caller may subscribe to, for the identity service to
/// sign into a capability token. The engine decides entitlement; it
/// never issues tokens itself.
pub async fn grant(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let topics: Vec<String> = state
        .access
        .entitled_topics(auth.user_id)
        .await?
        .into_iter()
        .map(|t| t.to_string())
        .collect();

    Ok(Json(serde_json::json!({
        "topics": topics,
        "heartbeat_interval_secs": state.settings.unread.heartbeat_interval_secs,
    })))
}
