use axum::{Json, extract::{Path, State}};

use crate::{error::ApiError, extractors::auth::AuthUser, state::AppState};

use super::room::parse_oid;

/// Mark-read / heartbeat. An open room view calls this on a cadence of
/// `unread.heartbeat_interval_secs`; each call zeroes the counter and
/// re-arms the grace window.
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(room_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let rid = parse_oid(&room_id)?;

    if !state.access.can_read(auth.user_id, rid).await? {
        return Err(ApiError::Forbidden("Not a participant".to_string()));
    }

    state.unread.mark_read(rid, auth.user_id).await?;

    Ok(Json(serde_json::json!({ "read": true })))
}
