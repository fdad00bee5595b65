use axum::{Json, extract::{Path, Query, State}};
use parley_db::models::Message;
use parley_services::dao::base::PaginationParams;
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, extractors::auth::AuthUser, state::AppState};

use super::room::parse_oid;

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub id: String,
    pub room_id: String,
    pub author_id: String,
    pub content: String,
    pub created_at: String,
}

/// Paginated newest-first history. `total` lets the client recompute
/// "has more" after merging a page.
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(room_id): Path<String>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let rid = parse_oid(&room_id)?;

    if !state.access.can_read(auth.user_id, rid).await? {
        return Err(ApiError::Forbidden("Not a participant".to_string()));
    }

    let result = state.messages.find_in_room(rid, &params).await?;

    let items: Vec<MessageResponse> = result.items.into_iter().map(to_response).collect();

    Ok(Json(serde_json::json!({
        "items": items,
        "total": result.total,
        "page": result.page,
        "per_page": result.per_page,
        "total_pages": result.total_pages,
    })))
}

/// The send endpoint. Validation and authorization failures come back
/// synchronously; once the message is durable the request succeeds no
/// matter what happens to hub delivery.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(room_id): Path<String>,
    Json(body): Json<SendMessageRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let rid = parse_oid(&room_id)?;

    let message = state.chat.send(auth.user_id, rid, body.content).await?;

    Ok(Json(to_response(message)))
}

fn to_response(m: Message) -> MessageResponse {
    MessageResponse {
        id: m.id.map(|id| id.to_hex()).unwrap_or_default(),
        room_id: m.room_id.to_hex(),
        author_id: m.author_id.to_hex(),
        content: m.content,
        created_at: m.created_at.try_to_rfc3339_string().unwrap_or_default(),
    }
}
