use axum::{Json, extract::{Path, State}};
use bson::oid::ObjectId;
use parley_db::models::{Participant, ParticipantRole, Room, RoomKind};
use parley_services::hub::{EventKind, HubEvent, RoomEvent, Topic};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{error::ApiError, extractors::auth::AuthUser, state::AppState};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateRoomRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default)]
    pub kind: RoomKind,
    pub subject_ref: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RoomResponse {
    pub id: String,
    pub name: String,
    pub kind: RoomKind,
    pub subject_ref: Option<String>,
    pub unread_count: i64,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct ParticipantResponse {
    pub user_id: String,
    pub role: ParticipantRole,
    pub joined_at: String,
}

/// Rooms visible to the caller, each annotated with their unread count.
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<RoomResponse>>, ApiError> {
    let rooms = state.access.rooms_visible_to(auth.user_id).await?;
    let unread = state.unread.aggregate_for_user(auth.user_id).await?;

    let response = rooms
        .into_iter()
        .map(|room| {
            let count = room
                .id
                .and_then(|id| unread.get(&id).copied())
                .unwrap_or(0);
            to_response(room, count)
        })
        .collect();

    Ok(Json(response))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateRoomRequest>,
) -> Result<Json<RoomResponse>, ApiError> {
    body.validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let room = state
        .rooms
        .create(body.name, body.kind, body.subject_ref, auth.user_id)
        .await?;

    // The creator's room list updates without polling
    state.hub.publish(HubEvent {
        topic: Topic::UserRooms(auth.user_id),
        kind: EventKind::RoomJoined(RoomEvent::with_room(&room, auth.user_id)),
    });

    Ok(Json(to_response(room, 0)))
}

pub async fn join(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(room_id): Path<String>,
) -> Result<Json<ParticipantResponse>, ApiError> {
    let rid = parse_oid(&room_id)?;
    let room = state.rooms.find_by_id(rid).await?;

    let participant = state
        .rooms
        .add_participant(rid, auth.user_id, ParticipantRole::Member)
        .await?;

    state.hub.publish(HubEvent {
        topic: Topic::UserRooms(auth.user_id),
        kind: EventKind::RoomJoined(RoomEvent::with_room(&room, auth.user_id)),
    });

    Ok(Json(to_participant_response(participant)))
}

/// Idempotent: leaving a room you already left (or never joined) is not
/// an error.
pub async fn leave(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(room_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let rid = parse_oid(&room_id)?;
    let left = state
        .rooms
        .soft_delete_participant(rid, auth.user_id)
        .await?;

    Ok(Json(serde_json::json!({ "left": left })))
}

pub async fn members(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(room_id): Path<String>,
) -> Result<Json<Vec<ParticipantResponse>>, ApiError> {
    let rid = parse_oid(&room_id)?;

    if !state.access.can_read(auth.user_id, rid).await? {
        return Err(ApiError::Forbidden("Not a participant".to_string()));
    }

    let participants = state.rooms.list_participants(rid).await?;
    Ok(Json(
        participants
            .into_iter()
            .map(to_participant_response)
            .collect(),
    ))
}

pub(crate) fn parse_oid(id: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(id).map_err(|_| ApiError::BadRequest("Invalid room_id".to_string()))
}

fn to_response(room: Room, unread_count: i64) -> RoomResponse {
    RoomResponse {
        id: room.id.map(|id| id.to_hex()).unwrap_or_default(),
        name: room.name,
        kind: room.kind,
        subject_ref: room.subject_ref,
        unread_count,
        created_at: room.created_at.try_to_rfc3339_string().unwrap_or_default(),
    }
}

fn to_participant_response(p: Participant) -> ParticipantResponse {
    ParticipantResponse {
        user_id: p.user_id.to_hex(),
        role: p.role,
        joined_at: p.joined_at.try_to_rfc3339_string().unwrap_or_default(),
    }
}
