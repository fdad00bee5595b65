use bson::oid::ObjectId;
use parley_db::models::{Message, Room};
use serde::{Deserialize, Serialize};

use super::topic::Topic;

/// An event addressed to a single topic. The serialized payload follows
/// the `{"type": ..., "data": ...}` envelope clients already speak.
#[derive(Debug, Clone)]
pub struct HubEvent {
    pub topic: Topic,
    pub kind: EventKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum EventKind {
    #[serde(rename = "message:create")]
    MessageCreated(MessageEvent),
    #[serde(rename = "room:joined")]
    RoomJoined(RoomEvent),
    #[serde(rename = "room:restored")]
    RoomRestored(RoomEvent),
    #[serde(rename = "unread:change")]
    UnreadChanged(UnreadDelta),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageEvent {
    pub id: String,
    pub room_id: String,
    pub author_id: String,
    pub content: String,
    pub created_at: String,
}

impl From<&Message> for MessageEvent {
    fn from(m: &Message) -> Self {
        Self {
            id: m.id.map(|id| id.to_hex()).unwrap_or_default(),
            room_id: m.room_id.to_hex(),
            author_id: m.author_id.to_hex(),
            content: m.content.clone(),
            created_at: m.created_at.try_to_rfc3339_string().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomEvent {
    pub room_id: String,
    pub user_id: String,
    pub name: Option<String>,
}

impl RoomEvent {
    pub fn with_room(room: &Room, user_id: ObjectId) -> Self {
        Self {
            room_id: room.id.map(|id| id.to_hex()).unwrap_or_default(),
            user_id: user_id.to_hex(),
            name: Some(room.name.clone()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnreadDelta {
    pub room_id: String,
    pub user_id: String,
    pub unread_count: i64,
    pub timestamp: String,
}
