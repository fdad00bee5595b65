use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub kind: RoomKind,
    /// External reference to what the room is about (e.g. a marketplace
    /// listing id). Opaque to this service.
    pub subject_ref: Option<String>,
    pub creator_id: ObjectId,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

/// A room's kind fixes its default visibility: `Open` rooms are visible
/// to every authenticated user, the other kinds only to explicit
/// participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RoomKind {
    Direct,
    #[default]
    Group,
    Open,
}

impl Room {
    pub const COLLECTION: &'static str = "rooms";
}
