use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// A user's membership record in a room. Unique per (room_id, user_id);
/// leaving sets `deleted_at` instead of removing the row so history and
/// unread state survive, and incoming messages can restore the member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub room_id: ObjectId,
    pub user_id: ObjectId,
    #[serde(default)]
    pub role: ParticipantRole,
    pub joined_at: DateTime,
    pub deleted_at: Option<DateTime>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantRole {
    Admin,
    #[default]
    Member,
}

impl Participant {
    pub const COLLECTION: &'static str = "participants";

    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}
