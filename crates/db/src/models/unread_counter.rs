use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// One-to-one with a participant, created lazily on first increment or
/// first mark-read. `count` is only ever mutated by the unread engine,
/// through single atomic updates on this row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnreadCounter {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub room_id: ObjectId,
    pub user_id: ObjectId,
    #[serde(default)]
    pub count: i64,
    pub last_read_at: Option<DateTime>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl UnreadCounter {
    pub const COLLECTION: &'static str = "unread_counters";
}
