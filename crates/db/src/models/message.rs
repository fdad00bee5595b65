use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// Immutable once persisted. No edit or retraction fields on purpose.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub room_id: ObjectId,
    pub author_id: ObjectId,
    pub content: String,
    pub created_at: DateTime,
}

impl Message {
    pub const COLLECTION: &'static str = "messages";
}
