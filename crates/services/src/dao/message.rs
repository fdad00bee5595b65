use bson::{doc, oid::ObjectId, DateTime};
use mongodb::Database;
use parley_db::models::Message;

use super::base::{BaseDao, DaoResult, PaginatedResult, PaginationParams};

pub struct MessageDao {
    pub base: BaseDao<Message>,
}

impl MessageDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Message::COLLECTION),
        }
    }

    pub async fn create(
        &self,
        room_id: ObjectId,
        author_id: ObjectId,
        content: String,
    ) -> DaoResult<Message> {
        let message = Message {
            id: None,
            room_id,
            author_id,
            content,
            created_at: DateTime::now(),
        };

        let id = self.base.insert_one(&message).await?;
        self.base.find_by_id(id).await
    }

    /// Newest-first history page. The `total` in the result is what
    /// clients compare against their loaded count for "has more".
    pub async fn find_in_room(
        &self,
        room_id: ObjectId,
        params: &PaginationParams,
    ) -> DaoResult<PaginatedResult<Message>> {
        self.base
            .find_paginated(
                doc! { "room_id": room_id },
                Some(doc! { "created_at": -1, "_id": -1 }),
                params,
            )
            .await
    }
}
