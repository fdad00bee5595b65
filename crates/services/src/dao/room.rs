use bson::{doc, oid::ObjectId, DateTime};
use mongodb::Database;
use parley_db::models::{Participant, ParticipantRole, Room, RoomKind};
use tracing::debug;

use super::base::{BaseDao, DaoError, DaoResult};

/// Durable record of rooms, their participants, and each participant's
/// soft-delete state. Membership reversal happens in exactly one place:
/// [`RoomDao::restore_all_deleted`].
pub struct RoomDao {
    pub base: BaseDao<Room>,
    pub participants: BaseDao<Participant>,
}

impl RoomDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Room::COLLECTION),
            participants: BaseDao::new(db, Participant::COLLECTION),
        }
    }

    pub async fn create(
        &self,
        name: String,
        kind: RoomKind,
        subject_ref: Option<String>,
        creator_id: ObjectId,
    ) -> DaoResult<Room> {
        let now = DateTime::now();
        let room = Room {
            id: None,
            name,
            kind,
            subject_ref,
            creator_id,
            created_at: now,
            updated_at: now,
        };

        let room_id = self.base.insert_one(&room).await?;

        // Creator becomes the room admin
        self.add_participant(room_id, creator_id, ParticipantRole::Admin)
            .await?;

        self.base.find_by_id(room_id).await
    }

    pub async fn find_by_id(&self, room_id: ObjectId) -> DaoResult<Room> {
        self.base.find_by_id(room_id).await
    }

    pub async fn find_membership(
        &self,
        room_id: ObjectId,
        user_id: ObjectId,
    ) -> DaoResult<Option<Participant>> {
        self.participants
            .find_one(doc! { "room_id": room_id, "user_id": user_id })
            .await
    }

    /// Adds a user to a room. An already-active membership is a conflict;
    /// a soft-deleted one is revived in place so the (room, user) row
    /// stays unique no matter how often the user joins and leaves.
    pub async fn add_participant(
        &self,
        room_id: ObjectId,
        user_id: ObjectId,
        role: ParticipantRole,
    ) -> DaoResult<Participant> {
        if let Some(existing) = self.find_membership(room_id, user_id).await? {
            if existing.is_active() {
                return Err(DaoError::DuplicateKey(
                    "already an active participant".to_string(),
                ));
            }
            self.participants
                .update_one(
                    doc! { "room_id": room_id, "user_id": user_id },
                    doc! { "$set": { "deleted_at": null } },
                )
                .await?;
            return self
                .find_membership(room_id, user_id)
                .await?
                .ok_or(DaoError::NotFound);
        }

        let now = DateTime::now();
        let participant = Participant {
            id: None,
            room_id,
            user_id,
            role,
            joined_at: now,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };

        let id = self.participants.insert_one(&participant).await?;
        self.participants.find_by_id(id).await
    }

    /// Soft-deletes a membership. Leaving twice is a no-op, not an error.
    pub async fn soft_delete_participant(
        &self,
        room_id: ObjectId,
        user_id: ObjectId,
    ) -> DaoResult<bool> {
        self.participants
            .update_one(
                doc! { "room_id": room_id, "user_id": user_id, "deleted_at": null },
                doc! { "$set": { "deleted_at": DateTime::now() } },
            )
            .await
    }

    /// Clears `deleted_at` on every departed participant of the room and
    /// returns their user ids so the caller can notify them. This is the
    /// single place soft-delete reversal happens.
    pub async fn restore_all_deleted(&self, room_id: ObjectId) -> DaoResult<Vec<ObjectId>> {
        let departed = self
            .participants
            .find_many(
                doc! { "room_id": room_id, "deleted_at": { "$ne": null } },
                None,
            )
            .await?;

        if departed.is_empty() {
            return Ok(Vec::new());
        }

        let restored = self
            .participants
            .update_many(
                doc! { "room_id": room_id, "deleted_at": { "$ne": null } },
                doc! { "$set": { "deleted_at": null } },
            )
            .await?;
        debug!(?room_id, restored, "Restored departed participants");

        Ok(departed.into_iter().map(|p| p.user_id).collect())
    }

    /// Active participants of a room, in join order.
    pub async fn list_participants(&self, room_id: ObjectId) -> DaoResult<Vec<Participant>> {
        self.participants
            .find_many(
                doc! { "room_id": room_id, "deleted_at": null },
                Some(doc! { "joined_at": 1 }),
            )
            .await
    }

    pub async fn active_user_ids(&self, room_id: ObjectId) -> DaoResult<Vec<ObjectId>> {
        let participants = self.list_participants(room_id).await?;
        Ok(participants.into_iter().map(|p| p.user_id).collect())
    }

    /// Rooms where the user holds an active membership.
    pub async fn find_member_rooms(&self, user_id: ObjectId) -> DaoResult<Vec<Room>> {
        let memberships = self
            .participants
            .find_many(doc! { "user_id": user_id, "deleted_at": null }, None)
            .await?;

        let room_ids: Vec<ObjectId> = memberships.iter().map(|m| m.room_id).collect();
        if room_ids.is_empty() {
            return Ok(Vec::new());
        }

        self.base
            .find_many(
                doc! { "_id": { "$in": room_ids } },
                Some(doc! { "created_at": 1 }),
            )
            .await
    }

    pub async fn find_open_rooms(&self) -> DaoResult<Vec<Room>> {
        self.base
            .find_many(
                doc! { "kind": bson::to_bson(&RoomKind::Open)? },
                Some(doc! { "created_at": 1 }),
            )
            .await
    }
}
