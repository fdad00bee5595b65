use std::collections::{HashMap, HashSet};

use bson::{doc, oid::ObjectId, DateTime};
use mongodb::Database;
use mongodb::options::ReturnDocument;
use parley_config::UnreadSettings;
use parley_db::models::{Participant, UnreadCounter};
use tracing::debug;

use crate::dao::base::{BaseDao, DaoResult};

/// Sole writer of unread counters. Counters are created lazily, every
/// mutation is a single atomic update on one row, and increments are
/// debounced by a grace window so a user actively viewing the room
/// (signalled by the mark-read heartbeat) does not watch their own badge
/// climb.
pub struct UnreadEngine {
    counters: BaseDao<UnreadCounter>,
    participants: BaseDao<Participant>,
    settings: UnreadSettings,
}

/// True while a fresh `last_read_at` should suppress increments.
/// Deliberately a pure function of its inputs.
pub fn grace_active(now: DateTime, last_read_at: Option<DateTime>, window_secs: u64) -> bool {
    let Some(last_read_at) = last_read_at else {
        return false;
    };
    let elapsed_ms = now.timestamp_millis() - last_read_at.timestamp_millis();
    elapsed_ms < (window_secs as i64) * 1000
}

impl UnreadEngine {
    pub fn new(db: &Database, settings: UnreadSettings) -> Self {
        Self {
            counters: BaseDao::new(db, UnreadCounter::COLLECTION),
            participants: BaseDao::new(db, Participant::COLLECTION),
            settings,
        }
    }

    /// Bumps the counter unless the grace window is active. Returns the
    /// new count when an increment happened, `None` when it was skipped.
    ///
    /// The window guard is the filter of the atomic `$inc`, so two
    /// concurrent increments serialize on the counter row itself — no
    /// read-modify-write anywhere.
    pub async fn increment(
        &self,
        room_id: ObjectId,
        user_id: ObjectId,
    ) -> DaoResult<Option<i64>> {
        let now = DateTime::now();
        self.ensure_counter(room_id, user_id, now).await?;

        let cutoff = DateTime::from_millis(
            now.timestamp_millis() - (self.settings.grace_window_secs as i64) * 1000,
        );

        let updated = self
            .counters
            .collection()
            .find_one_and_update(
                doc! {
                    "room_id": room_id,
                    "user_id": user_id,
                    "$or": [
                        { "last_read_at": null },
                        { "last_read_at": { "$lte": cutoff } },
                    ],
                },
                doc! {
                    "$inc": { "count": 1 },
                    "$set": { "updated_at": now },
                },
            )
            .return_document(ReturnDocument::After)
            .await?;

        match updated {
            Some(counter) => Ok(Some(counter.count)),
            None => {
                debug!(?room_id, ?user_id, "Increment skipped, grace window active");
                Ok(None)
            }
        }
    }

    /// Zeroes the counter and re-arms the grace window. Doubles as the
    /// "I'm reading this" heartbeat, so it is unconditional and upserts.
    pub async fn mark_read(&self, room_id: ObjectId, user_id: ObjectId) -> DaoResult<()> {
        let now = DateTime::now();
        self.counters
            .collection()
            .update_one(
                doc! { "room_id": room_id, "user_id": user_id },
                doc! {
                    "$set": {
                        "count": 0_i64,
                        "last_read_at": now,
                        "updated_at": now,
                    },
                    "$setOnInsert": {
                        "created_at": now,
                    },
                },
            )
            .upsert(true)
            .await?;
        Ok(())
    }

    /// Per-room unread totals for the user's active participations,
    /// summed defensively in case a room ever grows more than one
    /// counter row.
    pub async fn aggregate_for_user(
        &self,
        user_id: ObjectId,
    ) -> DaoResult<HashMap<ObjectId, i64>> {
        let participations = self
            .participants
            .find_many(doc! { "user_id": user_id, "deleted_at": null }, None)
            .await?;
        let active_rooms: HashSet<ObjectId> =
            participations.into_iter().map(|p| p.room_id).collect();

        let counters = self
            .counters
            .find_many(doc! { "user_id": user_id }, None)
            .await?;

        let mut totals = HashMap::new();
        for counter in counters {
            if active_rooms.contains(&counter.room_id) {
                *totals.entry(counter.room_id).or_insert(0) += counter.count.max(0);
            }
        }
        Ok(totals)
    }

    /// Lazily creates the counter row with a zero count and no
    /// `last_read_at`, leaving existing rows untouched.
    async fn ensure_counter(
        &self,
        room_id: ObjectId,
        user_id: ObjectId,
        now: DateTime,
    ) -> DaoResult<()> {
        self.counters
            .collection()
            .update_one(
                doc! { "room_id": room_id, "user_id": user_id },
                doc! {
                    "$setOnInsert": {
                        "count": 0_i64,
                        "last_read_at": null,
                        "created_at": now,
                        "updated_at": now,
                    },
                },
            )
            .upsert(true)
            .await?;
        Ok(())
    }
}
