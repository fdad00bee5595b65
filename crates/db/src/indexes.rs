use mongodb::{Database, IndexModel, options::IndexOptions};
use tracing::info;

pub async fn ensure_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    // Rooms
    create_indexes(
        db,
        "rooms",
        vec![
            index(bson::doc! { "kind": 1 }),
            index(bson::doc! { "creator_id": 1 }),
        ],
    )
    .await?;

    // Participants — the uniqueness constraint the whole membership
    // lifecycle relies on: one row per (room, user), ever.
    create_indexes(
        db,
        "participants",
        vec![
            index_unique(bson::doc! { "room_id": 1, "user_id": 1 }),
            index(bson::doc! { "user_id": 1, "deleted_at": 1 }),
            index(bson::doc! { "room_id": 1, "deleted_at": 1 }),
        ],
    )
    .await?;

    // Messages
    create_indexes(
        db,
        "messages",
        vec![
            index(bson::doc! { "room_id": 1, "created_at": -1 }),
            index(bson::doc! { "author_id": 1, "created_at": -1 }),
        ],
    )
    .await?;

    // Unread counters — one row per (room, user); concurrent increments
    // serialize on this row.
    create_indexes(
        db,
        "unread_counters",
        vec![
            index_unique(bson::doc! { "room_id": 1, "user_id": 1 }),
            index(bson::doc! { "user_id": 1 }),
        ],
    )
    .await?;

    info!("MongoDB indexes ensured");
    Ok(())
}

async fn create_indexes(
    db: &Database,
    collection: &str,
    indexes: Vec<IndexModel>,
) -> Result<(), mongodb::error::Error> {
    db.collection::<bson::Document>(collection)
        .create_indexes(indexes)
        .await?;
    Ok(())
}

fn index(keys: bson::Document) -> IndexModel {
    IndexModel::builder().keys(keys).build()
}

fn index_unique(keys: bson::Document) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().unique(true).build())
        .build()
}
