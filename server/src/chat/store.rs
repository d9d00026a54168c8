//! Durable append-only store for chat messages.
//!
//! Persistence is independent of delivery: the router appends here before
//! broadcasting, so history queries never miss a message that was already
//! fanned out.

use thiserror::Error;

use crate::db::DbPool;

/// Errors surfaced by the persistence log. Never silent: the router
/// decides whether an append failure aborts or merely logs.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("storage task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("database lock poisoned")]
    LockPoisoned,
}

/// A successfully appended message: the assigned row id and the
/// database-side creation timestamp.
#[derive(Debug, Clone)]
pub struct StoredMessage {
    pub id: i64,
    pub created_at: String,
}

/// Append-only persistence log backed by the shared SQLite connection.
/// Rows are immutable once written; there is no update or delete path.
#[derive(Clone)]
pub struct MessageStore {
    db: DbPool,
}

impl MessageStore {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// Append one chat message and return its assigned id and timestamp.
    /// Runs the INSERT on a blocking thread so the async dispatcher is
    /// never parked on a storage round-trip.
    pub async fn append(
        &self,
        sender_id: i64,
        body: &str,
        room: &str,
        language: &str,
        image: Option<&str>,
    ) -> Result<StoredMessage, StorageError> {
        let db = self.db.clone();
        let body = body.to_string();
        let room = room.to_string();
        let language = language.to_string();
        let image = image.map(|s| s.to_string());

        tokio::task::spawn_blocking(move || {
            let conn = db.lock().map_err(|_| StorageError::LockPoisoned)?;

            conn.execute(
                "INSERT INTO chat_messages (sender_id, message, room, language, image)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![sender_id, body, room, language, image],
            )?;

            let id = conn.last_insert_rowid();
            let created_at: String = conn.query_row(
                "SELECT created_at FROM chat_messages WHERE id = ?1",
                rusqlite::params![id],
                |row| row.get(0),
            )?;

            Ok(StoredMessage { id, created_at })
        })
        .await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;
    use std::sync::{Arc, Mutex};

    fn test_db() -> DbPool {
        let mut conn = Connection::open_in_memory().expect("open in-memory db");
        crate::db::migrations::migrations()
            .to_latest(&mut conn)
            .expect("run migrations");
        Arc::new(Mutex::new(conn))
    }

    #[tokio::test]
    async fn append_assigns_monotonic_ids() {
        let store = MessageStore::new(test_db());

        let first = store
            .append(1, "first", "general", "en", None)
            .await
            .expect("append");
        let second = store
            .append(1, "second", "general", "en", None)
            .await
            .expect("append");

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert!(!first.created_at.is_empty());
    }

    #[tokio::test]
    async fn append_persists_all_fields() {
        let db = test_db();
        let store = MessageStore::new(db.clone());

        store
            .append(7, "wheat prices?", "crops", "hi", Some("uploads/crops/1.jpg"))
            .await
            .expect("append");

        let conn = db.lock().unwrap();
        let (sender_id, message, room, language, image): (i64, String, String, String, Option<String>) =
            conn.query_row(
                "SELECT sender_id, message, room, language, image FROM chat_messages WHERE id = 1",
                [],
                |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                    ))
                },
            )
            .expect("row exists");

        assert_eq!(sender_id, 7);
        assert_eq!(message, "wheat prices?");
        assert_eq!(room, "crops");
        assert_eq!(language, "hi");
        assert_eq!(image.as_deref(), Some("uploads/crops/1.jpg"));
    }
}
