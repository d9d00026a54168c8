//! Read-only lookup of sender display data from the users table.
//!
//! The chat service does not own user records; it only resolves a name and
//! avatar at broadcast time, with a fixed fallback when the sender is
//! unknown.

use crate::db::DbPool;

/// Display name shown when the sender has no user record.
const FALLBACK_NAME: &str = "Anonymous";

/// Display data attached to a broadcast message.
#[derive(Debug, Clone)]
pub struct DisplayInfo {
    pub name: String,
    pub profile_image: String,
}

impl DisplayInfo {
    fn anonymous() -> Self {
        Self {
            name: FALLBACK_NAME.to_string(),
            profile_image: String::new(),
        }
    }
}

/// User directory backed by the shared SQLite connection.
#[derive(Clone)]
pub struct UserDirectory {
    db: DbPool,
}

impl UserDirectory {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// Resolve a sender's display name and avatar reference. A miss is
    /// non-fatal: unknown senders resolve to "Anonymous" with an empty
    /// avatar.
    pub async fn display_info(&self, user_id: i64) -> DisplayInfo {
        let db = self.db.clone();

        let info = tokio::task::spawn_blocking(move || {
            let conn = db.lock().ok()?;
            conn.query_row(
                "SELECT name, profile_image FROM users WHERE id = ?1",
                rusqlite::params![user_id],
                |row| {
                    Ok(DisplayInfo {
                        name: row.get(0)?,
                        profile_image: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    })
                },
            )
            .ok()
        })
        .await
        .ok()
        .flatten();

        match info {
            Some(info) => info,
            None => {
                tracing::debug!(user_id = user_id, "Sender not found, using fallback");
                DisplayInfo::anonymous()
            }
        }
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
    async fn resolves_known_user() {
        let db = test_db();
        {
            let conn = db.lock().unwrap();
            conn.execute(
                "INSERT INTO users (name, email, profile_image) VALUES (?1, ?2, ?3)",
                rusqlite::params!["Ravi", "ravi@example.com", "uploads/profiles/ravi.jpg"],
            )
            .unwrap();
        }

        let directory = UserDirectory::new(db);
        let info = directory.display_info(1).await;
        assert_eq!(info.name, "Ravi");
        assert_eq!(info.profile_image, "uploads/profiles/ravi.jpg");
    }

    #[tokio::test]
    async fn missing_user_falls_back_to_anonymous() {
        let directory = UserDirectory::new(test_db());
        let info = directory.display_info(999).await;
        assert_eq!(info.name, "Anonymous");
        assert_eq!(info.profile_image, "");
    }

    #[tokio::test]
    async fn null_profile_image_resolves_to_empty_string() {
        let db = test_db();
        {
            let conn = db.lock().unwrap();
            conn.execute(
                "INSERT INTO users (name, email) VALUES (?1, ?2)",
                rusqlite::params!["Meera", "meera@example.com"],
            )
            .unwrap();
        }

        let directory = UserDirectory::new(db);
        let info = directory.display_info(1).await;
        assert_eq!(info.name, "Meera");
        assert_eq!(info.profile_image, "");
    }
}
