use rusqlite_migration::{Migrations, M};

/// Define all schema migrations.
/// Uses SQLite user_version pragma for tracking; no migration table needed.
pub fn migrations() -> Migrations<'static> {
    Migrations::new(vec![M::up(
        "-- Migration 1: Initial schema

-- Users are owned by the wider platform; the chat service only reads
-- display data from this table and seeds it in tests.
CREATE TABLE users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT UNIQUE NOT NULL,
    phone TEXT,
    role TEXT DEFAULT 'farmer',
    language TEXT DEFAULT 'en',
    location TEXT,
    profile_image TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Append-only chat log. Rows are never updated or deleted.
-- sender_id references a user owned by the wider platform; deliberately
-- not a FOREIGN KEY so a message from an unknown sender still persists.
CREATE TABLE chat_messages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    sender_id INTEGER NOT NULL,
    message TEXT NOT NULL,
    room TEXT NOT NULL DEFAULT 'general',
    language TEXT NOT NULL DEFAULT 'en',
    image TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_chat_messages_room ON chat_messages(room, id);
",
    )])
}
