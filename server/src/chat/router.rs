//! Room broadcast router.
//!
//! Translates inbound client events into persistence calls and outbound
//! broadcasts. Each event is handled independently against the current
//! registry state; there is no cross-event state machine.

use chrono::Utc;

use crate::chat::presence::RoomRegistry;
use crate::chat::store::MessageStore;
use crate::directory::UserDirectory;
use crate::ws::broadcast::broadcast_to_room;
use crate::ws::protocol::ServerEvent;
use crate::ws::{ConnectionId, ConnectionSender};

/// Language tag recorded for messages whose payload carries none.
const DEFAULT_LANGUAGE: &str = "en";

/// Owns the presence registry, the persistence log, and the user
/// directory. Constructed once in main and shared via AppState.
pub struct ChatRouter {
    rooms: RoomRegistry,
    store: MessageStore,
    directory: UserDirectory,
}

impl ChatRouter {
    pub fn new(rooms: RoomRegistry, store: MessageStore, directory: UserDirectory) -> Self {
        Self {
            rooms,
            store,
            directory,
        }
    }

    /// Join: register membership, then announce to the whole room, the
    /// joining connection included.
    pub fn handle_join(&self, conn: ConnectionId, sender: &ConnectionSender, room: &str) {
        self.rooms.join(conn, sender.clone(), room);

        let event = ServerEvent::UserJoined {
            message: format!("User joined {room}"),
        };
        broadcast_to_room(&self.rooms, room, &event, None);
    }

    /// Leave: drop membership, then announce to the remaining members.
    pub fn handle_leave(&self, conn: ConnectionId, room: &str) {
        self.rooms.leave(conn, room);

        let event = ServerEvent::UserLeft {
            message: format!("User left {room}"),
        };
        broadcast_to_room(&self.rooms, room, &event, None);
    }

    /// Message: persist, resolve sender display data, then fan out.
    ///
    /// Persistence happens before the broadcast is sent, so a client that
    /// later queries history sees every message that was delivered. A
    /// storage failure is logged and the broadcast proceeds anyway.
    pub async fn handle_message(&self, room: &str, user_id: i64, body: String) {
        match self
            .store
            .append(user_id, &body, room, DEFAULT_LANGUAGE, None)
            .await
        {
            Ok(stored) => {
                tracing::debug!(message_id = stored.id, room = room, "Chat message persisted");
            }
            Err(err) => {
                tracing::warn!(error = %err, room = room, "Failed to persist chat message");
            }
        }

        let sender = self.directory.display_info(user_id).await;

        let event = ServerEvent::NewMessage {
            user_id,
            username: sender.name,
            profile_image: sender.profile_image,
            message: body,
            timestamp: Utc::now().to_rfc3339(),
            room: room.to_string(),
        };
        broadcast_to_room(&self.rooms, room, &event, None);
    }

    /// Typing notice: transient, never persisted, delivered to everyone in
    /// the room except the originator. Safe to drop under load.
    pub fn handle_typing(&self, conn: ConnectionId, room: &str, username: &str) {
        let event = ServerEvent::UserTyping {
            username: username.to_string(),
        };
        broadcast_to_room(&self.rooms, room, &event, Some(conn));
    }

    /// Drop all presence for a disconnected connection and return the
    /// rooms it left. Abrupt disconnects are silent: no user_left event.
    pub fn handle_disconnect(&self, conn: ConnectionId) -> Vec<String> {
        self.rooms.remove_connection(conn)
    }
}
