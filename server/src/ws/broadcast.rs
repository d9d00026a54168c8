//! Room-scoped WebSocket fan-out.
//!
//! Serializes a server event once and pushes it to each member's outbound
//! channel without awaiting delivery. Fan-out is decoupled from handler
//! control flow: a slow client only backs up its own writer task.

use axum::extract::ws::Message;

use crate::chat::presence::RoomRegistry;
use crate::ws::protocol::ServerEvent;
use crate::ws::{ConnectionId, ConnectionSender};

/// Broadcast an event to every current member of a room, optionally
/// excluding one connection (the originator of a typing notice).
/// Broadcasting to an empty room is a no-op.
pub fn broadcast_to_room(
    registry: &RoomRegistry,
    room: &str,
    event: &ServerEvent,
    exclude: Option<ConnectionId>,
) {
    let text = match serde_json::to_string(event) {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!(error = %err, "Failed to encode server event");
            return;
        }
    };
    let msg = Message::Text(text.into());

    for (conn, sender) in registry.members_of(room) {
        if exclude == Some(conn) {
            continue;
        }
        // Fire and forget: a closed channel means the client is gone and
        // its actor cleans up presence on exit.
        let _ = sender.send(msg.clone());
    }
}

/// Send an event to a single connection.
pub fn send_to_connection(sender: &ConnectionSender, event: &ServerEvent) {
    if let Ok(text) = serde_json::to_string(event) {
        let _ = sender.send(Message::Text(text.into()));
    }
}
