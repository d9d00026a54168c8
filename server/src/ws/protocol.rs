//! JSON wire protocol for the chat WebSocket.
//!
//! Frames are shaped `{"event": <name>, "data": {...}}` in both
//! directions. Inbound decoding is lenient: a missing room defaults to
//! "general" and other absent fields fall back to defaults rather than
//! erroring. Only a frame that cannot be decoded at all is answered with
//! an error event.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::chat::router::ChatRouter;
use crate::ws::broadcast::send_to_connection;
use crate::ws::{ConnectionId, ConnectionSender};

/// Room assumed when a payload does not name one.
pub const DEFAULT_ROOM: &str = "general";

fn default_room() -> String {
    DEFAULT_ROOM.to_string()
}

fn default_username() -> String {
    "User".to_string()
}

/// Inbound frame: event name plus an optional payload object.
#[derive(Debug, Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct RoomPayload {
    #[serde(default = "default_room")]
    room: String,
}

impl Default for RoomPayload {
    fn default() -> Self {
        Self {
            room: default_room(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct MessagePayload {
    #[serde(default = "default_room")]
    room: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    user_id: Option<i64>,
}

impl Default for MessagePayload {
    fn default() -> Self {
        Self {
            room: default_room(),
            message: String::new(),
            user_id: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TypingPayload {
    #[serde(default = "default_room")]
    room: String,
    #[serde(default = "default_username")]
    username: String,
}

impl Default for TypingPayload {
    fn default() -> Self {
        Self {
            room: default_room(),
            username: default_username(),
        }
    }
}

/// Outbound events broadcast to room members or sent to a single client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    UserJoined {
        message: String,
    },
    UserLeft {
        message: String,
    },
    NewMessage {
        user_id: i64,
        username: String,
        profile_image: String,
        message: String,
        timestamp: String,
        room: String,
    },
    UserTyping {
        username: String,
    },
    Error {
        message: String,
    },
}

/// Handle one inbound text frame: decode the envelope, dispatch by event
/// name. The connection stays open whatever the frame contained.
pub async fn handle_text_frame(
    text: &str,
    conn: ConnectionId,
    tx: &ConnectionSender,
    router: &ChatRouter,
) {
    let envelope: Envelope = match serde_json::from_str(text) {
        Ok(env) => env,
        Err(err) => {
            tracing::warn!(
                connection = %conn,
                error = %err,
                "Failed to decode event frame"
            );
            send_error(tx, "Invalid event frame");
            return;
        }
    };

    match envelope.event.as_str() {
        "join" => match parse_payload::<RoomPayload>(envelope.data) {
            Ok(payload) => router.handle_join(conn, tx, &payload.room),
            Err(err) => {
                tracing::warn!(connection = %conn, error = %err, "Invalid join payload");
                send_error(tx, "Invalid join payload");
            }
        },
        "leave" => match parse_payload::<RoomPayload>(envelope.data) {
            Ok(payload) => router.handle_leave(conn, &payload.room),
            Err(err) => {
                tracing::warn!(connection = %conn, error = %err, "Invalid leave payload");
                send_error(tx, "Invalid leave payload");
            }
        },
        "send_message" => match parse_payload::<MessagePayload>(envelope.data) {
            Ok(payload) => match payload.user_id {
                Some(user_id) => {
                    router
                        .handle_message(&payload.room, user_id, payload.message)
                        .await;
                }
                None => {
                    tracing::warn!(connection = %conn, "send_message without user_id");
                    send_error(tx, "send_message requires user_id");
                }
            },
            Err(err) => {
                tracing::warn!(connection = %conn, error = %err, "Invalid send_message payload");
                send_error(tx, "Invalid send_message payload");
            }
        },
        "typing" => match parse_payload::<TypingPayload>(envelope.data) {
            Ok(payload) => router.handle_typing(conn, &payload.room, &payload.username),
            Err(err) => {
                tracing::warn!(connection = %conn, error = %err, "Invalid typing payload");
                send_error(tx, "Invalid typing payload");
            }
        },
        other => {
            tracing::debug!(connection = %conn, event = other, "Unknown event type");
            send_error(tx, "Unknown event type");
        }
    }
}

/// Decode a payload object, treating an absent payload as all-defaults.
fn parse_payload<T: DeserializeOwned + Default>(
    data: serde_json::Value,
) -> Result<T, serde_json::Error> {
    if data.is_null() {
        Ok(T::default())
    } else {
        serde_json::from_value(data)
    }
}

/// Send an error event to a single connection.
fn send_error(tx: &ConnectionSender, message: &str) {
    send_to_connection(
        tx,
        &ServerEvent::Error {
            message: message.to_string(),
        },
    );
}
