//! Room presence registry.
//!
//! In-memory mapping from room name to the set of current member
//! connections. State is process-local and transient: a restart drops all
//! presence, which is acceptable since presence is live-session state.

use dashmap::DashMap;
use std::collections::HashMap;

use crate::ws::{ConnectionId, ConnectionSender};

/// Tracks which connections currently belong to which rooms.
///
/// A room exists implicitly as its member set: it is created on first join
/// and removed once the last member leaves. A connection may belong to
/// several rooms at once; joining a room never clears prior memberships.
#[derive(Default)]
pub struct RoomRegistry {
    rooms: DashMap<String, HashMap<ConnectionId, ConnectionSender>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection to a room's member set. Idempotent per
    /// connection+room pair: re-joining replaces the stored sender.
    pub fn join(&self, conn: ConnectionId, sender: ConnectionSender, room: &str) {
        self.rooms
            .entry(room.to_string())
            .or_default()
            .insert(conn, sender);

        tracing::debug!(
            connection = %conn,
            room = room,
            members = self.member_count(room),
            "Connection joined room"
        );
    }

    /// Remove a connection from a room's member set. No-op if the
    /// connection is not a member. Empty rooms are dropped from the map.
    pub fn leave(&self, conn: ConnectionId, room: &str) {
        let mut remove_room = false;

        if let Some(mut members) = self.rooms.get_mut(room) {
            members.remove(&conn);
            if members.is_empty() {
                remove_room = true;
            }
        }

        if remove_room {
            self.rooms.remove(room);
            tracing::debug!(room = room, "Room is empty, removing it");
        }
    }

    /// Snapshot of the current members of a room. Consumed by the
    /// broadcast fan-out; not part of the external protocol surface.
    pub(crate) fn members_of(&self, room: &str) -> Vec<(ConnectionId, ConnectionSender)> {
        self.rooms
            .get(room)
            .map(|members| {
                members
                    .iter()
                    .map(|(id, sender)| (*id, sender.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Strip a connection from every room it occupies and return the names
    /// of the rooms it left. Called from the actor's disconnect path.
    pub fn remove_connection(&self, conn: ConnectionId) -> Vec<String> {
        let mut left = Vec::new();

        for entry in self.rooms.iter() {
            if entry.value().contains_key(&conn) {
                left.push(entry.key().clone());
            }
        }

        for room in &left {
            self.leave(conn, room);
        }

        left
    }

    /// Number of current members in a room.
    pub fn member_count(&self, room: &str) -> usize {
        self.rooms.get(room).map(|m| m.len()).unwrap_or(0)
    }
}
