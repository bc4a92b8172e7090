//! The live relay: volatile, in-process co-editing rooms.
//!
//! One room per share-id, holding the latest text blob and a broadcast
//! channel fanning updates out to every connected peer. Nothing here is
//! persisted or replicated; room state is lost on process restart.
//! Last write wins, delivered in receipt order.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

const ROOM_CHANNEL_CAPACITY: usize = 64;

/// Wire protocol of the live socket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum LiveMessage {
    /// Sent to a viewer on connect, carrying the current blob.
    Init { content: String },
    /// A full-content overwrite from one viewer, relayed to the others.
    ContentUpdate { content: String },
}

/// An update fanned out to room subscribers. Carries the connection id of
/// the writer so the relay never echoes an update back to its sender.
#[derive(Debug, Clone)]
pub struct LiveUpdate {
    pub from: Uuid,
    pub content: String,
}

struct Room {
    content: RwLock<String>,
    tx: broadcast::Sender<LiveUpdate>,
}

impl Room {
    fn new() -> Self {
        let (tx, _) = broadcast::channel(ROOM_CHANNEL_CAPACITY);
        Self {
            content: RwLock::new(String::new()),
            tx,
        }
    }
}

/// Keyed map of live rooms, owned by the relay for the process lifetime.
#[derive(Default)]
pub struct LiveHub {
    rooms: RwLock<HashMap<String, Arc<Room>>>,
}

impl LiveHub {
    pub fn new() -> Self {
        Self::default()
    }

    fn room(&self, key: &str) -> Arc<Room> {
        if let Some(room) = self.rooms.read().get(key) {
            return room.clone();
        }
        let mut rooms = self.rooms.write();
        rooms
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Room::new()))
            .clone()
    }

    /// Join a room: returns the current blob (empty if none yet) and a
    /// subscription for subsequent updates.
    pub fn join(&self, key: &str) -> (String, broadcast::Receiver<LiveUpdate>) {
        let room = self.room(key);
        let snapshot = room.content.read().clone();
        (snapshot, room.tx.subscribe())
    }

    /// Overwrite the room blob and relay the update to all subscribers.
    pub fn publish(&self, key: &str, from: Uuid, content: String) {
        let room = self.room(key);
        *room.content.write() = content.clone();
        // No subscribers is fine; the blob is still updated.
        let _ = room.tx.send(LiveUpdate { from, content });
    }

    /// Drop a room once its last subscriber is gone, so the map stays
    /// bounded on a long-lived process. A room with live receivers is
    /// kept; its blob survives until the final peer disconnects.
    pub fn prune(&self, key: &str) {
        let mut rooms = self.rooms.write();
        if let Some(room) = rooms.get(key)
            && room.tx.receiver_count() == 0
        {
            rooms.remove(key);
        }
    }

    /// Current blob for a room, empty if the room has never seen a write.
    pub fn snapshot(&self, key: &str) -> String {
        self.rooms
            .read()
            .get(key)
            .map(|room| room.content.read().clone())
            .unwrap_or_default()
    }
}
