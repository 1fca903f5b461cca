//! In-process room store
//!
//! Process-memory implementation of [`RoomStore`]. Suitable for a single
//! node; a shared external store can replace it behind the same trait.

use async_trait::async_trait;
use council_domain::{InviteCode, Room, RoomStore, util::now_ms};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// Room store backed by a `HashMap` keyed on invite code.
#[derive(Default)]
pub struct InMemoryRoomStore {
    rooms: RwLock<HashMap<String, Room>>,
}

impl InMemoryRoomStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.rooms.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rooms.read().await.is_empty()
    }
}

#[async_trait]
impl RoomStore for InMemoryRoomStore {
    async fn get(&self, code: &InviteCode) -> Option<Room> {
        self.rooms.read().await.get(code.as_str()).cloned()
    }

    async fn put(&self, room: Room) {
        self.rooms
            .write()
            .await
            .insert(room.invite_code().as_str().to_string(), room);
    }

    async fn delete(&self, code: &InviteCode) -> bool {
        let removed = self.rooms.write().await.remove(code.as_str()).is_some();
        if removed {
            debug!(session = %code, "room deleted");
        }
        removed
    }

    async fn sweep_idle(&self, ttl_ms: u64) -> usize {
        let now = now_ms();
        let mut rooms = self.rooms.write().await;
        let before = rooms.len();
        rooms.retain(|_, room| room.idle_ms(now) <= ttl_ms);
        before - rooms.len()
    }
}
