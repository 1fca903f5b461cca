//! File-backed room store
//!
//! Shared-store alternative to [`super::memory::InMemoryRoomStore`]: each
//! room is one JSON document under a directory, so several processes (or a
//! restarted one) can coordinate on the same sessions. Serialization
//! mirrors the in-memory state exactly; the trait is the contract, the
//! backing medium is an implementation detail.

use async_trait::async_trait;
use council_domain::{InviteCode, Room, RoomStore, util::now_ms};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::warn;

/// Room store writing one `<code>.json` per room.
pub struct JsonFileRoomStore {
    dir: PathBuf,
    // Serializes directory-level read-modify-write cycles
    io: Mutex<()>,
}

impl JsonFileRoomStore {
    /// Open (creating if needed) a store rooted at `dir`.
    pub fn open(dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            io: Mutex::new(()),
        })
    }

    fn path_for(&self, code: &InviteCode) -> PathBuf {
        self.dir.join(format!("{}.json", code))
    }

    fn read_room(path: &Path) -> Option<Room> {
        let bytes = std::fs::read(path).ok()?;
        match serde_json::from_slice(&bytes) {
            Ok(room) => Some(room),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable room document");
                None
            }
        }
    }
}

#[async_trait]
impl RoomStore for JsonFileRoomStore {
    async fn get(&self, code: &InviteCode) -> Option<Room> {
        let _io = self.io.lock().await;
        Self::read_room(&self.path_for(code))
    }

    async fn put(&self, room: Room) {
        let _io = self.io.lock().await;
        let path = self.path_for(room.invite_code());
        match serde_json::to_vec_pretty(&room) {
            Ok(bytes) => {
                if let Err(e) = std::fs::write(&path, bytes) {
                    warn!(path = %path.display(), error = %e, "could not persist room");
                }
            }
            Err(e) => warn!(error = %e, "could not serialize room"),
        }
    }

    async fn delete(&self, code: &InviteCode) -> bool {
        let _io = self.io.lock().await;
        std::fs::remove_file(self.path_for(code)).is_ok()
    }

    async fn sweep_idle(&self, ttl_ms: u64) -> usize {
        let _io = self.io.lock().await;
        let now = now_ms();
        let mut evicted = 0;

        let Ok(entries) = std::fs::read_dir(&self.dir) else {
            return 0;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            let stale = match Self::read_room(&path) {
                Some(room) => room.idle_ms(now) > ttl_ms,
                // Unreadable documents are garbage either way
                None => true,
            };
            if stale && std::fs::remove_file(&path).is_ok() {
                evicted += 1;
            }
        }
        evicted
    }
}
