//! Room store trait
//!
//! An explicit get/put/delete abstraction over session storage. The
//! orchestration and service layers depend only on this trait, never on a
//! process-wide registry; implementations live in the infrastructure layer
//! (process memory by default, a shared external store alternatively).

use super::entities::Room;
use crate::core::invite::InviteCode;
use async_trait::async_trait;

/// Repository trait for rooms, keyed by invite code.
///
/// One room per invite code at a time. Implementations must make `get`/`put`
/// individually atomic; read-modify-write cycles are serialized per room by
/// the caller.
#[async_trait]
pub trait RoomStore: Send + Sync {
    /// Fetch the room currently registered under a code.
    async fn get(&self, code: &InviteCode) -> Option<Room>;

    /// Register or replace the room under its code.
    async fn put(&self, room: Room);

    /// Remove the room under a code, returning whether one existed.
    async fn delete(&self, code: &InviteCode) -> bool;

    /// Remove rooms idle longer than `ttl_ms`; returns how many were evicted.
    async fn sweep_idle(&self, ttl_ms: u64) -> usize;
}
