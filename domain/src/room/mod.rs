//! Room (session) lifecycle and storage abstraction.

pub mod entities;
pub mod error;
pub mod store;

pub use entities::{Participant, Room, RoomStatus, RoomStatusSummary};
pub use error::RoomError;
pub use store::RoomStore;
