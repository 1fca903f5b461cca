//! Room state-machine errors

use super::entities::RoomStatus;
use thiserror::Error;

/// Errors raised by room lifecycle transitions.
///
/// Every variant is rejected synchronously and leaves the room unchanged;
/// `WrongState` carries the current status so the caller can resynchronize.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoomError {
    #[error("room is full ({max} participants)")]
    Full { max: usize },

    #[error("operation requires status {expected}, room is {current}")]
    WrongState {
        expected: RoomStatus,
        current: RoomStatus,
    },

    #[error("participant {0} is not in the room")]
    UnknownParticipant(String),

    #[error("participant {0} already submitted a profile")]
    AlreadyReady(String),

    #[error("only the first-joined participant may start the discussion")]
    NotAuthorizer,
}
