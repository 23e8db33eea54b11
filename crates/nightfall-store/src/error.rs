//! Error types for the storage layer.

use nightfall_protocol::{ProtocolError, RoomCode, UserId, Username};

/// Errors a [`RoomStore`](crate::RoomStore) can report.
///
/// The `Duplicate*` variants come from the store's unique indices. Nothing
/// is written when one of them is returned.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Another room already uses this code.
    #[error("room code {0} is already in use")]
    DuplicateCode(RoomCode),

    /// The user already owns a room.
    #[error("user {0} already owns a room")]
    DuplicateOwner(UserId),

    /// The user is already on the roster of another room.
    #[error("user {0} is already a player in room {1}")]
    DuplicatePlayerId(UserId, RoomCode),

    /// The username is already on the roster of another room.
    #[error("username {0} is already taken in room {1}")]
    DuplicateUsername(Username, RoomCode),

    /// A mutator tried to change the room code or owner.
    #[error("room {0}: code and owner are immutable")]
    ImmutableField(RoomCode),

    /// The value to be written breaks a per-room invariant.
    #[error(transparent)]
    InvalidRoom(#[from] ProtocolError),

    /// The backing storage could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
