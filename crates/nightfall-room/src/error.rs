//! Error types for the room layer.

use std::fmt;

use nightfall_protocol::{ProtocolError, RoomCode, UserId, Username};
use nightfall_store::StoreError;

/// The lookup key that failed to find a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomKey {
    Code(RoomCode),
    Owner(UserId),
    Player(UserId),
}

impl fmt::Display for RoomKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(f, "code {code}"),
            Self::Owner(owner) => write!(f, "owner {owner}"),
            Self::Player(user) => write!(f, "player {user}"),
        }
    }
}

/// Coarse classification of a [`RoomError`], used by the request layer
/// to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller sent something malformed.
    InvalidInput,
    /// Duplicate owner, username, player or code.
    Conflict,
    /// Room, owner, player or role absent.
    NotFound,
    /// The room is in the wrong phase for this operation.
    InvalidState,
    /// A sub-operation of start/end game failed.
    DependentOperationFailed,
    /// Retries exhausted or the store could not be reached.
    Unavailable,
    /// The store refused a write the lifecycle should never produce.
    Internal,
}

/// Errors that can occur during room lifecycle operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The caller already owns a room.
    #[error("user {0} already owns a room")]
    OwnerAlreadyHasRoom(UserId),

    /// Some room already has a player with this username.
    #[error("username {0} is already taken")]
    UsernameTaken(Username),

    /// The user is already on some room's roster.
    #[error("user {0} is already in a room")]
    AlreadyInRoom(UserId),

    /// No room matches the key.
    #[error("room not found for {0}")]
    RoomNotFound(RoomKey),

    /// The user is neither a player nor an owner anywhere.
    #[error("user {0} is not in a room")]
    NotInRoom(UserId),

    /// The room is running a round, so nobody can join.
    #[error("game in progress in room {0}")]
    GameInProgress(RoomCode),

    /// `start_game` on a room that is already running a round.
    #[error("game already in progress in room {0}")]
    AlreadyInProgress(RoomCode),

    /// `end_game` on a room in the lobby.
    #[error("game is not in progress in room {0}")]
    NotInProgress(RoomCode),

    /// No role to report: the user's room is in the lobby, or the user
    /// owns a room without being on its roster.
    #[error("game has not started for user {0}")]
    GameNotStarted(UserId),

    /// The round settings are out of range.
    #[error(transparent)]
    InvalidSettings(ProtocolError),

    /// `start_game` could not add the owner to the roster. The new
    /// settings have already been written.
    #[error("error adding owner to room: {0}")]
    OwnerJoinFailed(#[source] Box<RoomError>),

    /// `end_game` could not remove the owner from the roster.
    #[error("error removing owner from room: {0}")]
    OwnerLeaveFailed(#[source] Box<RoomError>),

    /// Every generated room code collided with an existing room.
    #[error("no free room code after {attempts} attempts")]
    ExhaustedRetries { attempts: u32 },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RoomError {
    /// Classifies the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::OwnerAlreadyHasRoom(_)
            | Self::UsernameTaken(_)
            | Self::AlreadyInRoom(_) => ErrorKind::Conflict,
            Self::RoomNotFound(_) | Self::NotInRoom(_) | Self::GameNotStarted(_) => {
                ErrorKind::NotFound
            }
            Self::GameInProgress(_) | Self::AlreadyInProgress(_) | Self::NotInProgress(_) => {
                ErrorKind::InvalidState
            }
            Self::InvalidSettings(_) => ErrorKind::InvalidInput,
            Self::OwnerJoinFailed(_) | Self::OwnerLeaveFailed(_) => {
                ErrorKind::DependentOperationFailed
            }
            Self::ExhaustedRetries { .. } => ErrorKind::Unavailable,
            Self::Store(err) => match err {
                StoreError::DuplicateCode(_)
                | StoreError::DuplicateOwner(_)
                | StoreError::DuplicatePlayerId(..)
                | StoreError::DuplicateUsername(..) => ErrorKind::Conflict,
                StoreError::Unavailable(_) => ErrorKind::Unavailable,
                StoreError::ImmutableField(_) | StoreError::InvalidRoom(_) => ErrorKind::Internal,
            },
        }
    }

    /// For wrapped sub-operation failures, the error that caused them.
    pub fn inner(&self) -> Option<&RoomError> {
        match self {
            Self::OwnerJoinFailed(inner) | Self::OwnerLeaveFailed(inner) => Some(inner.as_ref()),
            _ => None,
        }
    }
}
