//! The storage seam the room lifecycle is written against.
//!
//! Nightfall doesn't care where rooms live. It needs a keyed store with a
//! handful of lookups and, crucially, an atomic read-modify-write per room.
//! [`MemoryRoomStore`](crate::MemoryRoomStore) is the in-process
//! implementation; a database-backed store implements the same trait.
//!
//! # Atomic updates
//!
//! The `update_by_*` methods take a *mutator*: a closure that receives the
//! current room and either edits it or rejects the edit. The store runs the
//! mutator and writes the result back as one step, so no other caller can
//! observe or interleave with the intermediate state. Every precondition
//! that depends on the current room (is a round running? is this user
//! already on the roster?) belongs inside the mutator, not in a read made
//! beforehand.

use std::future::Future;

use nightfall_protocol::{Room, RoomCode, UserId, Username};

use crate::StoreError;

/// Outcome of an atomic update.
#[derive(Debug, Clone, PartialEq)]
pub enum Update<R> {
    /// The mutator accepted and the new value was written.
    Updated(Room),
    /// The mutator rejected the change. Nothing was written.
    Rejected(R),
    /// No room matched the key.
    Missing,
}

impl<R> Update<R> {
    /// Returns the written room, if any.
    pub fn updated(self) -> Option<Room> {
        match self {
            Self::Updated(room) => Some(room),
            Self::Rejected(_) | Self::Missing => None,
        }
    }
}

/// Keyed storage of [`Room`] values.
///
/// All methods are atomic with respect to a single room. Nothing is atomic
/// across rooms; callers that make several calls accept that other writers
/// may act in between.
///
/// Methods return `Send` futures so a store can be shared by tasks spawned
/// on a multi-threaded runtime.
pub trait RoomStore: Send + Sync + 'static {
    /// Looks up a room by its code.
    fn find_by_code(
        &self,
        code: &RoomCode,
    ) -> impl Future<Output = Result<Option<Room>, StoreError>> + Send;

    /// Looks up the room owned by `owner`.
    fn find_by_owner(
        &self,
        owner: &UserId,
    ) -> impl Future<Output = Result<Option<Room>, StoreError>> + Send;

    /// Looks up the room whose roster contains `user`.
    fn find_by_player_id(
        &self,
        user: &UserId,
    ) -> impl Future<Output = Result<Option<Room>, StoreError>> + Send;

    /// Looks up the room whose roster contains a player named `username`.
    fn find_by_player_username(
        &self,
        username: &Username,
    ) -> impl Future<Output = Result<Option<Room>, StoreError>> + Send;

    /// Stores a new room.
    ///
    /// # Errors
    /// [`StoreError::DuplicateCode`] if the code is taken,
    /// [`StoreError::DuplicateOwner`] if the owner already has a room.
    fn insert(
        &self,
        room: Room,
    ) -> impl Future<Output = Result<Room, StoreError>> + Send;

    /// Removes a room and returns it.
    fn delete_by_code(
        &self,
        code: &RoomCode,
    ) -> impl Future<Output = Result<Option<Room>, StoreError>> + Send;

    /// Atomically applies `mutator` to the room with this code.
    fn update_by_code<F, R>(
        &self,
        code: &RoomCode,
        mutator: F,
    ) -> impl Future<Output = Result<Update<R>, StoreError>> + Send
    where
        F: FnOnce(&mut Room) -> Result<(), R> + Send,
        R: Send;

    /// Atomically applies `mutator` to the room owned by `owner`.
    fn update_by_owner<F, R>(
        &self,
        owner: &UserId,
        mutator: F,
    ) -> impl Future<Output = Result<Update<R>, StoreError>> + Send
    where
        F: FnOnce(&mut Room) -> Result<(), R> + Send,
        R: Send;

    /// Atomically applies `mutator` to the room whose roster holds `user`.
    fn update_by_player_id<F, R>(
        &self,
        user: &UserId,
        mutator: F,
    ) -> impl Future<Output = Result<Update<R>, StoreError>> + Send
    where
        F: FnOnce(&mut Room) -> Result<(), R> + Send,
        R: Send;
}
