//! In-process [`RoomStore`] backed by hash maps.
//!
//! Rooms are stored by code, with three secondary indices kept in sync on
//! every write:
//!
//! - owner → code
//! - player user ID → code
//! - player username → code
//!
//! The indices double as unique constraints: a write that would put the
//! same owner, player ID or username under two different codes is refused.
//!
//! # Concurrency note
//!
//! All maps sit behind one `tokio::sync::Mutex`. That is coarser than the
//! per-room atomicity the trait asks for, which is fine: every operation
//! is a few map lookups and never awaits while holding the lock.

use std::collections::HashMap;

use nightfall_protocol::{Room, RoomCode, UserId, Username};
use tokio::sync::Mutex;

use crate::{RoomStore, StoreError, Update};

/// A [`RoomStore`] that keeps everything in memory for the life of the
/// process.
#[derive(Debug, Default)]
pub struct MemoryRoomStore {
    inner: Mutex<Rooms>,
}

impl MemoryRoomStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored rooms.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.by_code.len()
    }

    /// Returns `true` if no rooms are stored.
    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.by_code.is_empty()
    }
}

/// How an update locates its room.
#[derive(Clone, Copy)]
enum Key<'a> {
    Code(&'a RoomCode),
    Owner(&'a UserId),
    Player(&'a UserId),
}

#[derive(Debug, Default)]
struct Rooms {
    by_code: HashMap<RoomCode, Room>,
    owners: HashMap<UserId, RoomCode>,
    player_ids: HashMap<UserId, RoomCode>,
    usernames: HashMap<Username, RoomCode>,
}

impl Rooms {
    fn resolve(&self, key: Key<'_>) -> Option<RoomCode> {
        match key {
            Key::Code(code) => self.by_code.contains_key(code).then(|| code.clone()),
            Key::Owner(owner) => self.owners.get(owner).cloned(),
            Key::Player(user) => self.player_ids.get(user).cloned(),
        }
    }

    fn get(&self, key: Key<'_>) -> Option<Room> {
        let code = self.resolve(key)?;
        self.by_code.get(&code).cloned()
    }

    /// Refuses a roster whose members are already claimed by another room.
    fn check_roster(&self, room: &Room) -> Result<(), StoreError> {
        for player in &room.players {
            if let Some(other) = self.player_ids.get(&player.user_id) {
                if other != &room.code {
                    return Err(StoreError::DuplicatePlayerId(
                        player.user_id.clone(),
                        other.clone(),
                    ));
                }
            }
            if let Some(other) = self.usernames.get(&player.username) {
                if other != &room.code {
                    return Err(StoreError::DuplicateUsername(
                        player.username.clone(),
                        other.clone(),
                    ));
                }
            }
        }
        Ok(())
    }

    fn index_roster(&mut self, room: &Room) {
        for player in &room.players {
            self.player_ids
                .insert(player.user_id.clone(), room.code.clone());
            self.usernames
                .insert(player.username.clone(), room.code.clone());
        }
    }

    fn unindex_roster(&mut self, room: &Room) {
        for player in &room.players {
            self.player_ids.remove(&player.user_id);
            self.usernames.remove(&player.username);
        }
    }

    fn insert(&mut self, room: Room) -> Result<Room, StoreError> {
        if self.by_code.contains_key(&room.code) {
            return Err(StoreError::DuplicateCode(room.code));
        }
        if self.owners.contains_key(&room.owner_id) {
            return Err(StoreError::DuplicateOwner(room.owner_id));
        }
        room.check_invariants()?;
        self.check_roster(&room)?;

        self.owners.insert(room.owner_id.clone(), room.code.clone());
        self.index_roster(&room);
        self.by_code.insert(room.code.clone(), room.clone());
        Ok(room)
    }

    fn remove(&mut self, code: &RoomCode) -> Option<Room> {
        let room = self.by_code.remove(code)?;
        self.owners.remove(&room.owner_id);
        self.unindex_roster(&room);
        Some(room)
    }

    fn update<F, R>(&mut self, key: Key<'_>, mutator: F) -> Result<Update<R>, StoreError>
    where
        F: FnOnce(&mut Room) -> Result<(), R>,
    {
        let Some(current) = self.get(key) else {
            return Ok(Update::Missing);
        };

        // The mutator works on a copy so a rejection leaves nothing behind.
        let mut next = current.clone();
        if let Err(reason) = mutator(&mut next) {
            return Ok(Update::Rejected(reason));
        }

        if next.code != current.code
            || next.owner_id != current.owner_id
            || next.owner_username != current.owner_username
        {
            return Err(StoreError::ImmutableField(current.code));
        }
        next.check_invariants()?;
        self.check_roster(&next)?;

        self.unindex_roster(&current);
        self.index_roster(&next);
        self.by_code.insert(next.code.clone(), next.clone());
        Ok(Update::Updated(next))
    }

    fn find_username(&self, username: &Username) -> Option<Room> {
        let code = self.usernames.get(username)?;
        self.by_code.get(code).cloned()
    }
}

impl RoomStore for MemoryRoomStore {
    async fn find_by_code(&self, code: &RoomCode) -> Result<Option<Room>, StoreError> {
        Ok(self.inner.lock().await.get(Key::Code(code)))
    }

    async fn find_by_owner(&self, owner: &UserId) -> Result<Option<Room>, StoreError> {
        Ok(self.inner.lock().await.get(Key::Owner(owner)))
    }

    async fn find_by_player_id(&self, user: &UserId) -> Result<Option<Room>, StoreError> {
        Ok(self.inner.lock().await.get(Key::Player(user)))
    }

    async fn find_by_player_username(
        &self,
        username: &Username,
    ) -> Result<Option<Room>, StoreError> {
        Ok(self.inner.lock().await.find_username(username))
    }

    async fn insert(&self, room: Room) -> Result<Room, StoreError> {
        let room = self.inner.lock().await.insert(room)?;
        tracing::debug!(code = %room.code, owner_id = %room.owner_id, "room stored");
        Ok(room)
    }

    async fn delete_by_code(&self, code: &RoomCode) -> Result<Option<Room>, StoreError> {
        let removed = self.inner.lock().await.remove(code);
        if removed.is_some() {
            tracing::debug!(%code, "room removed");
        }
        Ok(removed)
    }

    async fn update_by_code<F, R>(
        &self,
        code: &RoomCode,
        mutator: F,
    ) -> Result<Update<R>, StoreError>
    where
        F: FnOnce(&mut Room) -> Result<(), R> + Send,
        R: Send,
    {
        self.inner.lock().await.update(Key::Code(code), mutator)
    }

    async fn update_by_owner<F, R>(
        &self,
        owner: &UserId,
        mutator: F,
    ) -> Result<Update<R>, StoreError>
    where
        F: FnOnce(&mut Room) -> Result<(), R> + Send,
        R: Send,
    {
        self.inner.lock().await.update(Key::Owner(owner), mutator)
    }

    async fn update_by_player_id<F, R>(
        &self,
        user: &UserId,
        mutator: F,
    ) -> Result<Update<R>, StoreError>
    where
        F: FnOnce(&mut Room) -> Result<(), R> + Send,
        R: Send,
    {
        self.inner.lock().await.update(Key::Player(user), mutator)
    }
}

// =========================================================================
// Tests
// =========================================================================
