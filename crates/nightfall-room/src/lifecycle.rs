//! The room lifecycle: creating rooms, moving players in and out, and
//! running rounds.
//!
//! A room is either in the **Lobby** (`in_progress == false`) or
//! **Active**. Players can only join in the Lobby; leaving and deleting are
//! allowed in both phases.
//!
//! ```text
//!   create_room ──▶ Lobby ──start_game──▶ Active
//!                    ▲                      │
//!                    └──────end_game────────┘
//!   delete_room from either phase
//! ```
//!
//! Every check that depends on the current room runs inside the store's
//! atomic update, so two concurrent calls can never both pass a guard that
//! only one of them should. The reads done beforehand only exist to report
//! the most specific error.

use nightfall_protocol::{Player, Role, Room, RoomCode, Settings, UserId, Username};
use nightfall_store::{RoomStore, StoreError, Update};

use crate::{AlphanumericCodes, CodeGenerator, LifecycleConfig, RoleAssigner, RoomError, RoomKey};

/// Drives rooms through their lifecycle on top of a [`RoomStore`].
///
/// Cheap to share: wrap it in an `Arc` and hand clones to every request
/// task.
pub struct RoomLifecycle<S, C = AlphanumericCodes> {
    store: S,
    codes: C,
    config: LifecycleConfig,
}

impl<S: RoomStore> RoomLifecycle<S> {
    /// Creates a lifecycle with the default configuration.
    pub fn new(store: S) -> Self {
        Self::with_config(store, LifecycleConfig::default())
    }

    /// Creates a lifecycle with a custom configuration.
    pub fn with_config(store: S, config: LifecycleConfig) -> Self {
        Self::with_generator(store, AlphanumericCodes, config)
    }
}

impl<S: RoomStore, C: CodeGenerator> RoomLifecycle<S, C> {
    /// Creates a lifecycle that draws room codes from `codes`.
    pub fn with_generator(store: S, codes: C, config: LifecycleConfig) -> Self {
        Self {
            store,
            codes,
            config,
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    /// Creates a room owned by `owner_id`, with the configured default
    /// settings and an empty roster.
    ///
    /// # Errors
    /// - [`RoomError::OwnerAlreadyHasRoom`] if the owner already has a room.
    /// - [`RoomError::ExhaustedRetries`] if every generated code collided.
    pub async fn create_room(
        &self,
        owner_id: &UserId,
        owner_username: &Username,
    ) -> Result<Room, RoomError> {
        if self.store.find_by_owner(owner_id).await?.is_some() {
            return Err(RoomError::OwnerAlreadyHasRoom(owner_id.clone()));
        }

        let attempts = self.config.max_code_attempts.max(1);
        for attempt in 1..=attempts {
            let code = self.codes.generate();
            let mut room = Room::new(code, owner_id.clone(), owner_username.clone());
            room.settings = self.config.default_settings;

            match self.store.insert(room).await {
                Ok(room) => {
                    tracing::info!(code = %room.code, owner_id = %owner_id, "room created");
                    return Ok(room);
                }
                Err(StoreError::DuplicateCode(code)) => {
                    tracing::debug!(%code, attempt, "room code collision, retrying");
                }
                Err(StoreError::DuplicateOwner(owner)) => {
                    return Err(RoomError::OwnerAlreadyHasRoom(owner));
                }
                Err(err) => return Err(err.into()),
            }
        }

        tracing::warn!(owner_id = %owner_id, attempts, "no free room code");
        Err(RoomError::ExhaustedRetries { attempts })
    }

    /// Returns the owner of the room with this code.
    pub async fn get_owner(&self, code: &RoomCode) -> Result<UserId, RoomError> {
        Ok(self.room_by_code(code).await?.owner_id)
    }

    /// Returns the ids on the room's roster, in roster order.
    pub async fn get_players(&self, code: &RoomCode) -> Result<Vec<UserId>, RoomError> {
        Ok(self.room_by_code(code).await?.player_ids())
    }

    /// Returns the room owned by `owner_id`.
    pub async fn get_owned_room(&self, owner_id: &UserId) -> Result<Room, RoomError> {
        self.store
            .find_by_owner(owner_id)
            .await?
            .ok_or_else(|| RoomError::RoomNotFound(RoomKey::Owner(owner_id.clone())))
    }

    /// Deletes the room with this code and returns it. Allowed in either
    /// phase.
    pub async fn delete_room(&self, code: &RoomCode) -> Result<Room, RoomError> {
        let room = self
            .store
            .delete_by_code(code)
            .await?
            .ok_or_else(|| RoomError::RoomNotFound(RoomKey::Code(code.clone())))?;
        tracing::info!(%code, players = room.players.len(), "room deleted");
        Ok(room)
    }

    /// Adds a player to a room in the Lobby.
    ///
    /// # Errors
    /// Checked in this order:
    /// - [`RoomError::UsernameTaken`] if any room has a player with this
    ///   username.
    /// - [`RoomError::RoomNotFound`] if no room has this code.
    /// - [`RoomError::GameInProgress`] if the room is Active.
    /// - [`RoomError::AlreadyInRoom`] if the user is on any roster.
    pub async fn join_room(
        &self,
        code: &RoomCode,
        user_id: &UserId,
        username: &Username,
    ) -> Result<Room, RoomError> {
        if self.store.find_by_player_username(username).await?.is_some() {
            return Err(RoomError::UsernameTaken(username.clone()));
        }
        let room = self.room_by_code(code).await?;
        if room.in_progress {
            return Err(RoomError::GameInProgress(code.clone()));
        }
        if self.store.find_by_player_id(user_id).await?.is_some() {
            return Err(RoomError::AlreadyInRoom(user_id.clone()));
        }

        let player = Player::new(user_id.clone(), username.clone());
        let update = self
            .store
            .update_by_code(code, move |room| {
                if room.in_progress {
                    return Err(RoomError::GameInProgress(room.code.clone()));
                }
                if room.has_username(&player.username) {
                    return Err(RoomError::UsernameTaken(player.username));
                }
                if room.has_player(&player.user_id) {
                    return Err(RoomError::AlreadyInRoom(player.user_id));
                }
                room.players.push(player);
                Ok(())
            })
            .await
            .map_err(roster_conflict)?;

        let room = settle(update, RoomKey::Code(code.clone()))?;
        tracing::info!(%code, %user_id, players = room.players.len(), "player joined");
        Ok(room)
    }

    /// Removes a player from whichever room holds them. Allowed in either
    /// phase.
    pub async fn leave_room(&self, user_id: &UserId) -> Result<Room, RoomError> {
        let leaving = user_id.clone();
        let update = self
            .store
            .update_by_player_id(user_id, move |room| {
                room.players.retain(|p| p.user_id != leaving);
                Ok::<_, RoomError>(())
            })
            .await?;

        let room = settle(update, RoomKey::Player(user_id.clone()))?;
        tracing::info!(code = %room.code, %user_id, players = room.players.len(), "player left");
        Ok(room)
    }

    /// Starts a round in the room owned by `owner_id`.
    ///
    /// Writes `settings`, seats the owner if they play, then deals roles
    /// and marks the room Active in one atomic step.
    ///
    /// The new settings stay written if seating the owner fails.
    ///
    /// # Errors
    /// - [`RoomError::InvalidSettings`] before anything is read.
    /// - [`RoomError::RoomNotFound`] if the caller owns no room.
    /// - [`RoomError::AlreadyInProgress`] if the room is Active.
    /// - [`RoomError::OwnerJoinFailed`] if the owner could not be seated.
    pub async fn start_game(&self, owner_id: &UserId, settings: Settings) -> Result<Room, RoomError> {
        settings.validate().map_err(RoomError::InvalidSettings)?;

        let update = self
            .store
            .update_by_owner(owner_id, move |room| {
                if room.in_progress {
                    return Err(RoomError::AlreadyInProgress(room.code.clone()));
                }
                room.settings = settings;
                Ok(())
            })
            .await?;
        let room = settle(update, RoomKey::Owner(owner_id.clone()))?;

        if settings.owner_is_playing {
            self.join_room(&room.code, &room.owner_id, &room.owner_username)
                .await
                .map_err(|err| {
                    tracing::warn!(code = %room.code, %owner_id, error = %err, "could not seat owner");
                    RoomError::OwnerJoinFailed(Box::new(err))
                })?;
        }

        let update = self
            .store
            .update_by_owner(owner_id, |room| {
                if room.in_progress {
                    return Err(RoomError::AlreadyInProgress(room.code.clone()));
                }
                room.players = RoleAssigner::assign(&room.players, room.settings.werewolf_ratio);
                room.in_progress = true;
                Ok(())
            })
            .await?;
        let room = settle(update, RoomKey::Owner(owner_id.clone()))?;

        tracing::info!(
            code = %room.code,
            %owner_id,
            players = room.players.len(),
            werewolves = room.count_role(Role::Werewolf),
            "game started"
        );
        Ok(room)
    }

    /// Ends the round in the room owned by `owner_id`.
    ///
    /// Unseats the owner if they played and are still on the roster, then
    /// clears every role and returns the room to the Lobby in one atomic
    /// step.
    ///
    /// # Errors
    /// - [`RoomError::RoomNotFound`] if the caller owns no room.
    /// - [`RoomError::NotInProgress`] if the room is in the Lobby.
    /// - [`RoomError::OwnerLeaveFailed`] if the owner could not be unseated.
    pub async fn end_game(&self, owner_id: &UserId) -> Result<Room, RoomError> {
        let room = self.get_owned_room(owner_id).await?;
        if !room.in_progress {
            return Err(RoomError::NotInProgress(room.code));
        }

        if room.settings.owner_is_playing && room.has_player(owner_id) {
            self.leave_room(owner_id).await.map_err(|err| {
                tracing::warn!(code = %room.code, %owner_id, error = %err, "could not unseat owner");
                RoomError::OwnerLeaveFailed(Box::new(err))
            })?;
        }

        let update = self
            .store
            .update_by_owner(owner_id, |room| {
                if !room.in_progress {
                    return Err(RoomError::NotInProgress(room.code.clone()));
                }
                room.players = RoleAssigner::unassign(&room.players);
                room.in_progress = false;
                Ok(())
            })
            .await?;
        let room = settle(update, RoomKey::Owner(owner_id.clone()))?;

        tracing::info!(code = %room.code, %owner_id, players = room.players.len(), "game ended");
        Ok(room)
    }

    /// Returns the role dealt to `user_id` in the current round.
    ///
    /// # Errors
    /// - [`RoomError::NotInRoom`] if the user is neither a player nor an
    ///   owner.
    /// - [`RoomError::GameNotStarted`] if the user's room is in the Lobby,
    ///   or if the user owns a room without playing in it.
    pub async fn get_role(&self, user_id: &UserId) -> Result<Role, RoomError> {
        if let Some(room) = self.store.find_by_player_id(user_id).await? {
            if !room.in_progress {
                return Err(RoomError::GameNotStarted(user_id.clone()));
            }
            return room
                .player(user_id)
                .and_then(|p| p.role)
                .ok_or_else(|| RoomError::GameNotStarted(user_id.clone()));
        }

        if self.store.find_by_owner(user_id).await?.is_some() {
            return Err(RoomError::GameNotStarted(user_id.clone()));
        }
        Err(RoomError::NotInRoom(user_id.clone()))
    }

    async fn room_by_code(&self, code: &RoomCode) -> Result<Room, RoomError> {
        self.store
            .find_by_code(code)
            .await?
            .ok_or_else(|| RoomError::RoomNotFound(RoomKey::Code(code.clone())))
    }
}

/// Turns an update outcome into the written room or the lifecycle error.
fn settle(update: Update<RoomError>, key: RoomKey) -> Result<Room, RoomError> {
    match update {
        Update::Updated(room) => Ok(room),
        Update::Rejected(err) => Err(err),
        Update::Missing => Err(RoomError::RoomNotFound(key)),
    }
}

/// Cross-room uniqueness failures caught by the store at commit time.
fn roster_conflict(err: StoreError) -> RoomError {
    match err {
        StoreError::DuplicateUsername(username, _) => RoomError::UsernameTaken(username),
        StoreError::DuplicatePlayerId(user_id, _) => RoomError::AlreadyInRoom(user_id),
        other => RoomError::Store(other),
    }
}
