//! The room data model and its per-room invariants.
//!
//! A [`Room`] is one game session. It lives in the store, keyed by its
//! [`RoomCode`], and moves between two phases:
//!
//! ```text
//! Lobby ──(start game)──→ Active ──(end game)──→ Lobby
//! ```
//!
//! Deletion is allowed from either phase.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{ProtocolError, RoomCode, UserId, Username};

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// A player's secret role during a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Werewolf,
    Villager,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Werewolf => write!(f, "Werewolf"),
            Self::Villager => write!(f, "Villager"),
        }
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Round settings, replaced wholesale when a round starts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Fraction of players dealt the Werewolf role. Must be in `(0, 1]`.
    pub werewolf_ratio: f64,

    /// Whether the owner joins the roster for the round.
    pub owner_is_playing: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            werewolf_ratio: 0.25,
            owner_is_playing: true,
        }
    }
}

impl Settings {
    /// Checks that the ratio is in `(0, 1]`. NaN is rejected.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        let ratio = self.werewolf_ratio;
        if ratio > 0.0 && ratio <= 1.0 {
            Ok(())
        } else {
            Err(ProtocolError::InvalidSettings(format!(
                "werewolf_ratio must be in (0, 1], got {ratio}"
            )))
        }
    }
}

// ---------------------------------------------------------------------------
// RoomPhase
// ---------------------------------------------------------------------------

/// The lifecycle phase of a room, derived from `Room::in_progress`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomPhase {
    /// Accepting players, no roles dealt.
    Lobby,
    /// A round is running, every player holds a role.
    Active,
}

impl RoomPhase {
    /// Returns `true` if new players may join.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Lobby)
    }
}

impl fmt::Display for RoomPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lobby => write!(f, "Lobby"),
            Self::Active => write!(f, "Active"),
        }
    }
}

// ---------------------------------------------------------------------------
// Player / Room
// ---------------------------------------------------------------------------

/// One entry on a room's roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub user_id: UserId,
    pub username: Username,
    /// `None` outside of a round.
    #[serde(default)]
    pub role: Option<Role>,
}

impl Player {
    /// A roster entry without a role.
    pub fn new(user_id: UserId, username: Username) -> Self {
        Self {
            user_id,
            username,
            role: None,
        }
    }
}

/// One game session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    /// Primary key. Immutable after creation.
    pub code: RoomCode,
    /// Immutable after creation.
    pub owner_id: UserId,
    /// Immutable after creation.
    pub owner_username: Username,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub in_progress: bool,
    /// Roster in join order.
    #[serde(default)]
    pub players: Vec<Player>,
}

impl Room {
    /// A fresh room in the lobby with default settings and no players.
    pub fn new(code: RoomCode, owner_id: UserId, owner_username: Username) -> Self {
        Self {
            code,
            owner_id,
            owner_username,
            settings: Settings::default(),
            in_progress: false,
            players: Vec::new(),
        }
    }

    pub fn phase(&self) -> RoomPhase {
        if self.in_progress {
            RoomPhase::Active
        } else {
            RoomPhase::Lobby
        }
    }

    /// Finds a roster entry by user ID.
    pub fn player(&self, user_id: &UserId) -> Option<&Player> {
        self.players.iter().find(|p| &p.user_id == user_id)
    }

    pub fn has_player(&self, user_id: &UserId) -> bool {
        self.player(user_id).is_some()
    }

    pub fn has_username(&self, username: &Username) -> bool {
        self.players.iter().any(|p| &p.username == username)
    }

    /// User IDs on the roster, in join order.
    pub fn player_ids(&self) -> Vec<UserId> {
        self.players.iter().map(|p| p.user_id.clone()).collect()
    }

    /// Number of players holding `role`.
    pub fn count_role(&self, role: Role) -> usize {
        self.players.iter().filter(|p| p.role == Some(role)).count()
    }

    /// Checks the invariants that can be verified on a single room:
    ///
    /// - no duplicate user IDs or usernames on the roster,
    /// - no roles while in the lobby,
    /// - every player has a role while a round is running.
    ///
    /// Cross-room uniqueness is the store's job.
    pub fn check_invariants(&self) -> Result<(), ProtocolError> {
        let violation = |reason: String| ProtocolError::InvariantViolated {
            code: self.code.to_string(),
            reason,
        };

        let mut ids = HashSet::with_capacity(self.players.len());
        let mut names = HashSet::with_capacity(self.players.len());
        for player in &self.players {
            if !ids.insert(&player.user_id) {
                return Err(violation(format!(
                    "duplicate player id {}",
                    player.user_id
                )));
            }
            if !names.insert(&player.username) {
                return Err(violation(format!(
                    "duplicate username {}",
                    player.username
                )));
            }
            match (self.in_progress, player.role) {
                (false, Some(role)) => {
                    return Err(violation(format!(
                        "player {} holds {role} in the lobby",
                        player.user_id
                    )));
                }
                (true, None) => {
                    return Err(violation(format!(
                        "player {} has no role during a round",
                        player.user_id
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }
}
