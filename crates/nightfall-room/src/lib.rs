//! Room lifecycle for Nightfall.
//!
//! Rooms are created by an owner, filled with players while in the Lobby,
//! and flipped into an Active round that deals each player a secret role.
//! All state lives in a [`RoomStore`](nightfall_store::RoomStore); this
//! crate holds the rules.
//!
//! # Key types
//!
//! - [`RoomLifecycle`]: every room operation, written against any store
//! - [`CodeGenerator`] / [`AlphanumericCodes`]: candidate room codes
//! - [`RoleAssigner`]: deals and clears roles
//! - [`LifecycleConfig`]: retry bound and default settings
//! - [`RoomError`] / [`ErrorKind`]: failures and their classification

mod code;
mod config;
mod error;
mod lifecycle;
mod roles;

pub use code::{AlphanumericCodes, CodeGenerator, generate_code};
pub use config::LifecycleConfig;
pub use error::{ErrorKind, RoomError, RoomKey};
pub use lifecycle::RoomLifecycle;
pub use roles::RoleAssigner;
