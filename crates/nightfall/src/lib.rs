//! # Nightfall
//!
//! Room and session server for werewolf-style party games.
//!
//! An owner creates a room and shares its six-character code; players
//! join by code while the room is in the lobby; the owner starts a round,
//! which deals every player a secret Werewolf or Villager role, and ends
//! it again. Clients speak JSON requests over WebSocket.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nightfall::prelude::*;
//!
//! # async fn run() -> Result<(), NightfallError> {
//! let server = NightfallServer::builder()
//!     .config(ServerConfig::from_env()?)
//!     .build(MemoryRoomStore::new())
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod guards;
mod handler;
pub mod routes;
mod server;

pub use config::ServerConfig;
pub use error::NightfallError;
pub use server::{NightfallServer, NightfallServerBuilder};

/// Everything needed to run a server or drive rooms directly.
pub mod prelude {
    pub use nightfall_protocol::{
        Codec, JsonCodec, Player, Request, Response, ResponseBody, Role, Room, RoomCode,
        RoomPhase, RoomRequest, Settings, UserId, Username,
    };
    pub use nightfall_room::{
        AlphanumericCodes, CodeGenerator, ErrorKind, LifecycleConfig, RoleAssigner, RoomError,
        RoomLifecycle,
    };
    pub use nightfall_store::{MemoryRoomStore, RoomStore, StoreError, Update};

    pub use crate::{NightfallError, NightfallServer, NightfallServerBuilder, ServerConfig};
}
