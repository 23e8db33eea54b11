//! Room storage for Nightfall.
//!
//! # How it fits in the stack
//!
//! ```text
//! Room lifecycle (above)  ← every operation reads and writes through a RoomStore
//!     ↕
//! Storage layer (this crate)  ← keyed rooms, secondary indices, atomic updates
//!     ↕
//! Protocol layer (below)  ← provides Room, RoomCode, UserId, Username
//! ```

mod error;
mod memory;
mod store;

pub use error::StoreError;
pub use memory::MemoryRoomStore;
pub use store::{RoomStore, Update};
