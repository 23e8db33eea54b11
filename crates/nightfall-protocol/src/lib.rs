//! Data model and wire protocol for Nightfall.
//!
//! - **Room model** ([`Room`], [`Player`], [`Settings`], [`Role`]): the
//!   values kept in the room store, with their per-room invariant checks.
//! - **Wire types** ([`Request`], [`RoomRequest`], [`Response`]): what
//!   clients send and receive.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those are turned
//!   into bytes.
//! - **Errors** ([`ProtocolError`]).
//!
//! ```text
//! Transport (bytes) → Protocol (Request / Room) → Room lifecycle
//! ```

mod codec;
mod error;
mod room;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use room::{Player, Role, Room, RoomPhase, Settings};
pub use types::{
    Request, Response, ResponseBody, RoomCode, RoomRequest, UserId, Username,
};
