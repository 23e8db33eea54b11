//! Error types for the protocol layer.
//!
//! Each crate in Nightfall defines its own error enum. A `ProtocolError`
//! means the problem is in the shape of the data itself: a message that
//! does not parse, settings that are out of range, or a room value that
//! breaks one of its invariants.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, missing required fields, or an
    /// unknown request `type` tag.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message parsed but is not valid at the protocol level,
    /// e.g. an empty user ID.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// Round settings are outside their allowed range.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// A room value breaks one of the per-room invariants
    /// (duplicate members, roles present in the lobby, missing roles
    /// during a round).
    #[error("room {code} violates invariant: {reason}")]
    InvariantViolated { code: String, reason: String },
}
