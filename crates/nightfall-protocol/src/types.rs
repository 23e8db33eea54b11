//! Identity types and the request/response wire format.
//!
//! Every type in this module travels "on the wire": clients send a
//! [`Request`] as one JSON message and receive exactly one [`Response`]
//! carrying the same `id`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Role, Room, Settings};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A caller-supplied user identifier.
///
/// Nightfall does not authenticate anyone: whatever ID the client sends is
/// trusted. The newtype keeps it from being mixed up with a [`Username`]
/// or a [`RoomCode`], which are strings too.
///
/// `#[serde(transparent)]` serializes `UserId("u1")` as plain `"u1"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    /// Creates a user ID from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A display name, unique among all players in all rooms.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Username(pub String);

impl Username {
    /// Creates a username from anything string-like.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the username as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The short, human-shareable code that identifies a room.
///
/// Codes are 6 alphanumeric characters (see [`RoomCode::LEN`]). The type
/// itself does not enforce the format so that lookups with a malformed code
/// simply miss instead of failing to parse.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(pub String);

impl RoomCode {
    /// Length of a generated room code.
    pub const LEN: usize = 6;

    /// Creates a room code from anything string-like.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the code has the generated shape:
    /// exactly [`RoomCode::LEN`] ASCII alphanumeric characters.
    pub fn is_well_formed(&self) -> bool {
        self.0.len() == Self::LEN
            && self.0.bytes().all(|b| b.is_ascii_alphanumeric())
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// One operation a client can ask for. There is exactly one variant per
/// room lifecycle operation.
///
/// `#[serde(tag = "type")]` produces internally tagged JSON:
///   `{ "type": "JoinRoom", "room_code": "aB3xY9", "user_id": "u1", "username": "Bob" }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RoomRequest {
    /// Create a room owned by the caller.
    CreateRoom { user_id: UserId, username: Username },

    /// Look up who owns a room.
    GetOwner { room_code: RoomCode },

    /// List the user IDs on a room's roster.
    GetPlayers { room_code: RoomCode },

    /// Remove a room entirely, in either state.
    DeleteRoom { room_code: RoomCode },

    /// Add the caller to a room's roster.
    JoinRoom {
        room_code: RoomCode,
        user_id: UserId,
        username: Username,
    },

    /// Remove the caller from whichever roster they are on.
    LeaveRoom { user_id: UserId },

    /// Start a round in the caller's own room.
    StartGame { user_id: UserId, settings: Settings },

    /// End the round in the caller's own room.
    EndGame { user_id: UserId },

    /// Ask for the caller's secret role.
    GetRole { user_id: UserId },

    /// Fetch the room the caller owns.
    GetOwnedRoom { user_id: UserId },
}

impl RoomRequest {
    /// Short operation name, used as a tracing field.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateRoom { .. } => "create_room",
            Self::GetOwner { .. } => "get_owner",
            Self::GetPlayers { .. } => "get_players",
            Self::DeleteRoom { .. } => "delete_room",
            Self::JoinRoom { .. } => "join_room",
            Self::LeaveRoom { .. } => "leave_room",
            Self::StartGame { .. } => "start_game",
            Self::EndGame { .. } => "end_game",
            Self::GetRole { .. } => "get_role",
            Self::GetOwnedRoom { .. } => "get_owned_room",
        }
    }
}

/// A client request: an operation plus a client-chosen correlation ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Echoed back unchanged in the [`Response`].
    pub id: u64,

    /// What the client wants done.
    pub op: RoomRequest,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// The body of a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ResponseBody {
    /// A room was created.
    RoomCreated { room_code: RoomCode },

    /// The owner of a room.
    Owner { owner_id: UserId },

    /// The roster of a room, in join order.
    Players { player_ids: Vec<UserId> },

    /// A full room value.
    Room { room: Room },

    /// The caller's role in the running round.
    Role { role: Role },

    /// A plain confirmation message.
    Message { message: String },

    /// The request failed. `message` is human-readable.
    Error { message: String },
}

/// The server's answer to one [`Request`].
///
/// `status` follows HTTP conventions: 201/202 on success, 400 for bad
/// input, 404 when something is missing, 409 for conflicts and wrong
/// states, 500/503 for server-side failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// The `id` of the request this answers (0 if it could not be decoded).
    pub id: u64,

    /// HTTP-style status code.
    pub status: u16,

    /// The payload.
    pub body: ResponseBody,
}

impl Response {
    /// Builds a successful response.
    pub fn ok(id: u64, status: u16, body: ResponseBody) -> Self {
        Self { id, status, body }
    }

    /// Builds an error response.
    pub fn error(id: u64, status: u16, message: impl Into<String>) -> Self {
        Self {
            id,
            status,
            body: ResponseBody::Error {
                message: message.into(),
            },
        }
    }

    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! The client SDK parses these shapes directly, so the tests pin the
    //! JSON produced by the serde attributes.

    use super::*;

    #[test]
    fn test_ids_serialize_as_plain_strings() {
        assert_eq!(serde_json::to_string(&UserId::new("u1")).unwrap(), "\"u1\"");
        assert_eq!(
            serde_json::to_string(&Username::new("Alice")).unwrap(),
            "\"Alice\""
        );
        assert_eq!(
            serde_json::to_string(&RoomCode::new("aB3xY9")).unwrap(),
            "\"aB3xY9\""
        );
    }

    #[test]
    fn test_room_code_is_well_formed() {
        assert!(RoomCode::new("aB3xY9").is_well_formed());
        assert!(!RoomCode::new("aB3xY").is_well_formed());
        assert!(!RoomCode::new("aB3xY9z").is_well_formed());
        assert!(!RoomCode::new("aB3-Y9").is_well_formed());
        assert!(!RoomCode::new("").is_well_formed());
    }

    #[test]
    fn test_ids_display_raw_value() {
        assert_eq!(UserId::new("owner1").to_string(), "owner1");
        assert_eq!(RoomCode::new("Zz9Zz9").to_string(), "Zz9Zz9");
    }

    #[test]
    fn test_join_request_json_format() {
        let req = Request {
            id: 7,
            op: RoomRequest::JoinRoom {
                room_code: RoomCode::new("aB3xY9"),
                user_id: UserId::new("p1"),
                username: Username::new("Bob"),
            },
        };
        let json: serde_json::Value = serde_json::to_value(&req).unwrap();

        assert_eq!(json["id"], 7);
        assert_eq!(json["op"]["type"], "JoinRoom");
        assert_eq!(json["op"]["room_code"], "aB3xY9");
        assert_eq!(json["op"]["user_id"], "p1");
        assert_eq!(json["op"]["username"], "Bob");
    }

    #[test]
    fn test_start_game_request_parses_settings() {
        let raw = r#"{
            "id": 3,
            "op": {
                "type": "StartGame",
                "user_id": "owner1",
                "settings": { "werewolf_ratio": 0.5, "owner_is_playing": false }
            }
        }"#;
        let req: Request = serde_json::from_str(raw).unwrap();

        match req.op {
            RoomRequest::StartGame { user_id, settings } => {
                assert_eq!(user_id, UserId::new("owner1"));
                assert_eq!(settings.werewolf_ratio, 0.5);
                assert!(!settings.owner_is_playing);
            }
            other => panic!("expected StartGame, got {other:?}"),
        }
    }

    #[test]
    fn test_leave_request_round_trip() {
        let req = Request {
            id: 1,
            op: RoomRequest::LeaveRoom {
                user_id: UserId::new("p1"),
            },
        };
        let bytes = serde_json::to_vec(&req).unwrap();
        let decoded: Request = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(req, decoded);
    }

    #[test]
    fn test_request_name_matches_operation() {
        let op = RoomRequest::GetRole {
            user_id: UserId::new("p1"),
        };
        assert_eq!(op.name(), "get_role");
        let op = RoomRequest::DeleteRoom {
            room_code: RoomCode::new("abc123"),
        };
        assert_eq!(op.name(), "delete_room");
    }

    #[test]
    fn test_error_response_json_format() {
        let resp = Response::error(9, 404, "room abc123 not found");
        let json: serde_json::Value = serde_json::to_value(&resp).unwrap();

        assert_eq!(json["id"], 9);
        assert_eq!(json["status"], 404);
        assert_eq!(json["body"]["type"], "Error");
        assert_eq!(json["body"]["message"], "room abc123 not found");
        assert!(!resp.is_success());
    }

    #[test]
    fn test_role_response_json_format() {
        let resp = Response::ok(2, 201, ResponseBody::Role { role: Role::Werewolf });
        let json: serde_json::Value = serde_json::to_value(&resp).unwrap();

        assert_eq!(json["body"]["type"], "Role");
        assert_eq!(json["body"]["role"], "Werewolf");
        assert!(resp.is_success());
    }

    #[test]
    fn test_decode_unknown_request_type_returns_error() {
        let unknown = r#"{"id": 1, "op": {"type": "FlyToMoon"}}"#;
        let result: Result<Request, _> = serde_json::from_str(unknown);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_missing_field_returns_error() {
        let missing = r#"{"id": 1, "op": {"type": "JoinRoom", "user_id": "p1"}}"#;
        let result: Result<Request, _> = serde_json::from_str(missing);
        assert!(result.is_err());
    }
}
