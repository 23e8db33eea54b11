//! Request routing: validate, guard, call the lifecycle, pick a status.

use nightfall_protocol::{Request, Response, ResponseBody, RoomCode, RoomRequest, UserId, Username};
use nightfall_room::{CodeGenerator, ErrorKind, RoomError, RoomLifecycle};
use nightfall_store::RoomStore;

use crate::guards;

pub const CREATED: u16 = 201;
pub const ACCEPTED: u16 = 202;
pub const BAD_REQUEST: u16 = 400;
pub const NOT_FOUND: u16 = 404;
pub const CONFLICT: u16 = 409;
pub const INTERNAL_ERROR: u16 = 500;
pub const UNAVAILABLE: u16 = 503;

/// Maps an error classification to a response status.
pub fn status_for(kind: ErrorKind) -> u16 {
    match kind {
        ErrorKind::InvalidInput => BAD_REQUEST,
        ErrorKind::NotFound => NOT_FOUND,
        ErrorKind::Conflict | ErrorKind::InvalidState => CONFLICT,
        ErrorKind::DependentOperationFailed | ErrorKind::Internal => INTERNAL_ERROR,
        ErrorKind::Unavailable => UNAVAILABLE,
    }
}

/// A request that will be answered with an error body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub status: u16,
    pub message: String,
}

impl Rejection {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<RoomError> for Rejection {
    fn from(err: RoomError) -> Self {
        let status = status_for(err.kind());
        if status >= INTERNAL_ERROR {
            tracing::warn!(status, error = %err, "request failed");
        }
        Self {
            status,
            message: err.to_string(),
        }
    }
}

/// Answers one request. Never fails: every error becomes an error
/// response carrying the request's id.
pub async fn dispatch<S, C>(rooms: &RoomLifecycle<S, C>, request: Request) -> Response
where
    S: RoomStore,
    C: CodeGenerator,
{
    let Request { id, op } = request;
    let name = op.name();
    match route(rooms, op).await {
        Ok((status, body)) => {
            tracing::debug!(id, op = name, status, "request handled");
            Response::ok(id, status, body)
        }
        Err(rejection) => {
            tracing::debug!(
                id,
                op = name,
                status = rejection.status,
                message = %rejection.message,
                "request rejected"
            );
            Response::error(id, rejection.status, rejection.message)
        }
    }
}

async fn route<S, C>(
    rooms: &RoomLifecycle<S, C>,
    op: RoomRequest,
) -> Result<(u16, ResponseBody), Rejection>
where
    S: RoomStore,
    C: CodeGenerator,
{
    match op {
        RoomRequest::CreateRoom { user_id, username } => {
            valid_id(&user_id)?;
            valid_username(&username)?;
            guards::ensure_not_owner(rooms, &user_id).await?;
            let room = rooms.create_room(&user_id, &username).await?;
            Ok((CREATED, ResponseBody::RoomCreated { room_code: room.code }))
        }
        RoomRequest::GetOwner { room_code } => {
            valid_code(&room_code)?;
            let owner_id = rooms.get_owner(&room_code).await?;
            Ok((CREATED, ResponseBody::Owner { owner_id }))
        }
        RoomRequest::GetPlayers { room_code } => {
            valid_code(&room_code)?;
            let player_ids = rooms.get_players(&room_code).await?;
            Ok((CREATED, ResponseBody::Players { player_ids }))
        }
        RoomRequest::DeleteRoom { room_code } => {
            valid_code(&room_code)?;
            let room = rooms.delete_room(&room_code).await?;
            Ok((ACCEPTED, ResponseBody::Room { room }))
        }
        RoomRequest::JoinRoom {
            room_code,
            user_id,
            username,
        } => {
            valid_id(&user_id)?;
            valid_username(&username)?;
            valid_code(&room_code)?;
            guards::ensure_not_in_room(rooms, &user_id).await?;
            rooms.join_room(&room_code, &user_id, &username).await?;
            Ok((ACCEPTED, message("Room joined successfully!")))
        }
        RoomRequest::LeaveRoom { user_id } => {
            valid_id(&user_id)?;
            rooms.leave_room(&user_id).await?;
            Ok((ACCEPTED, message("Room left successfully!")))
        }
        RoomRequest::StartGame { user_id, settings } => {
            valid_id(&user_id)?;
            rooms.start_game(&user_id, settings).await?;
            Ok((ACCEPTED, message("Game started successfully!")))
        }
        RoomRequest::EndGame { user_id } => {
            valid_id(&user_id)?;
            rooms.end_game(&user_id).await?;
            Ok((ACCEPTED, message("Game ended successfully!")))
        }
        RoomRequest::GetRole { user_id } => {
            valid_id(&user_id)?;
            let role = rooms.get_role(&user_id).await?;
            Ok((CREATED, ResponseBody::Role { role }))
        }
        RoomRequest::GetOwnedRoom { user_id } => {
            valid_id(&user_id)?;
            let room = rooms.get_owned_room(&user_id).await?;
            Ok((CREATED, ResponseBody::Room { room }))
        }
    }
}

fn message(text: &str) -> ResponseBody {
    ResponseBody::Message {
        message: text.to_string(),
    }
}

fn valid_id(user_id: &UserId) -> Result<(), Rejection> {
    non_blank(user_id.as_str(), "Invalid ID")
}

fn valid_username(username: &Username) -> Result<(), Rejection> {
    non_blank(username.as_str(), "Invalid username")
}

fn valid_code(code: &RoomCode) -> Result<(), Rejection> {
    non_blank(code.as_str(), "Invalid room code")
}

fn non_blank(value: &str, message: &str) -> Result<(), Rejection> {
    if value.trim().is_empty() {
        Err(Rejection::bad_request(message))
    } else {
        Ok(())
    }
}
