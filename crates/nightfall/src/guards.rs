//! Membership checks that run before a request reaches the lifecycle.
//!
//! These answer with 400 and a fixed message, ahead of the lifecycle's
//! own conflict errors, so clients get a stable text for the common
//! mistakes.

use nightfall_protocol::UserId;
use nightfall_room::{CodeGenerator, RoomError, RoomLifecycle};
use nightfall_store::RoomStore;

use crate::routes::Rejection;

pub(crate) const ALREADY_OWNS_ROOM: &str = "Could not create room: User already owns a room!";
pub(crate) const ALREADY_IN_ROOM: &str = "Could not join room: User is already in a room!";

/// Rejects a `CreateRoom` from a user who already owns a room.
pub(crate) async fn ensure_not_owner<S, C>(
    rooms: &RoomLifecycle<S, C>,
    user_id: &UserId,
) -> Result<(), Rejection>
where
    S: RoomStore,
    C: CodeGenerator,
{
    let owned = rooms
        .store()
        .find_by_owner(user_id)
        .await
        .map_err(RoomError::from)?;
    if owned.is_some() {
        tracing::debug!(%user_id, "create rejected: already owns a room");
        return Err(Rejection::bad_request(ALREADY_OWNS_ROOM));
    }
    Ok(())
}

/// Rejects a `JoinRoom` from a user who plays in or owns any room.
pub(crate) async fn ensure_not_in_room<S, C>(
    rooms: &RoomLifecycle<S, C>,
    user_id: &UserId,
) -> Result<(), Rejection>
where
    S: RoomStore,
    C: CodeGenerator,
{
    let store = rooms.store();
    let playing = store.find_by_player_id(user_id).await.map_err(RoomError::from)?;
    let owning = store.find_by_owner(user_id).await.map_err(RoomError::from)?;
    if playing.is_some() || owning.is_some() {
        tracing::debug!(%user_id, "join rejected: already in a room");
        return Err(Rejection::bad_request(ALREADY_IN_ROOM));
    }
    Ok(())
}
