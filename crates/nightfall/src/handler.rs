//! Per-connection handler.
//!
//! Each accepted connection gets its own Tokio task running this loop:
//! receive one message, decode a `Request`, dispatch it, send the
//! `Response`. The loop ends when the peer closes, the transport fails,
//! or no request arrives within the idle timeout.

use std::sync::Arc;

use nightfall_protocol::{Codec, Request, Response};
use nightfall_room::CodeGenerator;
use nightfall_store::RoomStore;
use nightfall_transport::{Connection, WebSocketConnection};

use crate::routes::{self, BAD_REQUEST};
use crate::server::ServerState;
use crate::NightfallError;

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<S, G, C>(
    conn: WebSocketConnection,
    state: Arc<ServerState<S, G, C>>,
) -> Result<(), NightfallError>
where
    S: RoomStore,
    G: CodeGenerator,
    C: Codec,
{
    let conn_id = conn.id();
    let peer = conn.peer_addr();
    tracing::debug!(%conn_id, %peer, "handling new connection");

    loop {
        let data = match tokio::time::timeout(state.idle_timeout, conn.recv()).await {
            Ok(Ok(Some(data))) => data,
            Ok(Ok(None)) => {
                tracing::debug!(%conn_id, "connection closed cleanly");
                break;
            }
            Ok(Err(e)) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break;
            }
            Err(_) => {
                tracing::info!(%conn_id, %peer, "connection idle, closing");
                // the peer may already be gone
                let _ = conn.close().await;
                break;
            }
        };

        let response = match state.codec.decode::<Request>(&data) {
            Ok(request) => routes::dispatch(&state.lifecycle, request).await,
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "failed to decode request");
                Response::error(0, BAD_REQUEST, format!("invalid request: {e}"))
            }
        };

        let bytes = state.codec.encode(&response)?;
        conn.send(&bytes).await?;
    }

    Ok(())
}
