//! `NightfallServer` builder and server loop.
//!
//! This is the entry point for running a Nightfall room server. It ties
//! together all the layers: transport → protocol → lifecycle → store.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use nightfall_protocol::{Codec, JsonCodec};
use nightfall_room::{AlphanumericCodes, CodeGenerator, LifecycleConfig, RoomLifecycle};
use nightfall_store::RoomStore;
use nightfall_transport::{Transport, WebSocketTransport};

use crate::handler::handle_connection;
use crate::{NightfallError, ServerConfig};

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. The
/// lifecycle needs no outer lock; the store serializes writes per room.
pub(crate) struct ServerState<S, G, C> {
    pub(crate) lifecycle: RoomLifecycle<S, G>,
    pub(crate) codec: C,
    pub(crate) idle_timeout: Duration,
}

/// Builder for configuring and starting a Nightfall server.
///
/// # Example
///
/// ```rust,no_run
/// use nightfall::prelude::*;
///
/// # async fn run() -> Result<(), NightfallError> {
/// let server = NightfallServer::builder()
///     .bind("0.0.0.0:8080")
///     .build(MemoryRoomStore::new())
///     .await?;
/// server.run().await
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct NightfallServerBuilder {
    config: ServerConfig,
    lifecycle_config: LifecycleConfig,
}

impl NightfallServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole server configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.idle_timeout = timeout;
        self
    }

    /// Sets the room lifecycle configuration.
    pub fn lifecycle_config(mut self, config: LifecycleConfig) -> Self {
        self.lifecycle_config = config;
        self
    }

    /// Binds the listener and builds the server on top of `store`.
    ///
    /// Uses `JsonCodec`, `WebSocketTransport` and random alphanumeric room
    /// codes.
    pub async fn build<S: RoomStore>(
        self,
        store: S,
    ) -> Result<NightfallServer<S, AlphanumericCodes, JsonCodec>, NightfallError> {
        let transport = WebSocketTransport::bind(&self.config.bind_addr).await?;

        let state = Arc::new(ServerState {
            lifecycle: RoomLifecycle::with_config(store, self.lifecycle_config),
            codec: JsonCodec,
            idle_timeout: self.config.idle_timeout,
        });

        Ok(NightfallServer { transport, state })
    }
}

/// A bound Nightfall server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct NightfallServer<S, G, C> {
    transport: WebSocketTransport,
    state: Arc<ServerState<S, G, C>>,
}

impl NightfallServer<(), AlphanumericCodes, JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> NightfallServerBuilder {
        NightfallServerBuilder::new()
    }
}

impl<S, G, C> NightfallServer<S, G, C>
where
    S: RoomStore,
    G: CodeGenerator,
    C: Codec,
{
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, NightfallError> {
        Ok(self.transport.local_addr()?)
    }

    /// The room lifecycle shared by every connection.
    pub fn lifecycle(&self) -> &RoomLifecycle<S, G> {
        &self.state.lifecycle
    }

    /// Runs the server accept loop.
    ///
    /// Accepts incoming connections and spawns a handler task for each.
    /// Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), NightfallError> {
        tracing::info!(addr = ?self.transport.local_addr().ok(), "Nightfall server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
