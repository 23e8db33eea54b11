//! A standalone Nightfall room server backed by the in-memory store.
//!
//! Configured through `NIGHTFALL_HOST`, `NIGHTFALL_PORT` and
//! `NIGHTFALL_IDLE_TIMEOUT_SECS`; log level through `RUST_LOG`.

use nightfall::prelude::*;

#[tokio::main]
async fn main() -> Result<(), NightfallError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = ServerConfig::from_env()?;
    tracing::info!(addr = %config.bind_addr, "starting party server");

    let server = NightfallServer::builder()
        .config(config)
        .build(MemoryRoomStore::new())
        .await?;

    tokio::select! {
        result = server.run() => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutting down");
            Ok(())
        }
    }
}
