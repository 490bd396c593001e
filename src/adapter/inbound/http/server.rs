//! Trigger server lifecycle.

use std::future::Future;
use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::info;

use super::routes::{router, TriggerState};
use crate::error::Result;

/// Serve the trigger routes until `shutdown` resolves.
///
/// # Errors
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(
    addr: SocketAddr,
    state: TriggerState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(
        address = %listener.local_addr()?,
        secret_configured = state.secret.is_some(),
        "Sync trigger listening"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}
