//! Relay server listener
//!
//! Binds the listen socket, then runs the accept loop on a spawned task.
//! Each accepted client gets its own session task; all of them stop when the
//! server's cancellation token fires.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::config::RelayConfig;
use super::relay::RelayHandle;
use super::session::{SessionLimits, run_session};
use crate::{RelayError, Result};

/// Time sessions get to finish on their own after cancellation.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// Pause after a failed accept, so a persistent error does not spin.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(50);

/// A running relay server.
///
/// Created by [`RelayServer::start`] and shut down by [`RelayServer::stop`].
/// `stop` consumes the server, so a stopped server cannot be restarted.
pub struct RelayServer {
    relay: RelayHandle,
    local_addr: SocketAddr,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl RelayServer {
    /// Bind the listen address and start accepting clients.
    ///
    /// Returns once the socket is bound; the accept loop keeps running on its
    /// own task. Must be called inside a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Bind`] if the address cannot be bound.
    pub async fn start(config: RelayConfig) -> Result<Self> {
        let listener = TcpListener::bind(config.bind_addr)
            .await
            .map_err(|e| RelayError::bind_failed(config.bind_addr, e))?;
        let local_addr =
            listener.local_addr().map_err(|e| RelayError::bind_failed(config.bind_addr, e))?;

        info!(addr = %local_addr, "Relay server listening");

        let relay = RelayHandle::new();
        let cancel = CancellationToken::new();
        let task = tokio::spawn(accept_loop(listener, config, relay.clone(), cancel.clone()));

        Ok(Self { relay, local_addr, cancel, task: Some(task) })
    }

    /// Handle for consumers: capture frames and send text to the client.
    pub fn handle(&self) -> RelayHandle {
        self.relay.clone()
    }

    /// The address actually bound (useful with port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting clients, close all sessions, and wait for the accept
    /// loop to finish.
    ///
    /// Does not require a client to be connected. A failure of the accept
    /// task is logged rather than returned.
    pub async fn stop(mut self) {
        info!(addr = %self.local_addr, "Relay server shutting down");
        self.cancel.cancel();

        if let Some(task) = self.task.take() {
            match task.await {
                Ok(()) => info!("Relay server stopped"),
                Err(e) => error!(error = %e, "Relay task failed during shutdown"),
            }
        }
    }
}

impl Drop for RelayServer {
    fn drop(&mut self) {
        if self.task.is_some() {
            debug!("Dropping relay server without stop, cancelling tasks");
            self.cancel.cancel();
        }
    }
}

async fn accept_loop(
    listener: TcpListener,
    config: RelayConfig,
    relay: RelayHandle,
    cancel: CancellationToken,
) {
    let mut sessions = JoinSet::new();
    let mut next_id = 1u64;
    let limits =
        SessionLimits { outbound_capacity: config.outbound_capacity, write_timeout: config.write_timeout };

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok((socket, peer)) => {
                    if config.tcp_nodelay {
                        if let Err(e) = socket.set_nodelay(true) {
                            warn!(%peer, error = %e, "Failed to set TCP_NODELAY");
                        }
                    }

                    let id = next_id;
                    next_id += 1;
                    debug!(connection_id = id, %peer, "Accepted connection");
                    sessions.spawn(run_session(id, socket, peer, relay.clone(), limits, cancel.child_token()));
                }
                Err(e) => {
                    error!(error = %e, "Failed to accept connection");
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                }
            },
            Some(finished) = sessions.join_next(), if !sessions.is_empty() => {
                if let Err(e) = finished {
                    error!(error = %e, "Session task failed");
                }
            }
        }
    }

    drop(listener);

    let drained = tokio::time::timeout(SHUTDOWN_GRACE, async {
        while let Some(finished) = sessions.join_next().await {
            if let Err(e) = finished {
                error!(error = %e, "Session task failed during shutdown");
            }
        }
    })
    .await;

    if drained.is_err() {
        warn!(remaining = sessions.len(), "Sessions did not close in time, aborting");
        sessions.shutdown().await;
    }
}
