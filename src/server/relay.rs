//! Shared relay state
//!
//! [`RelayHandle`] is the one piece of state shared between the network task
//! and the consumer. A single lock guards the frame buffer together with the
//! connection reference; every method holds it for a slot swap, an `Arc`
//! clone, or a reference replace. Decoding and pixel copies happen outside.

use std::net::SocketAddr;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, error, info, trace, warn};

use super::stats::{RelayStats, StatsCounters};
use crate::buffer::FrameBuffer;
use crate::codec::decode_frame;
use crate::types::DecodedImage;

/// Handle to the single attached client session.
///
/// Holds only the sending half of the session's bounded outbound queue, so
/// keeping a reference does not keep the session alive. Once the session task
/// exits the reference is dead and sends through it are no-ops.
#[derive(Debug, Clone)]
pub struct ConnectionRef {
    id: u64,
    peer: SocketAddr,
    outbound: mpsc::Sender<String>,
}

impl ConnectionRef {
    pub fn new(id: u64, peer: SocketAddr, outbound: mpsc::Sender<String>) -> Self {
        Self { id, peer, outbound }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Whether the session behind this reference is still running
    pub fn is_alive(&self) -> bool {
        !self.outbound.is_closed()
    }
}

/// Outcome of [`RelayHandle::send_text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Handed to the live session's writer
    Queued,
    /// No live client; nothing was sent
    NoClient,
    /// The client is not keeping up and its queue is full; the record was
    /// discarded
    Dropped,
}

#[derive(Debug, Default)]
struct RelayState {
    frames: FrameBuffer,
    connection: Option<ConnectionRef>,
}

#[derive(Debug, Default)]
struct RelayShared {
    state: Mutex<RelayState>,
    stats: StatsCounters,
}

/// Cloneable handle to the relay's frame buffer and client connection.
///
/// All methods are synchronous and safe to call from any thread, including
/// threads outside the tokio runtime.
#[derive(Debug, Clone, Default)]
pub struct RelayHandle {
    shared: Arc<RelayShared>,
}

impl RelayHandle {
    /// Create a relay with no network loop attached.
    ///
    /// [`RelayServer::start`](super::RelayServer::start) creates one of these
    /// and drives it from its sessions; a detached handle is useful for custom
    /// transports and for tests.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `conn` as the send target, replacing any previous connection.
    pub fn on_connection_opened(&self, conn: ConnectionRef) {
        let (id, peer) = (conn.id, conn.peer);
        let previous = self.shared.state.lock().connection.replace(conn);
        StatsCounters::bump(&self.shared.stats.connections);

        match previous {
            Some(old) if old.is_alive() => info!(
                connection_id = id,
                %peer,
                replaced = old.id,
                "Client connected, replacing previous send target"
            ),
            _ => info!(connection_id = id, %peer, "Client connected"),
        }
    }

    /// Forget the connection `id` if it is still the send target.
    pub fn on_connection_closed(&self, id: u64) {
        let cleared = {
            let mut state = self.shared.state.lock();
            if state.connection.as_ref().is_some_and(|conn| conn.id == id) {
                state.connection.take()
            } else {
                None
            }
        };

        if cleared.is_some() {
            info!(connection_id = id, "Client disconnected");
        } else {
            debug!(connection_id = id, "Superseded client disconnected");
        }
    }

    /// Decode a binary payload and store it as the latest frame.
    ///
    /// Returns `true` if the frame was stored. A payload that does not decode
    /// is dropped and the previous frame is kept.
    pub fn on_binary_message(&self, payload: &[u8]) -> bool {
        StatsCounters::bump(&self.shared.stats.frames_received);

        let image = match decode_frame(payload) {
            Ok(image) => image,
            Err(e) => {
                StatsCounters::bump(&self.shared.stats.frames_dropped);
                warn!(bytes = payload.len(), error = %e, "Dropping undecodable frame");
                return false;
            }
        };

        let (width, height) = (image.width(), image.height());
        let evicted = {
            let mut state = self.shared.state.lock();
            state.frames.store_latest(image)
        };
        drop(evicted);

        StatsCounters::bump(&self.shared.stats.frames_decoded);
        trace!(bytes = payload.len(), width, height, "Stored latest frame");
        true
    }

    /// Decode `payload` on the blocking pool and store it as the latest frame.
    ///
    /// Same contract as [`on_binary_message`](Self::on_binary_message), but
    /// the decode never occupies a runtime worker. If the returned future is
    /// dropped early the decode still runs to completion.
    pub async fn ingest_frame(&self, payload: Vec<u8>) -> bool {
        let relay = self.clone();
        match tokio::task::spawn_blocking(move || relay.on_binary_message(&payload)).await {
            Ok(stored) => stored,
            Err(e) => {
                error!(error = %e, "Frame decode task failed");
                false
            }
        }
    }

    /// Log a text message from the client.
    pub fn on_text_message(&self, payload: &str) {
        StatsCounters::bump(&self.shared.stats.texts_received);
        debug!(bytes = payload.len(), text = %payload, "Received non-binary message");
    }

    /// Promote the latest frame to current.
    ///
    /// Returns `true` if a frame newer than current was waiting; otherwise
    /// current is left unchanged.
    pub fn capture_latest(&self) -> bool {
        let captured = self.shared.state.lock().frames.capture();
        if captured {
            StatsCounters::bump(&self.shared.stats.captures);
        }
        captured
    }

    /// An independent copy of the current frame.
    pub fn current_image(&self) -> Option<DecodedImage> {
        let record = self.shared.state.lock().frames.current().cloned();
        record.map(|record| record.image.clone())
    }

    /// Sequence number of the current frame, if any.
    pub fn current_sequence(&self) -> Option<u64> {
        self.shared.state.lock().frames.current().map(|record| record.sequence)
    }

    /// Send `payload` as a text frame to the attached client.
    ///
    /// Without a live client this does nothing and returns
    /// [`Delivery::NoClient`]. If the client's queue is full the record is
    /// discarded and [`Delivery::Dropped`] is returned. Write failures surface
    /// in the session task and are logged there.
    pub fn send_text(&self, payload: impl Into<String>) -> Delivery {
        let Some(conn) = self.shared.state.lock().connection.clone() else {
            return Delivery::NoClient;
        };

        match conn.outbound.try_send(payload.into()) {
            Ok(()) => {
                StatsCounters::bump(&self.shared.stats.texts_sent);
                Delivery::Queued
            }
            Err(TrySendError::Full(_)) => {
                StatsCounters::bump(&self.shared.stats.texts_dropped);
                warn!(connection_id = conn.id, "Client is not reading, dropping text frame");
                Delivery::Dropped
            }
            Err(TrySendError::Closed(_)) => {
                debug!(connection_id = conn.id, "Send target is gone, dropping text frame");
                Delivery::NoClient
            }
        }
    }

    /// Whether a live client is attached.
    pub fn is_connected(&self) -> bool {
        self.shared.state.lock().connection.as_ref().is_some_and(ConnectionRef::is_alive)
    }

    /// Snapshot of the relay counters.
    pub fn stats(&self) -> RelayStats {
        self.shared.stats.snapshot()
    }
}
