//! Per-client WebSocket session

use std::net::SocketAddr;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use super::relay::{ConnectionRef, RelayHandle};

/// How long a closing session may spend sending its close frame.
const CLOSE_TIMEOUT: Duration = Duration::from_millis(250);

/// Per-session limits taken from the server configuration.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SessionLimits {
    pub outbound_capacity: usize,
    pub write_timeout: Duration,
}

/// Run one client session until the client leaves or the relay stops.
///
/// The session owns the socket. The relay only keeps the sender of the
/// outbound queue, so dropping the receiver here marks the relay's
/// reference dead before the close is reported.
///
/// Every await in the loop is raced against `cancel`: a frame being decoded
/// or a write to a client that stopped reading never holds up shutdown.
pub(crate) async fn run_session(
    id: u64,
    stream: TcpStream,
    peer: SocketAddr,
    relay: RelayHandle,
    limits: SessionLimits,
    cancel: CancellationToken,
) {
    let handshake = tokio::select! {
        _ = cancel.cancelled() => {
            debug!(connection_id = id, %peer, "Relay stopping during handshake");
            return;
        }
        result = accept_async(stream) => result,
    };

    let ws = match handshake {
        Ok(ws) => ws,
        Err(e) => {
            warn!(connection_id = id, %peer, error = %e, "WebSocket handshake failed");
            return;
        }
    };

    let (outbound_tx, mut outbound_rx) = mpsc::channel::<String>(limits.outbound_capacity.max(1));
    relay.on_connection_opened(ConnectionRef::new(id, peer, outbound_tx));

    let (mut sink, mut source) = ws.split();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!(connection_id = id, "Closing session for shutdown");
                let _ = tokio::time::timeout(CLOSE_TIMEOUT, sink.send(Message::Close(None))).await;
                break;
            }
            // Disabled once the relay has moved on to a newer connection.
            Some(text) = outbound_rx.recv() => {
                let write = tokio::time::timeout(limits.write_timeout, sink.send(Message::Text(text)));
                tokio::select! {
                    _ = cancel.cancelled() => {
                        debug!(connection_id = id, "Abandoning pending write for shutdown");
                        break;
                    }
                    written = write => match written {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => {
                            warn!(connection_id = id, error = %e, "Send failed");
                            break;
                        }
                        Err(_) => {
                            warn!(
                                connection_id = id,
                                timeout_ms = limits.write_timeout.as_millis() as u64,
                                "Client stopped reading, closing session"
                            );
                            break;
                        }
                    },
                }
            }
            incoming = source.next() => match incoming {
                Some(Ok(Message::Binary(payload))) => {
                    trace!(connection_id = id, bytes = payload.len(), "Binary frame");
                    tokio::select! {
                        _ = cancel.cancelled() => {
                            debug!(connection_id = id, "Relay stopping during decode");
                            break;
                        }
                        _ = relay.ingest_frame(payload) => {}
                    }
                }
                Some(Ok(Message::Text(text))) => relay.on_text_message(&text),
                Some(Ok(Message::Close(frame))) => {
                    debug!(connection_id = id, ?frame, "Client sent close");
                    break;
                }
                Some(Ok(other)) => {
                    trace!(connection_id = id, kind = message_kind(&other), "Control frame");
                }
                Some(Err(e)) => {
                    debug!(connection_id = id, error = %e, "Read failed");
                    break;
                }
                None => break,
            },
        }
    }

    drop(outbound_rx);
    relay.on_connection_closed(id);
}

fn message_kind(message: &Message) -> &'static str {
    match message {
        Message::Text(_) => "text",
        Message::Binary(_) => "binary",
        Message::Ping(_) => "ping",
        Message::Pong(_) => "pong",
        Message::Close(_) => "close",
        Message::Frame(_) => "frame",
    }
}
