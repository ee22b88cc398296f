//! WebSocket relay server
//!
//! The server ingests encoded image frames from one client and sends pose
//! records back to it.
//!
//! # Architecture
//!
//! ```text
//!    client ──binary──► session task ──decode──► RelayHandle ◄── capture_latest()
//!       ▲                    │                  ┌──────────┐      current_image()
//!       │                    │                  │ frames   │      (consumer thread)
//!       └──────text──────────┘◄── outbound ─────│ conn ref │◄──── send_text()
//!                                               └──────────┘
//! ```
//!
//! [`RelayServer`] owns the accept loop task; [`RelayHandle`] is the
//! cloneable, thread-safe view the consumer uses.
//!
//! Decoding runs on tokio's blocking pool. The outbound queue is bounded per
//! session ([`RelayConfig::outbound_capacity`]); records beyond it are dropped.

pub mod config;
mod listener;
pub mod relay;
mod session;
pub mod stats;

pub use config::{DEFAULT_PORT, RelayConfig};
pub use listener::RelayServer;
pub use relay::{ConnectionRef, Delivery, RelayHandle};
pub use stats::RelayStats;
