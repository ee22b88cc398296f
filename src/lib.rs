//! WebSocket relay between a remote camera client and a local tracker.
//!
//! A client (a phone, a headset, a browser) pushes encoded camera frames over a
//! WebSocket. The tracker polls the newest frame once per cycle and, once it
//! has estimated poses, sends them back to the same client as text records.
//!
//! # Features
//!
//! - **Latest-wins ingest**: frames that arrive faster than the tracker polls
//!   are coalesced; the tracker always sees the newest decoded frame
//! - **Non-blocking consumer API**: capture, read, and send are synchronous
//!   calls usable from any thread
//! - **Failure isolation**: undecodable frames and dead clients are logged and
//!   absorbed; the relay keeps running
//! - **Scoped shutdown**: [`RelayServer::stop`] returns only after the network
//!   task has exited
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use pose_relay::camera::{ColorCamera, SettingsSource, WebSocketCamera};
//! use pose_relay::publisher::{PoseEntity, Publisher, TrackedEntity, WebSocketPublisher};
//! use pose_relay::{PoseRelay, types::Pose};
//!
//! #[tokio::main]
//! async fn main() -> pose_relay::Result<()> {
//!     let server = PoseRelay::start(9002).await?;
//!
//!     let mut camera = WebSocketCamera::new("color_camera", SettingsSource::file("camera.yaml"))
//!         .with_relay(server.handle());
//!     camera.set_up()?;
//!
//!     let body: Arc<dyn TrackedEntity> = Arc::new(PoseEntity::new("body", Pose::identity()));
//!     let mut publisher = WebSocketPublisher::new("publisher").with_relay(server.handle());
//!     publisher.add_entity(Arc::downgrade(&body))?;
//!     publisher.set_up()?;
//!
//!     for iteration in 0..100 {
//!         camera.update_image(true)?;
//!         // ... track using camera.image() ...
//!         publisher.update_publisher(iteration)?;
//!     }
//!
//!     server.stop().await;
//!     Ok(())
//! }
//! ```

pub mod buffer;
pub mod camera;
pub mod codec;
mod error;
pub mod publisher;
pub mod server;
pub mod types;

pub use error::*;
pub use server::{DEFAULT_PORT, Delivery, RelayConfig, RelayHandle, RelayServer, RelayStats};

/// Entry point for starting a relay.
pub struct PoseRelay;

impl PoseRelay {
    /// Start a relay listening on all interfaces at `port`.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Bind`] if the port cannot be bound.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use pose_relay::{PoseRelay, DEFAULT_PORT};
    ///
    /// # #[tokio::main]
    /// # async fn main() -> pose_relay::Result<()> {
    /// let server = PoseRelay::start(DEFAULT_PORT).await?;
    /// server.stop().await;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn start(port: u16) -> Result<RelayServer> {
        RelayServer::start(RelayConfig::with_port(port)).await
    }

    /// Start a relay with full configuration.
    pub async fn start_with_config(config: RelayConfig) -> Result<RelayServer> {
        RelayServer::start(config).await
    }
}
