//! Run the relay by hand.
//!
//! ```text
//! pose-relay [PORT] [CAMERA_SETTINGS_YAML]
//! ```
//!
//! Polls the relay at 30 Hz, logs every new frame, and sends the pose of a
//! single static entity back to the client each cycle. Set `RUST_LOG` to
//! control verbosity (for example `RUST_LOG=pose_relay=debug`).

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use pose_relay::camera::{ColorCamera, SettingsSource, WebSocketCamera};
use pose_relay::publisher::{PoseEntity, Publisher, TrackedEntity, WebSocketPublisher};
use pose_relay::types::Pose;
use pose_relay::{DEFAULT_PORT, PoseRelay};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_SETTINGS: &str =
    "intrinsics: {fu: 615.0, fv: 615.0, ppu: 320.0, ppv: 240.0, width: 640, height: 480}";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut args = std::env::args().skip(1);
    let port = match args.next() {
        Some(port) => port.parse().with_context(|| format!("invalid port '{port}'"))?,
        None => DEFAULT_PORT,
    };
    let settings = match args.next() {
        Some(path) => SettingsSource::file(path),
        None => SettingsSource::inline(DEFAULT_SETTINGS),
    };

    let server = PoseRelay::start(port).await.context("failed to start relay")?;

    let mut camera = WebSocketCamera::new("color_camera", settings).with_relay(server.handle());
    camera.set_up().context("camera set-up failed")?;

    let body: Arc<dyn TrackedEntity> =
        Arc::new(PoseEntity::new("body", Pose::from_translation([0.0, 0.0, 0.5])));
    let mut publisher = WebSocketPublisher::new("publisher").with_relay(server.handle());
    publisher.add_entity(Arc::downgrade(&body))?;
    publisher.set_up().context("publisher set-up failed")?;

    let relay = server.handle();
    let mut ticker = tokio::time::interval(Duration::from_millis(33));
    let mut last_sequence = None;
    let mut iteration = 0u64;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = ticker.tick() => {
                camera.update_image(true)?;
                let sequence = relay.current_sequence();
                if sequence != last_sequence {
                    if let Some(image) = camera.image() {
                        info!(?sequence, width = image.width(), height = image.height(), "New frame");
                    }
                    last_sequence = sequence;
                }
                publisher.update_publisher(iteration)?;
                iteration += 1;
            }
        }
    }

    info!(stats = ?relay.stats(), "Shutting down");
    server.stop().await;
    Ok(())
}
