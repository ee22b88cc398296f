//! Pull-based camera backed by the relay.
//!
//! A tracker polls cameras through the [`ColorCamera`] trait: set up once,
//! then fetch the newest frame every cycle. [`WebSocketCamera`] implements it
//! on top of a [`RelayHandle`]: each fetch captures the relay's latest frame
//! and keeps a private copy of it.
//!
//! # Example
//!
//! ```rust
//! use pose_relay::camera::{ColorCamera, SettingsSource, WebSocketCamera};
//! use pose_relay::RelayHandle;
//!
//! let settings = SettingsSource::inline(
//!     "intrinsics: {fu: 600, fv: 600, ppu: 320, ppv: 240, width: 640, height: 480}",
//! );
//! let mut camera = WebSocketCamera::new("color_camera", settings).with_relay(RelayHandle::new());
//!
//! camera.set_up()?;
//! camera.update_image(true)?;
//! assert!(camera.image().is_none()); // nothing received yet
//! # Ok::<(), pose_relay::RelayError>(())
//! ```

pub mod settings;

pub use settings::{SettingsSource, preprocess_settings_yaml, read_intrinsics};

use tracing::{debug, info, trace, warn};

use crate::server::RelayHandle;
use crate::types::{DecodedImage, Intrinsics};
use crate::{RelayError, Result};

/// A colour camera polled once per tracking cycle.
pub trait ColorCamera: Send {
    fn name(&self) -> &str;

    /// Validate configuration and make the camera usable.
    fn set_up(&mut self) -> Result<()>;

    /// Fetch the newest available frame.
    ///
    /// `synchronized` asks for a frame captured in step with the caller;
    /// sources that cannot synchronize may ignore it.
    fn update_image(&mut self, synchronized: bool) -> Result<()>;

    /// The frame from the last successful `update_image`.
    fn image(&self) -> Option<&DecodedImage>;

    fn intrinsics(&self) -> Option<&Intrinsics>;

    fn is_set_up(&self) -> bool;
}

/// Camera whose frames arrive from a remote client through the relay.
#[derive(Debug)]
pub struct WebSocketCamera {
    name: String,
    settings: SettingsSource,
    relay: Option<RelayHandle>,
    intrinsics: Option<Intrinsics>,
    image: Option<DecodedImage>,
    set_up: bool,
}

impl WebSocketCamera {
    pub fn new(name: impl Into<String>, settings: SettingsSource) -> Self {
        Self {
            name: name.into(),
            settings,
            relay: None,
            intrinsics: None,
            image: None,
            set_up: false,
        }
    }

    pub fn with_relay(mut self, relay: RelayHandle) -> Self {
        self.relay = Some(relay);
        self
    }

    /// Attach (or replace) the relay this camera reads from.
    pub fn attach_relay(&mut self, relay: RelayHandle) {
        self.relay = Some(relay);
    }

    fn component(&self) -> String {
        format!("camera {}", self.name)
    }
}

impl ColorCamera for WebSocketCamera {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_up(&mut self) -> Result<()> {
        self.set_up = false;

        let intrinsics = read_intrinsics(&self.settings).inspect_err(|e| {
            warn!(camera = %self.name, settings = %self.settings, error = %e, "Could not read camera settings");
        })?;

        if self.relay.is_none() {
            warn!(camera = %self.name, "Relay not attached");
            return Err(RelayError::not_attached(self.component()));
        }

        self.intrinsics = Some(intrinsics);
        self.set_up = true;
        info!(
            camera = %self.name,
            width = intrinsics.width,
            height = intrinsics.height,
            "Camera set up"
        );

        self.update_image(true)
    }

    fn update_image(&mut self, synchronized: bool) -> Result<()> {
        if !self.set_up {
            debug!(camera = %self.name, "update_image called before set_up");
            return Err(RelayError::not_configured(self.component()));
        }
        let Some(relay) = self.relay.as_ref() else {
            return Err(RelayError::not_attached(self.component()));
        };

        let captured = relay.capture_latest();
        if let Some(image) = relay.current_image() {
            self.image = Some(image);
        }

        trace!(camera = %self.name, synchronized, captured, "Updated image");
        Ok(())
    }

    fn image(&self) -> Option<&DecodedImage> {
        self.image.as_ref()
    }

    fn intrinsics(&self) -> Option<&Intrinsics> {
        self.intrinsics.as_ref()
    }

    fn is_set_up(&self) -> bool {
        self.set_up
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_frame;
    use image::ImageFormat;

    const SETTINGS: &str = "intrinsics: {fu: 600, fv: 600, ppu: 320, ppv: 240, width: 640, height: 480}";

    fn camera() -> WebSocketCamera {
        WebSocketCamera::new("color_camera", SettingsSource::inline(SETTINGS))
    }

    fn push(relay: &RelayHandle, rgb: [u8; 3]) {
        let image = DecodedImage::filled(8, 8, rgb).unwrap();
        assert!(relay.on_binary_message(&encode_frame(&image, ImageFormat::Png).unwrap()));
    }

    #[test]
    fn set_up_requires_relay() {
        let mut camera = camera();

        let err = camera.set_up().unwrap_err();
        assert!(matches!(err, RelayError::NotAttached { .. }));
        assert!(!camera.is_set_up());
    }

    #[test]
    fn set_up_requires_intrinsics() {
        let mut camera = WebSocketCamera::new("broken", SettingsSource::inline("name: broken\n"))
            .with_relay(RelayHandle::new());

        let err = camera.set_up().unwrap_err();
        assert!(matches!(err, RelayError::Config { .. }));
        assert!(!camera.is_set_up());
        assert!(camera.intrinsics().is_none());
    }

    #[test]
    fn update_before_set_up_fails() {
        let mut camera = camera().with_relay(RelayHandle::new());

        let err = camera.update_image(true).unwrap_err();
        assert!(matches!(err, RelayError::NotConfigured { .. }));
    }

    #[test]
    fn set_up_fetches_an_initial_frame() {
        let relay = RelayHandle::new();
        push(&relay, [0, 0, 255]);

        let mut camera = camera().with_relay(relay);
        camera.set_up().unwrap();

        assert_eq!(camera.intrinsics().unwrap().width, 640);
        assert_eq!(camera.image().unwrap().pixel(0, 0), Some(&[0u8, 0, 255][..]));
    }

    #[test]
    fn update_follows_latest_frame() {
        let relay = RelayHandle::new();
        let mut camera = camera().with_relay(relay.clone());
        camera.set_up().unwrap();
        assert!(camera.image().is_none());

        push(&relay, [1, 1, 1]);
        push(&relay, [2, 2, 2]);
        camera.update_image(false).unwrap();
        assert_eq!(camera.image().unwrap().pixel(0, 0), Some(&[2u8, 2, 2][..]));

        // Nothing new: the frame stays
        camera.update_image(true).unwrap();
        assert_eq!(camera.image().unwrap().pixel(0, 0), Some(&[2u8, 2, 2][..]));
    }

    #[test]
    fn synchronized_flag_does_not_change_result() {
        let relay = RelayHandle::new();
        let mut a = camera().with_relay(relay.clone());
        let mut b = camera().with_relay(relay.clone());
        a.set_up().unwrap();
        b.set_up().unwrap();

        push(&relay, [5, 6, 7]);
        a.update_image(true).unwrap();
        b.update_image(false).unwrap();

        assert_eq!(a.image(), b.image());
    }
}
