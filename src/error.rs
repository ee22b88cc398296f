//! Error types for the pose relay.
//!
//! Setup-time failures (binding the listen port, reading camera settings,
//! wiring components together) are returned to the caller as [`RelayError`].
//! Steady-state failures on the network path (a frame that does not decode, a
//! send to a client that has gone away) are absorbed inside the relay and only
//! reported through `tracing`; they never surface here as returned errors.
//!
//! ## Error Categories
//!
//! - **Bind Errors**: the listen address could not be bound
//! - **Configuration Errors**: missing or malformed calibration settings
//! - **Wiring Errors**: a camera or publisher used without an attached relay,
//!   or before `set_up` succeeded
//! - **Entity Errors**: a tracked entity reference that no longer exists
//!
//! ```rust
//! use pose_relay::RelayError;
//!
//! let error = RelayError::not_attached("camera color_camera");
//! assert!(error.is_fatal());
//! for suggestion in error.recovery_suggestions() {
//!     println!("  - {}", suggestion);
//! }
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for relay operations.
pub type Result<T, E = RelayError> = std::result::Result<T, E>;

/// Main error type for relay operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RelayError {
    #[error("Failed to bind relay listener on {addr}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration for {component}: {reason}")]
    Config { component: String, reason: String },

    #[error("Could not read settings file: {path}")]
    Settings {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in {context}: {details}")]
    Parse { context: String, details: String },

    #[error("No relay attached to {component}")]
    NotAttached { component: String },

    #[error("{component} has not been set up")]
    NotConfigured { component: String },

    #[error("Invalid tracked entity: {reason}")]
    InvalidEntity { reason: String },

    #[error("Failed to decode image frame ({bytes} bytes): {details}")]
    Decode { bytes: usize, details: String },
}

impl RelayError {
    /// Returns whether this error should stop the component from being used.
    ///
    /// Decode failures are transient: the relay drops the frame and keeps the
    /// previous image. Everything else happens during setup.
    pub fn is_fatal(&self) -> bool {
        match self {
            RelayError::Bind { .. } => true,
            RelayError::Config { .. } => true,
            RelayError::Settings { .. } => true,
            RelayError::Parse { .. } => true,
            RelayError::NotAttached { .. } => true,
            RelayError::NotConfigured { .. } => true,
            RelayError::InvalidEntity { .. } => true,
            RelayError::Decode { .. } => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            RelayError::Bind { .. } => vec![
                "Check that no other process is listening on the port",
                "Choose a different port",
                "Check permissions for privileged ports",
            ],
            RelayError::Config { .. } => vec![
                "Check that the settings contain an 'intrinsics' record",
                "Verify fu, fv, ppu, ppv, width and height are present",
            ],
            RelayError::Settings { .. } => vec![
                "Check the settings file exists and is readable",
                "Check file permissions",
            ],
            RelayError::Parse { .. } => {
                vec!["Check the settings file is valid YAML", "Verify numeric field types"]
            }
            RelayError::NotAttached { .. } => {
                vec!["Attach a relay handle before calling set_up", "Start the relay server first"]
            }
            RelayError::NotConfigured { .. } => vec!["Call set_up and check its result first"],
            RelayError::InvalidEntity { .. } => {
                vec!["Keep the entity alive while it is registered", "Register a live entity"]
            }
            RelayError::Decode { .. } => vec![
                "Check the client sends JPEG or PNG encoded frames",
                "Check frames are sent as binary, not text",
            ],
        }
    }

    /// Helper constructor for bind errors.
    pub fn bind_failed(addr: SocketAddr, source: std::io::Error) -> Self {
        RelayError::Bind { addr, source }
    }

    /// Helper constructor for configuration errors.
    pub fn config(component: impl Into<String>, reason: impl Into<String>) -> Self {
        RelayError::Config { component: component.into(), reason: reason.into() }
    }

    /// Helper constructor for settings file errors with path context.
    pub fn settings_error(path: PathBuf, source: std::io::Error) -> Self {
        RelayError::Settings { path, source }
    }

    /// Helper constructor for missing relay attachment.
    pub fn not_attached(component: impl Into<String>) -> Self {
        RelayError::NotAttached { component: component.into() }
    }

    /// Helper constructor for use before a successful `set_up`.
    pub fn not_configured(component: impl Into<String>) -> Self {
        RelayError::NotConfigured { component: component.into() }
    }

    /// Helper constructor for invalid entity references.
    pub fn invalid_entity(reason: impl Into<String>) -> Self {
        RelayError::InvalidEntity { reason: reason.into() }
    }
}
