//! Pose publishing back to the client.
//!
//! After every tracking cycle a [`Publisher`] reports the pose of each
//! registered [`TrackedEntity`]. [`WebSocketPublisher`] formats each pose as a
//! two-line text record and hands it to a [`TextSink`], normally the relay:
//!
//! ```text
//! T <tx> <ty> <tz>
//! R <qx> <qy> <qz> <qw>
//! ```
//!
//! The registry holds weak references; entities are owned by the tracker.

mod entity;

pub use entity::{PoseEntity, TrackedEntity};

use std::sync::{Arc, Weak};
use tracing::{debug, info, trace, warn};

use crate::server::{Delivery, RelayHandle};
use crate::{RelayError, Result};

/// Destination for outbound text records.
pub trait TextSink: Send + Sync {
    fn send_text(&self, payload: String) -> Delivery;
}

impl TextSink for RelayHandle {
    fn send_text(&self, payload: String) -> Delivery {
        RelayHandle::send_text(self, payload)
    }
}

/// A per-cycle output stage of the tracker.
pub trait Publisher: Send {
    fn name(&self) -> &str;

    fn set_up(&mut self) -> Result<()>;

    /// Publish the state of `iteration`. Returns the number of records sent.
    fn update_publisher(&mut self, iteration: u64) -> Result<usize>;

    fn is_set_up(&self) -> bool;
}

/// Publishes entity poses as text frames through the relay.
pub struct WebSocketPublisher {
    name: String,
    sink: Option<Arc<dyn TextSink>>,
    entities: Vec<Weak<dyn TrackedEntity>>,
    set_up: bool,
}

impl WebSocketPublisher {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), sink: None, entities: Vec::new(), set_up: false }
    }

    pub fn with_relay(mut self, relay: RelayHandle) -> Self {
        self.attach_relay(relay);
        self
    }

    pub fn attach_relay(&mut self, relay: RelayHandle) {
        self.attach_sink(Arc::new(relay));
    }

    /// Attach any text sink in place of a relay.
    pub fn attach_sink(&mut self, sink: Arc<dyn TextSink>) {
        self.sink = Some(sink);
    }

    /// Register an entity whose pose is sent every cycle.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::InvalidEntity`] if `entity` no longer points to
    /// a live entity; the registry is left unchanged.
    pub fn add_entity(&mut self, entity: Weak<dyn TrackedEntity>) -> Result<()> {
        let Some(live) = entity.upgrade() else {
            return Err(RelayError::invalid_entity(format!(
                "entity reference for publisher {} is dangling",
                self.name
            )));
        };

        debug!(publisher = %self.name, entity = %live.name(), "Entity added");
        self.entities.push(entity);
        Ok(())
    }

    pub fn clear_entities(&mut self) {
        self.entities.clear();
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }
}

impl Publisher for WebSocketPublisher {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_up(&mut self) -> Result<()> {
        if self.sink.is_none() {
            warn!(publisher = %self.name, "Relay not attached");
            self.set_up = false;
            return Err(RelayError::not_attached(format!("publisher {}", self.name)));
        }

        self.set_up = true;
        info!(publisher = %self.name, entities = self.entities.len(), "Publisher set up");
        Ok(())
    }

    fn update_publisher(&mut self, iteration: u64) -> Result<usize> {
        let Some(sink) = self.sink.as_ref() else {
            debug!(publisher = %self.name, iteration, "No relay attached, skipping publish");
            return Ok(0);
        };

        let mut sent = 0;
        for entity in &self.entities {
            let Some(entity) = entity.upgrade() else {
                debug!(publisher = %self.name, iteration, "Skipping dropped entity");
                continue;
            };

            let record = entity.world_pose().to_record();
            let delivery = sink.send_text(record);
            trace!(publisher = %self.name, entity = %entity.name(), iteration, ?delivery, "Pose sent");
            sent += 1;
        }

        Ok(sent)
    }

    fn is_set_up(&self) -> bool {
        self.set_up
    }
}
