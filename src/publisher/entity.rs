//! Tracked entities

use parking_lot::Mutex;

use crate::types::Pose;

/// Something the tracker estimates a pose for.
pub trait TrackedEntity: Send + Sync {
    fn name(&self) -> &str;

    /// Current placement relative to the world frame.
    fn world_pose(&self) -> Pose;
}

/// A named entity whose pose is set directly by its owner.
#[derive(Debug)]
pub struct PoseEntity {
    name: String,
    pose: Mutex<Pose>,
}

impl PoseEntity {
    pub fn new(name: impl Into<String>, pose: Pose) -> Self {
        Self { name: name.into(), pose: Mutex::new(pose) }
    }

    pub fn set_pose(&self, pose: Pose) {
        *self.pose.lock() = pose;
    }
}

impl TrackedEntity for PoseEntity {
    fn name(&self) -> &str {
        &self.name
    }

    fn world_pose(&self) -> Pose {
        *self.pose.lock()
    }
}
