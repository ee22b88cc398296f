//! Pinhole camera calibration

use serde::Deserialize;

/// Pinhole intrinsics of the remote camera.
///
/// Focal lengths (`fu`, `fv`) and principal point (`ppu`, `ppv`) are in
/// pixels; `width`/`height` give the image size they were calibrated for.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Intrinsics {
    pub fu: f32,
    pub fv: f32,
    pub ppu: f32,
    pub ppv: f32,
    pub width: u32,
    pub height: u32,
}

impl Intrinsics {
    /// Check that the record describes a usable camera.
    ///
    /// Returns a description of the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.fu.is_finite() && self.fu > 0.0 && self.fv.is_finite() && self.fv > 0.0) {
            return Err(format!("focal lengths must be positive, got fu={} fv={}", self.fu, self.fv));
        }
        if !(self.ppu.is_finite() && self.ppv.is_finite()) {
            return Err("principal point must be finite".to_string());
        }
        if self.width == 0 || self.height == 0 {
            return Err(format!("image size must be non-zero, got {}x{}", self.width, self.height));
        }
        Ok(())
    }
}
