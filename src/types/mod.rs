//! Core value types shared by the relay, camera, and publisher.
//!
//! - [`DecodedImage`] is one decoded RGB frame, owned and never empty
//! - [`Pose`] is a rigid transform (translation + unit quaternion)
//! - [`Intrinsics`] is the pinhole calibration record a camera reads at set-up
//!
//! ## Usage Example
//!
//! ```rust
//! use pose_relay::types::Pose;
//!
//! let pose = Pose::from_translation([1.0, 0.0, 0.0]);
//! assert_eq!(pose.to_record(), "T 1 0 0\nR 0 0 0 1");
//! ```

mod decoded;
mod intrinsics;
mod pose;

pub use decoded::DecodedImage;
pub use intrinsics::Intrinsics;
pub use pose::Pose;
