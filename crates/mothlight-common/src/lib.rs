//! # Mothlight Common
//!
//! Common types, math, and shared abstractions for Mothlight.
//!
//! This crate provides foundational types used across the flock subsystem:
//! - ID types (MothId, LampId, TargetId, RoamBoxId)
//! - Poses and the smoothing/steering math
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod ids;
pub mod math;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::*;
    pub use crate::ids::*;
    pub use crate::math::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_moth_id_index_roundtrip() {
        let id = MothId::from_index(7);
        assert_eq!(id.index(), 7);
        assert_eq!(id, MothId::new(7));
    }

    #[test]
    fn test_pose_identity_transform() {
        let pose = Pose::new(Vec3::new(1.0, 2.0, 3.0), Vec3::Z);
        let p = pose.transform_point(Vec3::ZERO);
        assert!((p - Vec3::new(1.0, 2.0, 3.0)).length() < 1e-6);
    }

    #[test]
    fn test_error_display() {
        let err = FlockError::UnknownMoth(MothId::new(3));
        assert!(err.to_string().contains('3'));
    }
}
