//! Poses and the steering math shared by every flock behavior.
//!
//! Axis convention: `x` is the lateral lane axis, `y` is up and `z` is the
//! depth axis the player travels along.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Minimum smoothing time accepted by [`smooth_damp`].
pub const MIN_SMOOTH_TIME: f32 = 0.01;

/// Squared length below which a direction is treated as zero.
pub const DIRECTION_EPSILON_SQ: f32 = 1e-4;

/// Position plus facing of an entity in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// World position
    pub position: Vec3,
    /// Unit forward direction
    pub forward: Vec3,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            forward: Vec3::Z,
        }
    }
}

impl Pose {
    /// Creates a pose, normalizing `forward` (falls back to +Z).
    #[must_use]
    pub fn new(position: Vec3, forward: Vec3) -> Self {
        Self {
            position,
            forward: forward.try_normalize().unwrap_or(Vec3::Z),
        }
    }

    /// Creates a pose at `position` facing +Z.
    #[must_use]
    pub fn at(position: Vec3) -> Self {
        Self::new(position, Vec3::Z)
    }

    /// Right/up/forward basis of this pose's local frame.
    #[must_use]
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        let forward = self.forward.try_normalize().unwrap_or(Vec3::Z);
        let right = Vec3::Y.cross(forward).try_normalize().unwrap_or(Vec3::X);
        let up = forward.cross(right);
        (right, up, forward)
    }

    /// Maps a point from this pose's local frame into world space.
    ///
    /// Local `x` is right, `y` is up and `z` is forward, so a negative `z`
    /// lands behind the pose.
    #[must_use]
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        let (right, up, forward) = self.basis();
        self.position + right * local.x + up * local.y + forward * local.z
    }
}

/// Critically damped spring toward `target`.
///
/// `velocity` is the caller-owned spring state and must persist between
/// calls for the motion to stay continuous. The result never overshoots
/// the target.
pub fn smooth_damp(current: Vec3, target: Vec3, velocity: &mut Vec3, smooth_time: f32, dt: f32) -> Vec3 {
    if dt <= 0.0 {
        return current;
    }

    let smooth_time = smooth_time.max(MIN_SMOOTH_TIME);
    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    let exp = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let change = current - target;
    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * exp;
    let mut output = target + (change + temp) * exp;

    // Clamp if the spring carried us past the target
    if (target - current).dot(output - target) > 0.0 {
        output = target;
        *velocity = Vec3::ZERO;
    }

    output
}

/// Moves `current` toward `target` by at most `max_step`.
#[must_use]
pub fn move_towards(current: Vec3, target: Vec3, max_step: f32) -> Vec3 {
    let delta = target - current;
    let dist = delta.length();
    if dist <= max_step || dist < f32::EPSILON {
        target
    } else {
        current + delta / dist * max_step
    }
}

/// Linear interpolation with `t` clamped to `[0, 1]`.
#[must_use]
pub fn lerp_clamped(from: Vec3, to: Vec3, t: f32) -> Vec3 {
    from.lerp(to, t.clamp(0.0, 1.0))
}

/// Limits the length of `delta` to `max_len`.
#[must_use]
pub fn clamp_step(delta: Vec3, max_len: f32) -> Vec3 {
    let len = delta.length();
    if len > max_len && len > 1e-6 {
        delta / len * max_len
    } else {
        delta
    }
}

/// Drops the vertical component.
#[must_use]
pub fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Blends `forward` toward `desired` by `t` and renormalizes.
///
/// A near-zero `desired` leaves `forward` unchanged.
#[must_use]
pub fn turn_towards(forward: Vec3, desired: Vec3, t: f32) -> Vec3 {
    if desired.length_squared() <= DIRECTION_EPSILON_SQ {
        return forward;
    }
    let desired = desired.normalize();
    lerp_clamped(forward, desired, t).try_normalize().unwrap_or(desired)
}
