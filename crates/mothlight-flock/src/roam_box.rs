//! Roam-box containment.
//!
//! Moths inside an active roam box are not recalled and cannot pass through
//! walls. Box activity is re-queried on every check, so switching every box
//! off lifts the constraint at once even without an exit notification.

use crate::config::FlockConfig;
use crate::moth::Moth;
use crate::world::FlockWorld;
use glam::Vec3;

const MIN_MOVE: f32 = 1e-4;

impl Moth {
    /// Records a trigger-volume enter (`true`) or exit (`false`).
    pub fn set_inside_roam_box(&mut self, inside: bool) {
        self.inside_roam_box = inside;
    }
}

/// Whether the moth is held by a roam box right now.
#[must_use]
pub fn is_constrained<W: FlockWorld + ?Sized>(moth: &Moth, world: &W, config: &FlockConfig) -> bool {
    config.block_walls_inside_roam_box && moth.inside_roam_box && world.any_roam_box_active()
}

/// Clamps a move from `from` to `to` against walls.
///
/// A blocked move stops `pullback` short of the hit point. Unconstrained
/// moves pass through untouched.
#[must_use]
pub fn constrain_move<W: FlockWorld + ?Sized>(
    constrained: bool,
    from: Vec3,
    to: Vec3,
    world: &W,
    pullback: f32,
) -> Vec3 {
    if !constrained {
        return to;
    }

    let delta = to - from;
    let dist = delta.length();
    if dist <= MIN_MOVE {
        return to;
    }

    let dir = delta / dist;
    match world.raycast_walls(from, dir, dist) {
        Some(hit) => hit - dir * pullback,
        None => to,
    }
}
