//! Nearest-lamp lookup.
//!
//! A linear scan over the lamps the world reports this tick. Lamp counts are
//! small, so there is no spatial index.

use crate::world::Lamp;
use glam::Vec3;

/// Pins `point.x` to `lane_x` when a lane lock is active.
#[must_use]
pub fn lane_locked(point: Vec3, lane_x: Option<f32>) -> Vec3 {
    match lane_x {
        Some(x) => Vec3::new(x, point.y, point.z),
        None => point,
    }
}

/// Finds the lamp nearest to `point`.
///
/// Lamp positions are lane-locked before measuring. Ties keep the first lamp
/// in iteration order.
#[must_use]
pub fn find_nearest(lamps: &[Lamp], point: Vec3, lane_x: Option<f32>) -> Option<Lamp> {
    let mut best: Option<(Lamp, f32)> = None;

    for lamp in lamps {
        let d2 = lane_locked(lamp.position, lane_x).distance_squared(point);
        match best {
            Some((_, best_d2)) if d2 >= best_d2 => {},
            _ => best = Some((*lamp, d2)),
        }
    }

    best.map(|(lamp, _)| lamp)
}
