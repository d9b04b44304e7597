//! Forced-target overrides.
//!
//! Stalkers and priority radii can pin a moth to a target of their own. The
//! registration is checked for liveness on every read and silently dropped
//! once the target is gone.

use crate::config::FlockConfig;
use crate::moth::Moth;
use crate::world::FlockWorld;
use glam::Vec3;
use mothlight_common::{MothId, Pose, TargetId};
use tracing::debug;

const OFFSET_BITS: u64 = 20;
const OFFSET_MASK: u64 = (1 << OFFSET_BITS) - 1;
const MAX_BACK_JITTER: f32 = 0.6;

/// SplitMix64 finalizer.
fn mix(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}

fn unit(bits: u64) -> f32 {
    (bits & OFFSET_MASK) as f32 / OFFSET_MASK as f32
}

/// Local-frame follow offset for a moth, derived from its identity.
///
/// `x` fans out sideways within `forced_side_spread`, `y` hovers at
/// `forced_hover_y` and `z` trails behind the target by
/// `forced_follow_distance` plus up to 0.6 of jitter. Distinct ids get
/// distinct offsets, so moths sharing a target do not stack.
#[must_use]
pub fn forced_offset(id: MothId, config: &FlockConfig) -> Vec3 {
    let h = mix(u64::from(id.raw()));
    let side = unit(h) * 2.0 - 1.0;
    let back_jitter = unit(h >> OFFSET_BITS) * MAX_BACK_JITTER;

    Vec3::new(
        side * config.forced_side_spread,
        config.forced_hover_y,
        -(config.forced_follow_distance + back_jitter),
    )
}

impl Moth {
    /// Registers or overwrites the forced target.
    pub fn set_forced(&mut self, target: TargetId) {
        if self.forced_target != Some(target) {
            debug!("{} forced onto target {}", self.id(), target.raw());
        }
        self.forced_target = Some(target);
    }

    /// Clears the forced target.
    ///
    /// With `Some(target)` the registration is only cleared if it still names
    /// that target, so a late exit from one source cannot undo a newer enter
    /// from another. The follow offset is kept. Returns whether anything was
    /// cleared.
    pub fn clear_forced(&mut self, target: Option<TargetId>) -> bool {
        let matches = match (self.forced_target, target) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(current), Some(expected)) => current == expected,
        };

        if matches {
            self.forced_target = None;
            self.velocity.forced = Vec3::ZERO;
            debug!("{} forced target cleared", self.id());
        }
        matches
    }

    /// The forced target and its pose, if registered and still live.
    ///
    /// A stale registration is cleared on the way out.
    pub fn live_forced<W: FlockWorld + ?Sized>(&mut self, world: &W) -> Option<(TargetId, Pose)> {
        let target = self.forced_target?;
        match world.target_pose(target) {
            Some(pose) => Some((target, pose)),
            None => {
                debug!("{} forced target {} no longer live", self.id(), target.raw());
                self.clear_forced(None);
                None
            },
        }
    }

    /// The cached follow offset, derived on first use.
    pub(crate) fn forced_offset_or_init(&mut self, config: &FlockConfig) -> Vec3 {
        let id = self.id();
        *self
            .forced_offset
            .get_or_insert_with(|| forced_offset(id, config))
    }
}
