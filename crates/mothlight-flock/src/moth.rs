//! Per-moth record: pose, motion state and persistent smoothing state.

use glam::Vec3;
use mothlight_common::{LampId, MothId, Pose, TargetId};
use serde::{Deserialize, Serialize};

/// Fixed-radius circular hover around a lamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Orbit {
    /// Lamp being orbited
    pub center: LampId,
    /// Ring radius
    pub radius: f32,
    /// +1 or -1
    pub spin: f32,
    /// Current phase in radians
    pub angle: f32,
}

/// What a moth is doing this tick. Exactly one at a time.
///
/// The orbit record lives inside [`MotionState::Orbiting`], so a moth has an
/// orbit center if and only if it is orbiting.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum MotionState {
    /// No lamp to seek and nothing else to do
    #[default]
    Idle,
    /// Approaching the nearest lamp
    Seeking,
    /// Circling a lamp
    Orbiting(Orbit),
    /// Trailing an externally imposed target
    FollowingForced,
    /// Holding a slot in the line behind the player
    FollowingLine,
}

impl MotionState {
    /// Short label for logs and HUDs.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Seeking => "seeking",
            Self::Orbiting(_) => "orbiting",
            Self::FollowingForced => "following-forced",
            Self::FollowingLine => "following-line",
        }
    }

    /// The orbit record, if orbiting.
    #[must_use]
    pub fn orbit(&self) -> Option<&Orbit> {
        match self {
            Self::Orbiting(orbit) => Some(orbit),
            _ => None,
        }
    }
}

/// Spring velocities, one per behavior.
///
/// Each behavior keeps its own so that switching behavior never inherits a
/// velocity tuned for a different target.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SmoothingState {
    /// Seek spring velocity
    pub seek: Vec3,
    /// Orbit spring velocity
    pub orbit: Vec3,
    /// Forced-follow spring velocity
    pub forced: Vec3,
}

/// One simulated moth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Moth {
    id: MothId,
    /// Current world pose
    pub pose: Pose,
    pub(crate) state: MotionState,
    pub(crate) seek_target: Option<LampId>,
    pub(crate) seek_elapsed: f32,
    pub(crate) velocity: SmoothingState,
    pub(crate) forced_target: Option<TargetId>,
    pub(crate) forced_offset: Option<Vec3>,
    pub(crate) inside_roam_box: bool,
}

impl Moth {
    /// Creates an idle moth at `pose`.
    #[must_use]
    pub fn new(id: MothId, pose: Pose) -> Self {
        Self {
            id,
            pose,
            state: MotionState::Idle,
            seek_target: None,
            seek_elapsed: 0.0,
            velocity: SmoothingState::default(),
            forced_target: None,
            forced_offset: None,
            inside_roam_box: false,
        }
    }

    /// Returns the moth's ID.
    #[must_use]
    pub const fn id(&self) -> MothId {
        self.id
    }

    /// Returns the current world position.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.pose.position
    }

    /// Returns the current motion state.
    #[must_use]
    pub fn state(&self) -> &MotionState {
        &self.state
    }

    /// Returns the orbit record, if orbiting.
    #[must_use]
    pub fn orbit(&self) -> Option<&Orbit> {
        self.state.orbit()
    }

    /// Lamp currently being approached.
    #[must_use]
    pub fn seek_target(&self) -> Option<LampId> {
        self.seek_target
    }

    /// Time spent continuously seeking the current lamp.
    #[must_use]
    pub fn seek_elapsed(&self) -> f32 {
        self.seek_elapsed
    }

    /// Registered forced target, live or not.
    #[must_use]
    pub fn forced_target(&self) -> Option<TargetId> {
        self.forced_target
    }

    /// Whether a roam-box trigger last reported this moth inside.
    #[must_use]
    pub fn marked_inside_roam_box(&self) -> bool {
        self.inside_roam_box
    }

    /// Spring velocities.
    #[must_use]
    pub fn velocity(&self) -> &SmoothingState {
        &self.velocity
    }

    /// Drops the orbit, if any, along with its spring velocity.
    pub(crate) fn drop_orbit(&mut self) {
        if matches!(self.state, MotionState::Orbiting(_)) {
            self.state = MotionState::Seeking;
        }
        self.velocity.orbit = Vec3::ZERO;
    }

    /// Forgets the seek target and its timer.
    pub(crate) fn clear_seek(&mut self) {
        self.seek_target = None;
        self.seek_elapsed = 0.0;
        self.velocity.seek = Vec3::ZERO;
    }

    /// Clears every transient motion record.
    ///
    /// The forced offset survives so a moth keeps its slot across sessions.
    pub fn reset_motion(&mut self) {
        self.state = MotionState::Idle;
        self.seek_target = None;
        self.seek_elapsed = 0.0;
        self.velocity = SmoothingState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orbiting_moth() -> Moth {
        let mut moth = Moth::new(MothId::new(1), Pose::at(Vec3::ZERO));
        moth.state = MotionState::Orbiting(Orbit {
            center: LampId::new(4),
            radius: 0.5,
            spin: 1.0,
            angle: 0.0,
        });
        moth.seek_target = Some(LampId::new(4));
        moth.seek_elapsed = 1.0;
        moth.velocity.orbit = Vec3::ONE;
        moth.velocity.forced = Vec3::ONE;
        moth.forced_offset = Some(Vec3::new(0.1, 0.4, -2.2));
        moth
    }

    #[test]
    fn test_orbit_present_only_while_orbiting() {
        let mut moth = orbiting_moth();
        assert_eq!(moth.orbit().map(|o| o.center), Some(LampId::new(4)));

        moth.drop_orbit();
        assert_eq!(*moth.state(), MotionState::Seeking);
        assert!(moth.orbit().is_none());
        assert_eq!(moth.velocity().orbit, Vec3::ZERO);
    }

    #[test]
    fn test_reset_keeps_forced_offset() {
        let mut moth = orbiting_moth();
        moth.reset_motion();

        assert_eq!(*moth.state(), MotionState::Idle);
        assert!(moth.seek_target().is_none());
        assert_eq!(moth.seek_elapsed(), 0.0);
        assert_eq!(*moth.velocity(), SmoothingState::default());
        assert_eq!(moth.forced_offset, Some(Vec3::new(0.1, 0.4, -2.2)));
    }

    #[test]
    fn test_state_labels() {
        assert_eq!(MotionState::Idle.label(), "idle");
        assert_eq!(MotionState::FollowingLine.label(), "following-line");
    }
}
