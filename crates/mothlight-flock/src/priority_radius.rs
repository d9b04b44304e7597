//! Stalker priority radius.
//!
//! Pins every moth that wanders within `radius` of a stalker onto it as a
//! forced target, and releases moths that leave. Distance is measured to the
//! stalker itself, never lane-locked, so a stalker cannot pull moths across
//! the whole lane.

use crate::controller::FlockController;
use crate::world::FlockWorld;
use mothlight_common::{FlockResult, MothId, TargetId};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Settings for a [`PriorityRadius`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorityRadiusConfig {
    /// World-space capture radius
    pub radius: f32,
    /// Seconds between evaluations
    pub tick_interval: f32,
    /// Measure distance on the ground plane only
    pub ignore_y: bool,
}

impl Default for PriorityRadiusConfig {
    fn default() -> Self {
        Self {
            radius: 6.0,
            tick_interval: 0.1,
            ignore_y: false,
        }
    }
}

/// Capture radius around one stalker target.
#[derive(Debug, Clone)]
pub struct PriorityRadius {
    target: TargetId,
    config: PriorityRadiusConfig,
    timer: f32,
    inside: Vec<MothId>,
    enabled: bool,
}

impl PriorityRadius {
    /// Creates an enabled radius around `target`.
    #[must_use]
    pub fn new(target: TargetId, config: PriorityRadiusConfig) -> Self {
        Self {
            target,
            config,
            timer: 0.0,
            inside: Vec::new(),
            enabled: true,
        }
    }

    /// The stalker target.
    #[must_use]
    pub fn target(&self) -> TargetId {
        self.target
    }

    /// Moths this radius currently holds.
    #[must_use]
    pub fn captured(&self) -> &[MothId] {
        &self.inside
    }

    /// Advances the evaluation timer and, when due, captures or releases moths.
    pub fn update<W: FlockWorld + ?Sized>(
        &mut self,
        flock: &mut FlockController,
        world: &W,
        dt: f32,
    ) -> FlockResult<()> {
        if !self.enabled {
            return Ok(());
        }
        let Some(target_pose) = world.target_pose(self.target) else {
            // A dead stalker holds nobody; start over empty once it is back
            for id in self.inside.drain(..) {
                flock.clear_forced_light_target(id, Some(self.target))?;
            }
            return Ok(());
        };

        self.timer += dt;
        if self.timer < self.config.tick_interval {
            return Ok(());
        }
        self.timer = 0.0;

        let mut center = target_pose.position;
        if self.config.ignore_y {
            center.y = 0.0;
        }
        let r2 = self.config.radius * self.config.radius;

        let positions: Vec<_> = flock.moths().iter().map(|m| (m.id(), m.position())).collect();
        for (id, mut pos) in positions {
            if self.config.ignore_y {
                pos.y = 0.0;
            }

            let now_inside = pos.distance_squared(center) <= r2;
            let was_inside = self.inside.contains(&id);

            if now_inside && !was_inside {
                self.inside.push(id);
                flock.force_light_target(id, self.target)?;
            } else if !now_inside && was_inside {
                self.inside.retain(|&m| m != id);
                flock.clear_forced_light_target(id, Some(self.target))?;
            }
        }
        Ok(())
    }

    /// Releases every captured moth and stops evaluating.
    pub fn disable(&mut self, flock: &mut FlockController) -> FlockResult<()> {
        self.enabled = false;
        debug!("Priority radius on target {} releasing {} moths", self.target.raw(), self.inside.len());
        for id in self.inside.drain(..) {
            flock.clear_forced_light_target(id, Some(self.target))?;
        }
        Ok(())
    }

    /// Resumes evaluation.
    pub fn enable(&mut self) {
        self.enabled = true;
        self.timer = 0.0;
    }
}
