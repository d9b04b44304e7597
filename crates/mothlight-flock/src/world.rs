//! World queries the flock consumes, plus an in-memory level.
//!
//! The flock does not own entity discovery. Each tick it asks a
//! [`FlockWorld`] for the player, the live lamps, roam-box activity, forced
//! target poses and wall hits. [`SimWorld`] is a self-contained
//! implementation used by tests and the headless runner.

use glam::Vec3;
use mothlight_common::{LampId, Pose, RoamBoxId, TargetId};
use std::collections::HashMap;

/// A static attractor moths seek and orbit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lamp {
    /// Lamp identity
    pub id: LampId,
    /// World position
    pub position: Vec3,
}

/// World interface for the flock controller.
pub trait FlockWorld {
    /// Player position, or `None` if the level has no player.
    fn player_position(&self) -> Option<Vec3>;
    /// Starting poses of every moth in the level (queried once at load).
    fn moth_spawns(&self) -> Vec<Pose>;
    /// All live lamps, in stable order.
    fn lamps(&self) -> Vec<Lamp>;
    /// Whether at least one roam box is currently active.
    fn any_roam_box_active(&self) -> bool;
    /// Pose of a forced target, or `None` once it is destroyed or inactive.
    fn target_pose(&self, target: TargetId) -> Option<Pose>;
    /// First wall hit along a ray, as a world point.
    fn raycast_walls(&self, origin: Vec3, dir: Vec3, max_dist: f32) -> Option<Vec3>;
}

/// Geometric roam-box lookup used by trigger emulation.
pub trait RoamBoxVolumes {
    /// Active roam box containing `point`, if any.
    fn active_roam_box_at(&self, point: Vec3) -> Option<RoamBoxId>;
    /// Whether any roam box, active or not, contains `point`.
    fn inside_any_roam_box(&self, point: Vec3) -> bool;
}

/// Axis-aligned box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl Aabb {
    /// Creates a box from two corners in any order.
    #[must_use]
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Creates a box from a center and half extents.
    #[must_use]
    pub fn from_center(center: Vec3, half_extents: Vec3) -> Self {
        Self::new(center - half_extents, center + half_extents)
    }

    /// Whether the point lies inside or on the boundary.
    #[must_use]
    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Distance along a unit ray to the box surface (slab method).
    #[must_use]
    pub fn ray_distance(&self, origin: Vec3, dir: Vec3, max_dist: f32) -> Option<f32> {
        let mut t_min = 0.0_f32;
        let mut t_max = max_dist;

        for axis in 0..3 {
            let o = origin[axis];
            let d = dir[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);

            if d.abs() < 1e-8 {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d;
            let mut t0 = (lo - o) * inv;
            let mut t1 = (hi - o) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }

        Some(t_min)
    }
}

#[derive(Debug, Clone)]
struct LampEntry {
    id: LampId,
    position: Vec3,
    active: bool,
}

#[derive(Debug, Clone)]
struct RoamBoxEntry {
    id: RoamBoxId,
    bounds: Aabb,
    active: bool,
}

#[derive(Debug, Clone)]
struct TargetEntry {
    pose: Pose,
    active: bool,
}

/// In-memory level: player, lamps, moth spawns, roam boxes, targets and walls.
#[derive(Debug, Clone, Default)]
pub struct SimWorld {
    player: Option<Vec3>,
    moth_spawns: Vec<Pose>,
    lamps: Vec<LampEntry>,
    roam_boxes: Vec<RoamBoxEntry>,
    targets: HashMap<TargetId, TargetEntry>,
    walls: Vec<Aabb>,
    next_id: u32,
}

impl SimWorld {
    /// Creates an empty world with no player.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty world with a player at `position`.
    #[must_use]
    pub fn with_player(position: Vec3) -> Self {
        Self {
            player: Some(position),
            ..Self::default()
        }
    }

    fn allocate_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    /// Moves the player.
    pub fn set_player_position(&mut self, position: Vec3) {
        self.player = Some(position);
    }

    /// Removes the player from the level.
    pub fn remove_player(&mut self) {
        self.player = None;
    }

    /// Adds a moth spawn point.
    pub fn add_moth(&mut self, position: Vec3) {
        self.moth_spawns.push(Pose::at(position));
    }

    /// Adds an active lamp.
    pub fn add_lamp(&mut self, position: Vec3) -> LampId {
        let id = LampId::new(self.allocate_id());
        self.lamps.push(LampEntry {
            id,
            position,
            active: true,
        });
        id
    }

    /// Activates or deactivates a lamp.
    pub fn set_lamp_active(&mut self, id: LampId, active: bool) {
        if let Some(lamp) = self.lamps.iter_mut().find(|l| l.id == id) {
            lamp.active = active;
        }
    }

    /// Adds an active roam box.
    pub fn add_roam_box(&mut self, bounds: Aabb) -> RoamBoxId {
        let id = RoamBoxId::new(self.allocate_id());
        self.roam_boxes.push(RoamBoxEntry {
            id,
            bounds,
            active: true,
        });
        id
    }

    /// Activates or deactivates a roam box (a lever, a script).
    pub fn set_roam_box_active(&mut self, id: RoamBoxId, active: bool) {
        if let Some(b) = self.roam_boxes.iter_mut().find(|b| b.id == id) {
            b.active = active;
        }
    }

    /// Adds an active forced-target source.
    pub fn add_target(&mut self, pose: Pose) -> TargetId {
        let id = TargetId::new(self.allocate_id());
        self.targets.insert(id, TargetEntry { pose, active: true });
        id
    }

    /// Moves a target.
    pub fn set_target_pose(&mut self, id: TargetId, pose: Pose) {
        if let Some(t) = self.targets.get_mut(&id) {
            t.pose = pose;
        }
    }

    /// Activates or deactivates a target.
    pub fn set_target_active(&mut self, id: TargetId, active: bool) {
        if let Some(t) = self.targets.get_mut(&id) {
            t.active = active;
        }
    }

    /// Destroys a target.
    pub fn remove_target(&mut self, id: TargetId) {
        self.targets.remove(&id);
    }

    /// Adds a solid wall.
    pub fn add_wall(&mut self, bounds: Aabb) {
        self.walls.push(bounds);
    }
}

impl FlockWorld for SimWorld {
    fn player_position(&self) -> Option<Vec3> {
        self.player
    }

    fn moth_spawns(&self) -> Vec<Pose> {
        self.moth_spawns.clone()
    }

    fn lamps(&self) -> Vec<Lamp> {
        self.lamps
            .iter()
            .filter(|l| l.active)
            .map(|l| Lamp {
                id: l.id,
                position: l.position,
            })
            .collect()
    }

    fn any_roam_box_active(&self) -> bool {
        self.roam_boxes.iter().any(|b| b.active)
    }

    fn target_pose(&self, target: TargetId) -> Option<Pose> {
        self.targets
            .get(&target)
            .filter(|t| t.active)
            .map(|t| t.pose)
    }

    fn raycast_walls(&self, origin: Vec3, dir: Vec3, max_dist: f32) -> Option<Vec3> {
        self.walls
            .iter()
            .filter_map(|w| w.ray_distance(origin, dir, max_dist))
            .min_by(f32::total_cmp)
            .map(|t| origin + dir * t)
    }
}

impl RoamBoxVolumes for SimWorld {
    fn active_roam_box_at(&self, point: Vec3) -> Option<RoamBoxId> {
        self.roam_boxes
            .iter()
            .find(|b| b.active && b.bounds.contains(point))
            .map(|b| b.id)
    }

    fn inside_any_roam_box(&self, point: Vec3) -> bool {
        self.roam_boxes.iter().any(|b| b.bounds.contains(point))
    }
}
