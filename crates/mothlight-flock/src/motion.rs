//! Per-moth motion state machine.
//!
//! One call per moth per tick, in priority order:
//! 1. forced follow, when a live forced target overrides everything else
//! 2. lamp seek/orbit otherwise
//!
//! Recalled moths are placed on the follow line by [`place_on_line`] instead.
//!
//! Seek to orbit uses hysteresis. A moth must seek the same lamp for
//! `min_seek_time_before_orbit` before it may start circling it (unless it is
//! already very close), and an orbit only breaks past `orbit_break_radius`,
//! which is never smaller than `orbit_enter_radius`.

use crate::config::FlockConfig;
use crate::lamps::{find_nearest, lane_locked};
use crate::moth::{Moth, MotionState, Orbit};
use crate::rng::FlockRng;
use crate::roam_box::{constrain_move, is_constrained};
use crate::world::{FlockWorld, Lamp};
use glam::Vec3;
use mothlight_common::{clamp_step, flatten, lerp_clamped, move_towards, smooth_damp, turn_towards, LampId, Pose};
use tracing::debug;

/// Everything a moth update reads besides the moth itself.
pub struct MotionContext<'a, W: FlockWorld + ?Sized> {
    /// Tunables
    pub config: &'a FlockConfig,
    /// World queries (walls, roam boxes)
    pub world: &'a W,
    /// Player position this tick
    pub player: Vec3,
    /// Frame time
    pub dt: f32,
}

impl<W: FlockWorld + ?Sized> MotionContext<'_, W> {
    /// Lane x when lane lock is on.
    #[must_use]
    pub fn lane_x(&self) -> Option<f32> {
        self.config.lock_x_to_player.then_some(self.player.x)
    }

    fn turn_t(&self) -> f32 {
        self.config.turn_rate * self.dt
    }

    /// Moves the moth to `next`, clamped against walls if a roam box holds it.
    fn commit_move(&self, moth: &mut Moth, next: Vec3) {
        let constrained = is_constrained(moth, self.world, self.config);
        let from = moth.pose.position;
        moth.pose.position = constrain_move(constrained, from, next, self.world, self.config.wall_pullback);
    }

    /// Turns the moth toward the horizontal part of `travel`.
    fn face(&self, moth: &mut Moth, travel: Vec3) {
        moth.pose.forward = turn_towards(moth.pose.forward, flatten(travel), self.turn_t());
    }
}

/// Trails a forced target at the moth's own offset behind it.
pub fn follow_forced<W: FlockWorld + ?Sized>(moth: &mut Moth, target: &Pose, ctx: &MotionContext<'_, W>) {
    moth.drop_orbit();
    moth.clear_seek();

    let offset = moth.forced_offset_or_init(ctx.config);
    let desired = lane_locked(target.transform_point(offset), ctx.lane_x());

    let mut vel = moth.velocity.forced;
    let next = smooth_damp(
        moth.pose.position,
        desired,
        &mut vel,
        ctx.config.forced_follow_smooth_time,
        ctx.dt,
    );
    moth.velocity.forced = vel;

    ctx.commit_move(moth, next);
    let travel = desired - moth.pose.position;
    ctx.face(moth, travel);
    moth.state = MotionState::FollowingForced;
}

/// Seeks or orbits the nearest lamp.
///
/// With no lamps in the world the moth goes idle and retries next tick.
pub fn seek_or_orbit<W: FlockWorld + ?Sized>(
    moth: &mut Moth,
    lamps: &[Lamp],
    ctx: &MotionContext<'_, W>,
    rng: &mut FlockRng,
) {
    let lane_x = ctx.lane_x();
    let Some(lamp) = find_nearest(lamps, moth.position(), lane_x) else {
        moth.drop_orbit();
        moth.clear_seek();
        moth.state = MotionState::Idle;
        return;
    };

    // New target: restart the dwell timer and drop springs tuned for the old one
    if moth.seek_target != Some(lamp.id) {
        moth.drop_orbit();
        moth.seek_target = Some(lamp.id);
        moth.seek_elapsed = 0.0;
        moth.velocity.seek = Vec3::ZERO;
    }

    let center = lane_locked(lamp.position, lane_x);
    let dist = moth.position().distance(center);

    if let MotionState::Orbiting(orbit) = moth.state {
        if orbit.center == lamp.id && dist <= ctx.config.orbit_break_radius {
            advance_orbit(moth, orbit, center, ctx);
            return;
        }

        debug!("{} left orbit (dist {:.2})", moth.id(), dist);
        moth.drop_orbit();
        moth.seek_elapsed = 0.0;
        moth.velocity.seek = Vec3::ZERO;
    }

    let config = ctx.config;
    let dwell_done = moth.seek_elapsed >= config.min_seek_time_before_orbit;
    let very_close = config.allow_immediate_orbit_if_very_close && dist <= config.very_close_orbit_radius;

    if (dwell_done || very_close) && dist <= config.orbit_enter_radius {
        enter_orbit(moth, lamp.id, center, config, rng);
    } else {
        seek_step(moth, center, ctx);
    }
}

fn advance_orbit<W: FlockWorld + ?Sized>(moth: &mut Moth, mut orbit: Orbit, center: Vec3, ctx: &MotionContext<'_, W>) {
    orbit.angle += orbit.spin * ctx.config.orbit_angular_speed.to_radians() * ctx.dt;

    let desired = center + Vec3::new(0.0, orbit.angle.sin() * orbit.radius, orbit.angle.cos() * orbit.radius);

    let mut vel = moth.velocity.orbit;
    let next = smooth_damp(
        moth.pose.position,
        desired,
        &mut vel,
        ctx.config.orbit_smooth_time,
        ctx.dt,
    );
    moth.velocity.orbit = vel;

    ctx.commit_move(moth, next);
    let travel = desired - moth.pose.position;
    ctx.face(moth, travel);
    moth.state = MotionState::Orbiting(orbit);
}

fn seek_step<W: FlockWorld + ?Sized>(moth: &mut Moth, center: Vec3, ctx: &MotionContext<'_, W>) {
    let config = ctx.config;
    moth.seek_elapsed += ctx.dt;

    let from = moth.pose.position;
    let max_step = config.seek_speed * ctx.dt;
    let desired = move_towards(from, center, max_step);

    let mut vel = moth.velocity.seek;
    let mut next = smooth_damp(from, desired, &mut vel, config.seek_smooth_time, ctx.dt);
    moth.velocity.seek = vel;

    // The spring alone can briefly outrun seek_speed
    if config.hard_cap_seek_speed {
        next = from + clamp_step(next - from, max_step);
    }

    ctx.commit_move(moth, next);
    ctx.face(moth, desired - from);
    moth.state = MotionState::Seeking;
}

fn enter_orbit(moth: &mut Moth, lamp: LampId, center: Vec3, config: &FlockConfig, rng: &mut FlockRng) {
    let radius = rng.range(config.orbit_min_radius, config.orbit_max_radius);
    let spin = rng.sign();

    // Start on the ring at the moth's current bearing so it does not jump
    let offset = moth.position() - center;
    let angle = if offset.length_squared() < 1e-6 {
        rng.angle()
    } else {
        offset.y.atan2(offset.z)
    };

    debug!("{} entered orbit r={:.2} spin={}", moth.id(), radius, spin);
    moth.seek_elapsed = 0.0;
    moth.state = MotionState::Orbiting(Orbit {
        center: lamp,
        radius,
        spin,
        angle,
    });
}

/// Moves a recalled moth toward its slot in the line behind the player.
///
/// `slot` is zero-based; slot `n` sits `(n + 1) * follow_gap_distance` behind
/// the player along `-z_sign`.
pub fn place_on_line<W: FlockWorld + ?Sized>(moth: &mut Moth, slot: usize, z_sign: f32, ctx: &MotionContext<'_, W>) {
    let config = ctx.config;
    let trail = Vec3::new(0.0, 0.0, -z_sign);
    let gap = config.follow_gap_distance * (slot + 1) as f32;
    let target = lane_locked(ctx.player + trail * gap, ctx.lane_x());

    moth.drop_orbit();
    moth.clear_seek();

    moth.pose.position = lerp_clamped(moth.pose.position, target, config.follow_lerp * ctx.dt);
    moth.pose.forward = turn_towards(moth.pose.forward, Vec3::new(0.0, 0.0, z_sign), ctx.turn_t());
    moth.state = MotionState::FollowingLine;
}
