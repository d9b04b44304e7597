//! Headless level runner.
//!
//! Builds an in-memory level from a [`Scenario`], wires the collaborators to
//! the flock and steps everything at a fixed rate.

use crate::scenario::Scenario;
use glam::Vec3;
use mothlight_common::{FlockResult, MothId, Pose, RoamBoxId, TargetId};
use mothlight_flock::{
    Aabb, DisruptionTransmitter, FlockController, FlockEvent, FlockMode, FlockQuery, FollowerGoalChecker, FollowerHud,
    HeadlightLockZone, PriorityRadius, RoamBoxListener, SimWorld, TickInput,
};
use serde::Serialize;
use tracing::{debug, info};

/// Final state of one moth.
#[derive(Debug, Clone, Serialize)]
pub struct MothReport {
    /// Moth id
    pub id: MothId,
    /// Final position
    pub position: Vec3,
    /// Final motion state label
    pub state: &'static str,
    /// Orbit radius when orbiting
    pub orbit_radius: Option<f32>,
    /// Whether a forced target still holds it
    pub forced: bool,
}

/// Counts of side effects published over the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EventTally {
    /// Headlight transitions
    pub transitions: usize,
    /// Transition sounds
    pub sounds: usize,
    /// Glitch bursts
    pub glitches: usize,
}

impl EventTally {
    fn record(&mut self, event: &FlockEvent) {
        match event {
            FlockEvent::HeadlightChanged { .. } => self.transitions += 1,
            FlockEvent::TransitionSound { .. } => self.sounds += 1,
            FlockEvent::GlitchBurst => self.glitches += 1,
            FlockEvent::VisualsApplied(_) => {},
        }
    }
}

/// Snapshot printed at the end of a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Ticks simulated
    pub ticks: u32,
    /// Final headlight value
    pub headlight_on: bool,
    /// Final coarse mode
    pub mode: FlockMode,
    /// Final followers in line order
    pub followers: Vec<MothId>,
    /// Final HUD label
    pub hud: String,
    /// Whether the exit door goal passed at some point
    pub goal_passed: bool,
    /// Lock fields still blocking the headlight
    pub active_lock_fields: usize,
    /// Side effects published
    pub events: EventTally,
    /// Per-moth final state
    pub moths: Vec<MothReport>,
}

struct LockField {
    zone: HeadlightLockZone,
    transmitter: DisruptionTransmitter,
    used_at: Option<u32>,
}

struct Stalker {
    target: TargetId,
    radius: PriorityRadius,
    despawn_at: Option<u32>,
}

/// Plays `scenario` to the end.
pub fn run(scenario: &Scenario) -> FlockResult<RunReport> {
    scenario.check()?;
    let dt = scenario.dt();

    let mut world = SimWorld::with_player(scenario.player_at(0));
    for &moth in &scenario.moths {
        world.add_moth(moth);
    }
    for &lamp in &scenario.lamps {
        world.add_lamp(lamp);
    }
    for wall in &scenario.walls {
        world.add_wall(Aabb::new(wall.min, wall.max));
    }
    let boxes: Vec<(RoamBoxId, Option<u32>)> = scenario
        .roam_boxes
        .iter()
        .map(|b| (world.add_roam_box(Aabb::new(b.bounds.min, b.bounds.max)), b.deactivate_at))
        .collect();
    let mut stalkers: Vec<Stalker> = scenario
        .stalkers
        .iter()
        .map(|s| {
            let target = world.add_target(Pose::at(s.position));
            Stalker {
                target,
                radius: PriorityRadius::new(target, s.radius),
                despawn_at: s.despawn_at,
            }
        })
        .collect();
    let mut fields: Vec<LockField> = scenario
        .lock_zones
        .iter()
        .map(|z| LockField {
            zone: HeadlightLockZone::new(Aabb::new(z.bounds.min, z.bounds.max), z.fade),
            transmitter: DisruptionTransmitter::new(),
            used_at: z.transmitter_used_at,
        })
        .collect();

    let mut flock = FlockController::new(&world, scenario.flock.clone(), scenario.seed)?;
    let mut listener = RoamBoxListener::new();
    let mut hud = FollowerHud::new(scenario.hud.clone());
    let mut goal = FollowerGoalChecker::new(scenario.goal);
    let mut events = EventTally::default();

    for tick in 0..scenario.ticks {
        let player = scenario.player_at(tick);
        world.set_player_position(player);

        for &(id, deactivate_at) in &boxes {
            if deactivate_at == Some(tick) {
                debug!("Tick {}: roam box {} switched off", tick, id.raw());
                world.set_roam_box_active(id, false);
            }
        }
        for stalker in &mut stalkers {
            if stalker.despawn_at == Some(tick) {
                debug!("Tick {}: stalker {} despawned", tick, stalker.target.raw());
                stalker.radius.disable(&mut flock)?;
                world.remove_target(stalker.target);
            }
            stalker.radius.update(&mut flock, &world, dt)?;
        }
        listener.update(&mut flock, &world)?;
        for field in &mut fields {
            if field.used_at == Some(tick) {
                field.transmitter.interact(&mut field.zone, &mut flock);
            }
            field.zone.update(&mut flock, player, dt);
        }

        let mut input = TickInput::new(dt);
        if scenario.toggle_ticks.contains(&tick) {
            input = input.with_toggle();
        }
        flock.tick(&world, input)?;

        for event in flock.drain_events() {
            events.record(&event);
        }
        hud.update(&flock, dt);
        if goal.update(&flock, dt) {
            info!("Tick {}: exit door open", tick);
        }
    }

    let moths = flock
        .moths()
        .iter()
        .map(|m| MothReport {
            id: m.id(),
            position: m.position(),
            state: m.state().label(),
            orbit_radius: m.orbit().map(|o| o.radius),
            forced: m.forced_target().is_some(),
        })
        .collect();

    info!(
        "Run finished after {} ticks: {} of {} moths following",
        scenario.ticks,
        flock.follower_count(),
        flock.moth_count()
    );

    Ok(RunReport {
        ticks: scenario.ticks,
        headlight_on: flock.headlight_on(),
        mode: flock.mode(),
        followers: flock.followers().to_vec(),
        hud: hud.text().to_string(),
        goal_passed: goal.has_passed(),
        active_lock_fields: fields.iter().filter(|f| f.zone.is_field_active()).count(),
        events,
        moths,
    })
}
