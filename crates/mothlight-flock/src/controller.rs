//! Flock orchestrator.
//!
//! Owns every moth, the headlight and the transition side effects, and runs
//! the per-tick state machine:
//! 1. apply input and detect a headlight edge
//! 2. track which way the player is travelling along z
//! 3. headlight on: everyone seeks lamps
//! 4. headlight off: recall nearby moths into a line behind the player and
//!    let the rest seek
//!
//! Collaborators (priority radii, trigger listeners, lock zones, HUDs) hold
//! no reference to it; they are handed `&mut FlockController` or
//! `&impl FlockQuery` when they run.

use crate::config::FlockConfig;
use crate::events::{EventBus, FlockEvent};
use crate::glitch::GlitchPulse;
use crate::headlight::{transition_events, Headlight};
use crate::lamps::lane_locked;
use crate::moth::Moth;
use crate::motion::{follow_forced, place_on_line, seek_or_orbit, MotionContext};
use crate::query::{FlockMode, FlockQuery};
use crate::registry::MothRegistry;
use crate::rng::FlockRng;
use crate::roam_box::is_constrained;
use crate::world::{FlockWorld, Lamp};
use glam::Vec3;
use mothlight_common::{FlockError, FlockResult, MothId, TargetId};
use tracing::{debug, error, info};

/// Per-tick input from the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickInput {
    /// Scaled frame time in seconds
    pub dt: f32,
    /// Unscaled frame time, drives the glitch pulse
    pub unscaled_dt: f32,
    /// Toggle key went down this frame
    pub toggle_pressed: bool,
}

impl TickInput {
    /// Input with no key press and unscaled time equal to `dt`.
    #[must_use]
    pub const fn new(dt: f32) -> Self {
        Self {
            dt,
            unscaled_dt: dt,
            toggle_pressed: false,
        }
    }

    /// Same input with the toggle key pressed.
    #[must_use]
    pub const fn with_toggle(mut self) -> Self {
        self.toggle_pressed = true;
        self
    }
}

/// The flock subsystem for one level.
#[derive(Debug)]
pub struct FlockController {
    config: FlockConfig,
    registry: MothRegistry,
    headlight: Headlight,
    rng: FlockRng,
    glitch: GlitchPulse,
    events: EventBus,
    followers: Vec<MothId>,
    pole_recalled: Vec<MothId>,
    mode: FlockMode,
    last_player_z: f32,
    z_sign: f32,
}

impl FlockController {
    /// Discovers the moths in `world` and builds the controller.
    ///
    /// Fails with [`FlockError::MissingPlayer`] when the world has no player.
    pub fn new<W: FlockWorld + ?Sized>(world: &W, config: FlockConfig, seed: u64) -> FlockResult<Self> {
        let Some(player) = world.player_position() else {
            error!("Flock controller needs a player; refusing to start");
            return Err(FlockError::MissingPlayer);
        };

        let config = config.validated();
        let registry = MothRegistry::from_spawns(world.moth_spawns());
        info!(
            "Flock ready: {} moths, {} lamps, headlight {}",
            registry.len(),
            world.lamps().len(),
            if config.headlight_on_at_start { "on" } else { "off" }
        );

        Ok(Self {
            headlight: Headlight::new(config.headlight_on_at_start),
            glitch: GlitchPulse::new(config.glitch_peak, config.glitch_duration),
            rng: FlockRng::new(seed),
            events: EventBus::default(),
            followers: Vec::new(),
            pole_recalled: Vec::new(),
            mode: FlockMode::SeekLight,
            last_player_z: player.z,
            z_sign: 1.0,
            registry,
            config,
        })
    }

    // ========================================================================
    // Tick
    // ========================================================================

    /// Advances the flock by one frame.
    pub fn tick<W: FlockWorld + ?Sized>(&mut self, world: &W, input: TickInput) -> FlockResult<()> {
        let Some(player) = world.player_position() else {
            error!("Player vanished; flock tick skipped");
            return Err(FlockError::MissingPlayer);
        };

        if input.toggle_pressed && self.config.control_headlight_with_input {
            self.headlight.press();
        }
        if let Some(on) = self.headlight.take_transition() {
            self.on_headlight_changed(on);
        }
        self.glitch.advance(input.unscaled_dt);

        self.track_z(player.z);

        let lamps = world.lamps();
        let ctx = MotionContext {
            config: &self.config,
            world,
            player,
            dt: input.dt,
        };

        if self.headlight.is_on() {
            self.followers.clear();
            self.pole_recalled.clear();
            self.mode = FlockMode::SeekLight;
            for moth in self.registry.iter_mut() {
                Self::forced_or_seek(moth, &lamps, &ctx, &mut self.rng);
            }
            return Ok(());
        }

        self.followers = Self::select_followers(&mut self.registry, &mut self.pole_recalled, &lamps, &ctx);
        self.mode = Self::mode_for(self.followers.len(), self.registry.len());

        let z_sign = self.z_sign;
        let mut slot = 0;
        for moth in self.registry.iter_mut() {
            if self.followers.contains(&moth.id()) {
                place_on_line(moth, slot, z_sign, &ctx);
                slot += 1;
            } else {
                Self::forced_or_seek(moth, &lamps, &ctx, &mut self.rng);
            }
        }
        Ok(())
    }

    fn on_headlight_changed(&mut self, on: bool) {
        info!("Headlight {}", if on { "on" } else { "off" });

        for event in transition_events(on, &self.config, &mut self.rng) {
            self.events.publish(event);
        }
        self.glitch.burst();

        if on {
            self.followers.clear();
            self.pole_recalled.clear();
        }
        for moth in self.registry.iter_mut() {
            moth.reset_motion();
        }
    }

    fn track_z(&mut self, z: f32) {
        let dz = z - self.last_player_z;
        if dz.abs() > self.config.z_direction_threshold {
            self.z_sign = dz.signum();
        }
        self.last_player_z = z;
    }

    fn forced_or_seek<W: FlockWorld + ?Sized>(
        moth: &mut Moth,
        lamps: &[Lamp],
        ctx: &MotionContext<'_, W>,
        rng: &mut FlockRng,
    ) {
        if ctx.config.forced_targets_override_recall {
            if let Some((_, pose)) = moth.live_forced(ctx.world) {
                follow_forced(moth, &pose, ctx);
                return;
            }
        }
        seek_or_orbit(moth, lamps, ctx, rng);
    }

    /// Moths recalled this tick, in registry order.
    ///
    /// A moth picked up from a pole stays in `pole_recalled` until the
    /// headlight comes on or a roam box or forced target claims it, since it
    /// stops orbiting the moment it joins the line.
    fn select_followers<W: FlockWorld + ?Sized>(
        registry: &mut MothRegistry,
        pole_recalled: &mut Vec<MothId>,
        lamps: &[Lamp],
        ctx: &MotionContext<'_, W>,
    ) -> Vec<MothId> {
        let config = ctx.config;
        let lane_x = ctx.lane_x();
        let player = ctx.player;

        let mut followers = Vec::new();
        for moth in registry.iter_mut() {
            let id = moth.id();
            let claimed = is_constrained(moth, ctx.world, config)
                || (config.forced_targets_override_recall && moth.live_forced(ctx.world).is_some());
            if claimed {
                pole_recalled.retain(|&m| m != id);
                continue;
            }

            let near_player = lane_locked(moth.position(), lane_x).distance(player) <= config.follow_acquire_radius;
            if config.pole_pickup
                && !pole_recalled.contains(&id)
                && Self::orbits_lamp_near(moth, lamps, player, lane_x, config.pole_recall_radius)
            {
                debug!("{} picked up from its lamp", id);
                pole_recalled.push(id);
            }

            if near_player || pole_recalled.contains(&id) {
                followers.push(id);
            }
        }
        followers
    }

    fn orbits_lamp_near(moth: &Moth, lamps: &[Lamp], player: Vec3, lane_x: Option<f32>, radius: f32) -> bool {
        let Some(orbit) = moth.orbit() else {
            return false;
        };
        lamps
            .iter()
            .find(|lamp| lamp.id == orbit.center)
            .is_some_and(|lamp| lane_locked(lamp.position, lane_x).distance(player) <= radius)
    }

    fn mode_for(followers: usize, total: usize) -> FlockMode {
        if followers == 0 {
            FlockMode::SeekLight
        } else if followers == total {
            FlockMode::FollowLine
        } else {
            FlockMode::Mixed
        }
    }

    // ========================================================================
    // External calls
    // ========================================================================

    /// Marks a moth inside (or outside) a roam box.
    pub fn set_moth_inside_roam_box(&mut self, id: MothId, inside: bool) -> FlockResult<()> {
        self.registry.get_mut(id)?.set_inside_roam_box(inside);
        Ok(())
    }

    /// Pins a moth to a forced target.
    pub fn force_light_target(&mut self, id: MothId, target: TargetId) -> FlockResult<()> {
        self.registry.get_mut(id)?.set_forced(target);
        Ok(())
    }

    /// Clears a moth's forced target, optionally only if it names `target`.
    ///
    /// Returns whether a registration was cleared.
    pub fn clear_forced_light_target(&mut self, id: MothId, target: Option<TargetId>) -> FlockResult<bool> {
        Ok(self.registry.get_mut(id)?.clear_forced(target))
    }

    /// Scripted headlight set. Ignores the input gate.
    pub fn set_headlight(&mut self, on: bool) {
        self.headlight.set(on);
    }

    /// Scripted headlight flip. Ignores the input gate.
    pub fn toggle_headlight_external(&mut self) {
        self.headlight.toggle();
    }

    /// Gates player toggling.
    pub fn set_can_toggle(&mut self, can_toggle: bool) {
        self.headlight.set_can_toggle(can_toggle);
    }

    /// Whether player input may toggle the headlight.
    #[must_use]
    pub fn can_toggle(&self) -> bool {
        self.headlight.can_toggle()
    }

    /// Clears one moth's transient motion state.
    pub fn reset_moth_from_external(&mut self, id: MothId) -> FlockResult<()> {
        let moth = self.registry.get_mut(id)?;
        moth.reset_motion();
        debug!("{} reset externally", id);
        Ok(())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Takes every event published since the last drain.
    pub fn drain_events(&self) -> Vec<FlockEvent> {
        self.events.drain()
    }

    /// The screen glitch pulse.
    #[must_use]
    pub fn glitch(&self) -> &GlitchPulse {
        &self.glitch
    }

    /// HUD label for the headlight.
    #[must_use]
    pub fn status_text(&self) -> &str {
        self.headlight.status_text(&self.config)
    }

    /// All moths.
    #[must_use]
    pub fn moths(&self) -> &MothRegistry {
        &self.registry
    }

    /// One moth.
    pub fn moth(&self, id: MothId) -> FlockResult<&Moth> {
        self.registry.get(id)
    }

    /// Current trail direction along z (`1.0` or `-1.0`).
    #[must_use]
    pub fn z_direction_sign(&self) -> f32 {
        self.z_sign
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &FlockConfig {
        &self.config
    }

    /// Number of moths in each motion state, keyed by state label.
    #[must_use]
    pub fn state_counts(&self) -> [(&'static str, usize); 5] {
        let mut counts = [
            ("idle", 0),
            ("seeking", 0),
            ("orbiting", 0),
            ("following-forced", 0),
            ("following-line", 0),
        ];
        for moth in self.registry.iter() {
            let label = moth.state().label();
            if let Some(entry) = counts.iter_mut().find(|(name, _)| *name == label) {
                entry.1 += 1;
            }
        }
        counts
    }
}

impl FlockQuery for FlockController {
    fn follower_count(&self) -> usize {
        self.followers.len()
    }

    fn moth_count(&self) -> usize {
        self.registry.len()
    }

    fn headlight_on(&self) -> bool {
        self.headlight.is_on()
    }

    fn mode(&self) -> FlockMode {
        self.mode
    }

    fn followers(&self) -> &[MothId] {
        &self.followers
    }
}
