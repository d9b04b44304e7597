//! Headlight lock zone.
//!
//! A particle field that kills the headlight and blocks the toggle while the
//! player stands in it. A transmitter can shut the field down, which plays a
//! spark and fades the field out over a few seconds.

use crate::controller::FlockController;
use crate::world::Aabb;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Settings for a [`HeadlightLockZone`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockZoneConfig {
    /// Seconds the shutdown fade lasts
    pub fade_duration: f32,
    /// Turn colliders off once faded
    pub disable_colliders_after_fade: bool,
    /// Turn the whole zone off once faded
    pub disable_object_after_fade: bool,
}

impl Default for LockZoneConfig {
    fn default() -> Self {
        Self {
            fade_duration: 1.0,
            disable_colliders_after_fade: true,
            disable_object_after_fade: false,
        }
    }
}

/// Headlight-blocking field.
#[derive(Debug, Clone)]
pub struct HeadlightLockZone {
    bounds: Aabb,
    config: LockZoneConfig,
    field_active: bool,
    player_inside: bool,
    spark_played: bool,
    fade_elapsed: Option<f32>,
    alpha: f32,
    colliders_enabled: bool,
    object_active: bool,
}

impl HeadlightLockZone {
    /// Creates an active field covering `bounds`.
    #[must_use]
    pub fn new(bounds: Aabb, config: LockZoneConfig) -> Self {
        Self {
            bounds,
            config,
            field_active: true,
            player_inside: false,
            spark_played: false,
            fade_elapsed: None,
            alpha: 1.0,
            colliders_enabled: true,
            object_active: true,
        }
    }

    /// Checks the player against the zone, then advances the shutdown fade.
    pub fn update(&mut self, flock: &mut FlockController, player: Vec3, dt: f32) {
        let inside = self.colliders_enabled && self.object_active && self.bounds.contains(player);
        if inside && !self.player_inside {
            self.player_enter(flock);
        } else if !inside && self.player_inside {
            self.player_exit(flock);
        }
        self.advance_fade(dt);
    }

    /// Player walked into the field.
    pub fn player_enter(&mut self, flock: &mut FlockController) {
        if !self.field_active {
            return;
        }
        self.player_inside = true;
        flock.set_can_toggle(false);
        flock.set_headlight(false);
    }

    /// Player walked out of the field.
    pub fn player_exit(&mut self, flock: &mut FlockController) {
        self.player_inside = false;
        if !self.field_active {
            return;
        }
        flock.set_can_toggle(true);
    }

    /// Shuts the field down. Calling it again does nothing.
    pub fn disable_field(&mut self, flock: &mut FlockController) {
        if !self.field_active {
            return;
        }
        self.field_active = false;
        info!("Headlight lock field disabled");

        if self.player_inside {
            flock.set_can_toggle(true);
        }
        self.play_shutdown();
    }

    fn play_shutdown(&mut self) {
        if self.spark_played {
            return;
        }
        self.spark_played = true;

        if self.config.fade_duration > 0.0 {
            self.fade_elapsed = Some(0.0);
        } else if self.config.disable_colliders_after_fade {
            self.colliders_enabled = false;
        }
    }

    fn advance_fade(&mut self, dt: f32) {
        let Some(elapsed) = self.fade_elapsed else {
            return;
        };

        let elapsed = elapsed + dt;
        let t = (elapsed / self.config.fade_duration).clamp(0.0, 1.0);
        self.alpha = 1.0 - t;

        if elapsed < self.config.fade_duration {
            self.fade_elapsed = Some(elapsed);
            return;
        }

        self.fade_elapsed = None;
        self.alpha = 0.0;
        if self.config.disable_colliders_after_fade {
            self.colliders_enabled = false;
        }
        if self.config.disable_object_after_fade {
            self.object_active = false;
        }
    }

    /// Whether the field still blocks the headlight.
    #[must_use]
    pub fn is_field_active(&self) -> bool {
        self.field_active
    }

    /// Whether the player is in the zone.
    #[must_use]
    pub fn player_inside(&self) -> bool {
        self.player_inside
    }

    /// Whether the shutdown spark has fired.
    #[must_use]
    pub fn spark_played(&self) -> bool {
        self.spark_played
    }

    /// Field opacity, 1 until the shutdown fade runs.
    #[must_use]
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Whether the zone still has colliders.
    #[must_use]
    pub fn colliders_enabled(&self) -> bool {
        self.colliders_enabled
    }

    /// Whether the zone object is still active.
    #[must_use]
    pub fn object_active(&self) -> bool {
        self.object_active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FlockConfig;
    use crate::controller::TickInput;
    use crate::query::FlockQuery;
    use crate::world::SimWorld;

    fn setup() -> (SimWorld, FlockController, HeadlightLockZone) {
        let world = SimWorld::with_player(Vec3::ZERO);
        let config = FlockConfig {
            headlight_on_at_start: true,
            ..FlockConfig::default()
        };
        let flock = FlockController::new(&world, config, 1).expect("player present");
        let zone = HeadlightLockZone::new(
            Aabb::from_center(Vec3::new(0.0, 0.0, 10.0), Vec3::splat(2.0)),
            LockZoneConfig::default(),
        );
        (world, flock, zone)
    }

    #[test]
    fn test_entering_kills_headlight_and_locks_toggle() {
        let (world, mut flock, mut zone) = setup();
        zone.update(&mut flock, Vec3::new(0.0, 0.0, 10.0), 0.016);

        assert!(zone.player_inside());
        assert!(!flock.can_toggle());
        assert!(!flock.headlight_on());

        flock.tick(&world, TickInput::new(0.016).with_toggle()).expect("tick");
        assert!(!flock.headlight_on());
    }

    #[test]
    fn test_exit_restores_toggle() {
        let (_, mut flock, mut zone) = setup();
        zone.update(&mut flock, Vec3::new(0.0, 0.0, 10.0), 0.016);
        zone.update(&mut flock, Vec3::ZERO, 0.016);
        assert!(!zone.player_inside());
        assert!(flock.can_toggle());
    }

    #[test]
    fn test_disable_with_player_inside_restores_toggle() {
        let (_, mut flock, mut zone) = setup();
        zone.player_enter(&mut flock);
        zone.disable_field(&mut flock);

        assert!(!zone.is_field_active());
        assert!(flock.can_toggle());
        assert!(zone.spark_played());
    }

    #[test]
    fn test_disabled_field_ignores_player() {
        let (_, mut flock, mut zone) = setup();
        zone.disable_field(&mut flock);
        zone.player_enter(&mut flock);
        assert!(!zone.player_inside());
        assert!(flock.can_toggle());
        assert!(flock.headlight_on());
    }

    #[test]
    fn test_fade_then_colliders_off() {
        let (_, mut flock, mut zone) = setup();
        zone.disable_field(&mut flock);
        zone.disable_field(&mut flock);

        zone.update(&mut flock, Vec3::ZERO, 0.5);
        assert!((zone.alpha() - 0.5).abs() < 1e-5);
        assert!(zone.colliders_enabled());

        zone.update(&mut flock, Vec3::ZERO, 0.6);
        assert_eq!(zone.alpha(), 0.0);
        assert!(!zone.colliders_enabled());
        assert!(zone.object_active());
    }

    #[test]
    fn test_zero_fade_disables_colliders_at_once() {
        let (_, mut flock, _) = setup();
        let config = LockZoneConfig {
            fade_duration: 0.0,
            ..LockZoneConfig::default()
        };
        let mut zone = HeadlightLockZone::new(Aabb::from_center(Vec3::ZERO, Vec3::ONE), config);
        zone.disable_field(&mut flock);
        assert!(!zone.colliders_enabled());
    }
}
