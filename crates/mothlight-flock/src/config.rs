//! Flock configuration.
//!
//! Every tunable of the flock controller lives here. Configuration can be
//! loaded from and saved to a TOML file; missing keys fall back to defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;
use tracing::{info, warn};

/// Flock controller configuration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlockConfig {
    // === Headlight ===
    /// Headlight value at level load (no transition effects fire for it)
    pub headlight_on_at_start: bool,
    /// Whether the toggle input is honored at all
    pub control_headlight_with_input: bool,
    /// Status label while the headlight is on
    pub on_text: String,
    /// Status label while the headlight is off
    pub off_text: String,
    /// Transition sound volume (0.0 - 1.0)
    pub headlight_volume: f32,
    /// Random pitch range for the transition sound (min, max)
    pub headlight_pitch_range: (f32, f32),

    // === Recall ===
    /// With the headlight off, moths within this distance of the player follow
    pub follow_acquire_radius: f32,
    /// Also recall moths orbiting a lamp near the player
    pub pole_pickup: bool,
    /// Lamp-to-player distance for per-pole pickup
    pub pole_recall_radius: f32,
    /// Spacing between followers in the line
    pub follow_gap_distance: f32,
    /// Lerp rate toward a line slot (per second)
    pub follow_lerp: f32,

    // === Seek ===
    /// Top speed toward a lamp
    pub seek_speed: f32,
    /// Smoothing time for seek motion (seconds)
    pub seek_smooth_time: f32,
    /// Never exceed `seek_speed` per second while seeking
    pub hard_cap_seek_speed: bool,

    // === Seek -> orbit hysteresis ===
    /// Distance at which orbiting may begin
    pub orbit_enter_radius: f32,
    /// Time spent seeking the same lamp before orbit is allowed (seconds)
    pub min_seek_time_before_orbit: f32,
    /// Allow orbit at once when very close to the lamp
    pub allow_immediate_orbit_if_very_close: bool,
    /// Distance counted as very close
    pub very_close_orbit_radius: f32,

    // === Orbit ===
    /// Smallest orbit radius
    pub orbit_min_radius: f32,
    /// Largest orbit radius
    pub orbit_max_radius: f32,
    /// Orbit speed in degrees per second
    pub orbit_angular_speed: f32,
    /// Distance from the lamp at which an orbit is dropped
    pub orbit_break_radius: f32,
    /// Smoothing time for orbit motion (seconds)
    pub orbit_smooth_time: f32,

    // === Forced follow ===
    /// Forced targets win over recall and lamps
    pub forced_targets_override_recall: bool,
    /// Distance behind the forced target
    pub forced_follow_distance: f32,
    /// Lateral fan-out half width
    pub forced_side_spread: f32,
    /// Height above the forced target
    pub forced_hover_y: f32,
    /// Smoothing time for forced follow (seconds)
    pub forced_follow_smooth_time: f32,

    // === World constraints ===
    /// Pin moth x to the player's x (2.5D lane)
    pub lock_x_to_player: bool,
    /// Block moth motion against walls while inside an active roam box
    pub block_walls_inside_roam_box: bool,
    /// Distance a blocked move stops short of the wall
    pub wall_pullback: f32,

    // === Misc ===
    /// Facing blend rate (per second)
    pub turn_rate: f32,
    /// Player depth change that counts as travel
    pub z_direction_threshold: f32,
    /// Glitch pulse peak intensity
    pub glitch_peak: f32,
    /// Glitch pulse duration (seconds)
    pub glitch_duration: f32,
}

impl Default for FlockConfig {
    fn default() -> Self {
        Self {
            // Headlight
            headlight_on_at_start: false,
            control_headlight_with_input: true,
            on_text: "ON".to_string(),
            off_text: "OFF".to_string(),
            headlight_volume: 0.85,
            headlight_pitch_range: (0.97, 1.03),

            // Recall
            follow_acquire_radius: 6.0,
            pole_pickup: true,
            pole_recall_radius: 6.0,
            follow_gap_distance: 2.0,
            follow_lerp: 10.0,

            // Seek
            seek_speed: 30.0,
            seek_smooth_time: 0.55,
            hard_cap_seek_speed: true,

            // Hysteresis
            orbit_enter_radius: 1.8,
            min_seek_time_before_orbit: 0.6,
            allow_immediate_orbit_if_very_close: true,
            very_close_orbit_radius: 0.6,

            // Orbit
            orbit_min_radius: 0.2,
            orbit_max_radius: 0.7,
            orbit_angular_speed: 12.0,
            orbit_break_radius: 1.8,
            orbit_smooth_time: 0.20,

            // Forced follow
            forced_targets_override_recall: true,
            forced_follow_distance: 2.2,
            forced_side_spread: 0.6,
            forced_hover_y: 0.4,
            forced_follow_smooth_time: 0.45,

            // World
            lock_x_to_player: true,
            block_walls_inside_roam_box: true,
            wall_pullback: 0.05,

            // Misc
            turn_rate: 10.0,
            z_direction_threshold: 0.0005,
            glitch_peak: 1.0,
            glitch_duration: 0.12,
        }
    }
}

impl FlockConfig {
    /// Load configuration from a specific path.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Flock config not found, using defaults");
            return Self::default();
        }

        match fs::File::open(path) {
            Ok(mut file) => {
                let mut contents = String::new();
                if let Err(e) = file.read_to_string(&mut contents) {
                    warn!("Failed to read flock config: {e}");
                    return Self::default();
                }

                match toml::from_str::<Self>(&contents) {
                    Ok(mut config) => {
                        config.validate();
                        info!("Loaded flock config from {}", path.display());
                        config
                    },
                    Err(e) => {
                        warn!("Failed to parse flock config: {e}");
                        Self::default()
                    },
                }
            },
            Err(e) => {
                warn!("Failed to open flock config: {e}");
                Self::default()
            },
        }
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved flock config to {}", path.display());
        Ok(())
    }

    /// Validate and clamp configuration values to sensible ranges.
    ///
    /// Also restores the radius ordering the state machine relies on:
    /// `very_close <= enter <= break` and `orbit_min <= orbit_max`.
    pub fn validate(&mut self) {
        self.headlight_volume = self.headlight_volume.clamp(0.0, 1.0);
        let (lo, hi) = self.headlight_pitch_range;
        let lo = lo.clamp(0.1, 3.0);
        self.headlight_pitch_range = (lo, hi.clamp(lo, 3.0));

        self.follow_acquire_radius = self.follow_acquire_radius.max(0.0);
        self.pole_recall_radius = self.pole_recall_radius.max(0.0);
        self.follow_gap_distance = self.follow_gap_distance.max(0.0);
        self.follow_lerp = self.follow_lerp.max(0.0);

        self.seek_speed = self.seek_speed.max(0.0);
        self.seek_smooth_time = self.seek_smooth_time.max(0.01);
        self.orbit_smooth_time = self.orbit_smooth_time.max(0.01);
        self.forced_follow_smooth_time = self.forced_follow_smooth_time.max(0.01);

        self.orbit_enter_radius = self.orbit_enter_radius.max(0.0);
        self.min_seek_time_before_orbit = self.min_seek_time_before_orbit.max(0.0);
        self.very_close_orbit_radius = self.very_close_orbit_radius.clamp(0.0, self.orbit_enter_radius);
        self.orbit_break_radius = self.orbit_break_radius.max(self.orbit_enter_radius);

        self.orbit_min_radius = self.orbit_min_radius.max(0.0);
        self.orbit_max_radius = self.orbit_max_radius.max(self.orbit_min_radius);

        self.wall_pullback = self.wall_pullback.max(0.0);
        self.turn_rate = self.turn_rate.max(0.0);
        self.z_direction_threshold = self.z_direction_threshold.max(0.0);
        self.glitch_peak = self.glitch_peak.max(0.0);
        self.glitch_duration = self.glitch_duration.max(0.0);
    }

    /// Returns a validated copy.
    #[must_use]
    pub fn validated(mut self) -> Self {
        self.validate();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = FlockConfig::default();
        assert!(!config.headlight_on_at_start);
        assert!((config.orbit_enter_radius - 1.8).abs() < f32::EPSILON);
        assert!(config.orbit_break_radius >= config.orbit_enter_radius);
        assert!(config.forced_targets_override_recall);
    }

    #[test]
    fn test_config_validation_restores_radius_order() {
        let mut config = FlockConfig::default();
        config.orbit_enter_radius = 3.0;
        config.orbit_break_radius = 1.0;
        config.very_close_orbit_radius = 5.0;
        config.orbit_min_radius = 0.9;
        config.orbit_max_radius = 0.1;
        config.headlight_volume = 2.0;

        config.validate();

        assert!((config.orbit_break_radius - 3.0).abs() < f32::EPSILON);
        assert!((config.very_close_orbit_radius - 3.0).abs() < f32::EPSILON);
        assert!(config.orbit_max_radius >= config.orbit_min_radius);
        assert!((config.headlight_volume - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_config_save_load() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("flock.toml");

        let mut config = FlockConfig::default();
        config.seek_speed = 8.0;
        config.lock_x_to_player = false;
        config.on_text = "LIT".to_string();

        config.save_to(&config_path).expect("Failed to save config");

        let loaded = FlockConfig::load_from(&config_path);
        assert!((loaded.seek_speed - 8.0).abs() < f32::EPSILON);
        assert!(!loaded.lock_x_to_player);
        assert_eq!(loaded.on_text, "LIT");
    }

    #[test]
    fn test_config_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("partial.toml");
        fs::write(&config_path, "seek_speed = 12.0\n").expect("write");

        let loaded = FlockConfig::load_from(&config_path);
        assert!((loaded.seek_speed - 12.0).abs() < f32::EPSILON);
        assert!((loaded.follow_gap_distance - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_config_load_missing_file() {
        let config = FlockConfig::load_from("/nonexistent/path/flock.toml");
        assert_eq!(config, FlockConfig::default());
    }

    #[test]
    fn test_config_load_garbage_falls_back() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("bad.toml");
        fs::write(&config_path, "seek_speed = [not toml").expect("write");

        let config = FlockConfig::load_from(&config_path);
        assert_eq!(config, FlockConfig::default());
    }
}
