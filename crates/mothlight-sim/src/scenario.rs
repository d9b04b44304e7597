//! Scenario files.
//!
//! A scenario describes one level for the headless runner: flock tunables,
//! seed and timing, the player's path, lamps, moths, roam boxes, walls,
//! stalkers and the headlight key presses.

use glam::Vec3;
use mothlight_common::{FlockError, FlockResult};
use mothlight_flock::{FlockConfig, GoalConfig, HudConfig, LockZoneConfig, PriorityRadiusConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tracing::info;

/// Player position at a given tick. The runner interpolates between waypoints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    /// Tick the player reaches `position`
    pub tick: u32,
    /// Player position
    pub position: Vec3,
}

/// Axis-aligned box given by two corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxSpec {
    /// One corner
    pub min: Vec3,
    /// Opposite corner
    pub max: Vec3,
}

/// A roam box, optionally switched off part way through.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoamBoxSpec {
    /// Extent
    #[serde(flatten)]
    pub bounds: BoxSpec,
    /// Tick at which a lever switches the box off
    #[serde(default)]
    pub deactivate_at: Option<u32>,
}

/// A stalker standing still with a priority radius around it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StalkerSpec {
    /// Where it stands
    pub position: Vec3,
    /// Capture settings
    #[serde(default)]
    pub radius: PriorityRadiusConfig,
    /// Tick at which the stalker is removed
    #[serde(default)]
    pub despawn_at: Option<u32>,
}

/// A headlight lock field, optionally with a transmitter that kills it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LockZoneSpec {
    /// Extent
    #[serde(flatten)]
    pub bounds: BoxSpec,
    /// Shutdown fade settings
    #[serde(default)]
    pub fade: LockZoneConfig,
    /// Tick at which the player uses the transmitter
    #[serde(default)]
    pub transmitter_used_at: Option<u32>,
}

/// A full level description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    // === Timing ===
    /// RNG seed for orbit choices and sound pitch
    pub seed: u64,
    /// Ticks per simulated second
    pub tick_rate: u32,
    /// Ticks to run
    pub ticks: u32,
    /// Ticks on which the headlight key is pressed
    pub toggle_ticks: Vec<u32>,

    // === Level ===
    /// Player path (at least one waypoint)
    pub player_path: Vec<Waypoint>,
    /// Lamp positions
    pub lamps: Vec<Vec3>,
    /// Moth spawn positions
    pub moths: Vec<Vec3>,
    /// Roam boxes
    pub roam_boxes: Vec<RoamBoxSpec>,
    /// Solid walls
    pub walls: Vec<BoxSpec>,
    /// Stalkers
    pub stalkers: Vec<StalkerSpec>,
    /// Headlight lock fields
    pub lock_zones: Vec<LockZoneSpec>,

    // === Systems ===
    /// Flock tunables
    pub flock: FlockConfig,
    /// Follower counter
    pub hud: HudConfig,
    /// Exit-door requirement
    pub goal: GoalConfig,
}

impl Default for Scenario {
    fn default() -> Self {
        let lamps = vec![
            Vec3::new(0.0, 2.0, 12.0),
            Vec3::new(0.0, 2.0, 28.0),
            Vec3::new(0.0, 2.0, 44.0),
        ];
        let moths = (0..6)
            .map(|i| Vec3::new(0.0, 1.0, 4.0 + i as f32 * 7.0))
            .collect();

        Self {
            seed: 0x4D07_11A7,
            tick_rate: 60,
            ticks: 900,
            player_path: vec![
                Waypoint {
                    tick: 0,
                    position: Vec3::ZERO,
                },
                Waypoint {
                    tick: 600,
                    position: Vec3::new(0.0, 0.0, 48.0),
                },
            ],
            lamps,
            moths,
            roam_boxes: vec![RoamBoxSpec {
                bounds: BoxSpec {
                    min: Vec3::new(-3.0, -1.0, 30.0),
                    max: Vec3::new(3.0, 5.0, 38.0),
                },
                deactivate_at: Some(500),
            }],
            walls: vec![BoxSpec {
                min: Vec3::new(-3.0, -1.0, 37.5),
                max: Vec3::new(3.0, 5.0, 38.0),
            }],
            stalkers: vec![StalkerSpec {
                position: Vec3::new(0.0, 1.0, 20.0),
                radius: PriorityRadiusConfig {
                    radius: 3.0,
                    ..PriorityRadiusConfig::default()
                },
                despawn_at: Some(300),
            }],
            lock_zones: vec![LockZoneSpec {
                bounds: BoxSpec {
                    min: Vec3::new(-3.0, -1.0, 40.0),
                    max: Vec3::new(3.0, 5.0, 46.0),
                },
                fade: LockZoneConfig::default(),
                transmitter_used_at: Some(700),
            }],
            toggle_ticks: vec![420, 660],
            flock: FlockConfig::default(),
            hud: HudConfig::default(),
            goal: GoalConfig {
                required_followers: 4,
                ..GoalConfig::default()
            },
        }
    }
}

impl Scenario {
    /// Reads and validates a scenario file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> FlockResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let scenario: Self = toml::from_str(&contents).map_err(|e| FlockError::Config(e.to_string()))?;
        scenario.check()?;
        info!("Loaded scenario from {}", path.display());
        Ok(scenario)
    }

    /// Writes the scenario as pretty TOML.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved scenario to {}", path.display());
        Ok(())
    }

    /// Rejects scenarios the runner cannot play.
    pub fn check(&self) -> FlockResult<()> {
        if self.tick_rate == 0 {
            return Err(FlockError::Config("tick_rate must be positive".to_string()));
        }
        if self.player_path.is_empty() {
            return Err(FlockError::Config("player_path needs at least one waypoint".to_string()));
        }
        if self.player_path.windows(2).any(|w| w[1].tick < w[0].tick) {
            return Err(FlockError::Config("player_path ticks must not decrease".to_string()));
        }
        Ok(())
    }

    /// Seconds per tick.
    #[must_use]
    pub fn dt(&self) -> f32 {
        1.0 / self.tick_rate.max(1) as f32
    }

    /// Player position at `tick`, interpolated along the path and held at
    /// both ends.
    #[must_use]
    pub fn player_at(&self, tick: u32) -> Vec3 {
        let path = &self.player_path;
        let Some(first) = path.first() else {
            return Vec3::ZERO;
        };
        if tick <= first.tick {
            return first.position;
        }

        for pair in path.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if tick <= b.tick {
                let span = (b.tick - a.tick).max(1) as f32;
                let t = (tick - a.tick) as f32 / span;
                return a.position.lerp(b.position, t);
            }
        }
        path.last().map_or(first.position, |w| w.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_scenario_is_playable() {
        let scenario = Scenario::default();
        assert!(scenario.check().is_ok());
        assert_eq!(scenario.moths.len(), 6);
    }

    #[test]
    fn test_player_path_interpolates_and_clamps() {
        let scenario = Scenario::default();
        assert_eq!(scenario.player_at(0), Vec3::ZERO);
        assert!((scenario.player_at(300).z - 24.0).abs() < 1e-4);
        assert_eq!(scenario.player_at(5000), Vec3::new(0.0, 0.0, 48.0));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("level.toml");

        let scenario = Scenario {
            ticks: 42,
            ..Scenario::default()
        };
        scenario.save_to(&path).expect("save");

        let loaded = Scenario::from_path(&path).expect("load");
        assert_eq!(loaded.ticks, 42);
        assert_eq!(loaded.lamps, scenario.lamps);
        assert_eq!(loaded.roam_boxes[0].deactivate_at, Some(500));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("partial.toml");
        fs::write(&path, "ticks = 10\nmoths = [[0.0, 0.0, 3.0]]\n").expect("write");

        let loaded = Scenario::from_path(&path).expect("load");
        assert_eq!(loaded.ticks, 10);
        assert_eq!(loaded.moths, vec![Vec3::new(0.0, 0.0, 3.0)]);
        assert_eq!(loaded.tick_rate, 60);
    }

    #[test]
    fn test_bad_files_are_errors() {
        let dir = tempdir().expect("temp dir");

        let missing = Scenario::from_path(dir.path().join("nope.toml"));
        assert!(matches!(missing, Err(FlockError::Io(_))));

        let path = dir.path().join("bad.toml");
        fs::write(&path, "tick_rate = 0\n").expect("write");
        assert!(matches!(Scenario::from_path(&path), Err(FlockError::Config(_))));
    }
}
