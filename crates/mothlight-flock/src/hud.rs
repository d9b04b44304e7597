//! Follower counter and exit-door goal.
//!
//! Both read the flock through [`FlockQuery`] only.

use crate::query::FlockQuery;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Minimum seconds between total refreshes.
const MIN_TOTAL_REFRESH: f32 = 0.05;

// ============================================================================
// HUD
// ============================================================================

/// Settings for a [`FollowerHud`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HudConfig {
    /// Text in front of the counter
    pub prefix: String,
    /// Seconds between refreshes of the cached total
    pub total_refresh_interval: f32,
}

impl Default for HudConfig {
    fn default() -> Self {
        Self {
            prefix: "Mothlettes:".to_string(),
            total_refresh_interval: 10.0,
        }
    }
}

/// `current/total` follower counter.
#[derive(Debug, Clone)]
pub struct FollowerHud {
    config: HudConfig,
    cached_total: Option<usize>,
    until_refresh: f32,
    text: String,
}

impl FollowerHud {
    /// Creates a HUD that reads the total on its first update.
    #[must_use]
    pub fn new(config: HudConfig) -> Self {
        Self {
            config,
            cached_total: None,
            until_refresh: 0.0,
            text: String::new(),
        }
    }

    /// Refreshes the label. The follower count is read every call, the total
    /// only every `total_refresh_interval` seconds.
    pub fn update<Q: FlockQuery + ?Sized>(&mut self, flock: &Q, dt: f32) -> &str {
        self.until_refresh -= dt;
        let total = match self.cached_total {
            Some(total) if self.until_refresh > 0.0 => total,
            _ => {
                self.until_refresh = self.config.total_refresh_interval.max(MIN_TOTAL_REFRESH);
                let total = flock.moth_count();
                self.cached_total = Some(total);
                total
            },
        };

        self.text = format!("{}{}/{}", self.config.prefix, flock.follower_count(), total);
        &self.text
    }

    /// Last rendered label.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

// ============================================================================
// Goal checker
// ============================================================================

/// Settings for a [`FollowerGoalChecker`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoalConfig {
    /// Followers needed to pass
    pub required_followers: usize,
    /// Stay passed once passed
    pub check_once: bool,
    /// Seconds between checks, 0 to check every update
    pub poll_interval: f32,
}

impl Default for GoalConfig {
    fn default() -> Self {
        Self {
            required_followers: 5,
            check_once: true,
            poll_interval: 0.0,
        }
    }
}

/// Opens the exit door once enough moths follow the player.
#[derive(Debug, Clone)]
pub struct FollowerGoalChecker {
    config: GoalConfig,
    passed: bool,
    door_satisfied: bool,
    until_poll: f32,
}

impl FollowerGoalChecker {
    /// Creates an unpassed checker.
    #[must_use]
    pub fn new(config: GoalConfig) -> Self {
        Self {
            config,
            passed: false,
            door_satisfied: false,
            until_poll: 0.0,
        }
    }

    /// Checks the follower count. Returns `true` on the update the goal passes.
    pub fn update<Q: FlockQuery + ?Sized>(&mut self, flock: &Q, dt: f32) -> bool {
        if self.config.check_once && self.passed {
            return false;
        }

        if self.config.poll_interval > 0.0 {
            self.until_poll -= dt;
            if self.until_poll > 0.0 {
                return false;
            }
            self.until_poll = self.config.poll_interval;
        }

        let followers = flock.follower_count();
        if followers >= self.config.required_followers {
            if !self.passed {
                self.passed = true;
                self.door_satisfied = true;
                info!("Follower goal passed ({}/{})", followers, self.config.required_followers);
                return true;
            }
        } else {
            self.passed = false;
            self.door_satisfied = false;
        }
        false
    }

    /// Whether the goal has passed.
    #[must_use]
    pub fn has_passed(&self) -> bool {
        self.passed
    }

    /// Whether the exit door has enough moths.
    #[must_use]
    pub fn door_satisfied(&self) -> bool {
        self.door_satisfied
    }
}
