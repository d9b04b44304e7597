//! Read-only view of the flock for HUDs, goal checks and tools.

use mothlight_common::MothId;
use serde::{Deserialize, Serialize};

/// Coarse flock behavior label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FlockMode {
    /// Nobody follows the player; every moth works the lamps
    #[default]
    SeekLight,
    /// Some moths follow the player, the rest work the lamps
    Mixed,
    /// Every moth follows the player
    FollowLine,
}

impl FlockMode {
    /// Display name.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::SeekLight => "Seek Light",
            Self::Mixed => "Mixed",
            Self::FollowLine => "Follow Line",
        }
    }
}

/// Snapshot of the query surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlockStatus {
    /// Moths currently in the follow line
    pub followers: usize,
    /// Moths in the level
    pub total: usize,
    /// Headlight value
    pub headlight_on: bool,
    /// Coarse mode
    pub mode: FlockMode,
}

/// Read-only flock queries.
///
/// Consumers receive something implementing this at construction instead of
/// reaching into the controller.
pub trait FlockQuery {
    /// Number of moths currently following the player.
    fn follower_count(&self) -> usize;
    /// Number of moths in the level.
    fn moth_count(&self) -> usize;
    /// Current headlight value.
    fn headlight_on(&self) -> bool;
    /// Current coarse mode.
    fn mode(&self) -> FlockMode;
    /// Followers in line order.
    fn followers(&self) -> &[MothId];

    /// All of the above in one value.
    fn status(&self) -> FlockStatus {
        FlockStatus {
            followers: self.follower_count(),
            total: self.moth_count(),
            headlight_on: self.headlight_on(),
            mode: self.mode(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Vec<MothId>);

    impl FlockQuery for Fixed {
        fn follower_count(&self) -> usize {
            self.0.len()
        }
        fn moth_count(&self) -> usize {
            5
        }
        fn headlight_on(&self) -> bool {
            false
        }
        fn mode(&self) -> FlockMode {
            FlockMode::Mixed
        }
        fn followers(&self) -> &[MothId] {
            &self.0
        }
    }

    #[test]
    fn test_status_collects_fields() {
        let q = Fixed(vec![MothId::new(1), MothId::new(3)]);
        let status = q.status();
        assert_eq!(status.followers, 2);
        assert_eq!(status.total, 5);
        assert_eq!(status.mode, FlockMode::Mixed);
        assert!(!status.headlight_on);
    }

    #[test]
    fn test_mode_display_names() {
        assert_eq!(FlockMode::SeekLight.display_name(), "Seek Light");
        assert_eq!(FlockMode::FollowLine.display_name(), "Follow Line");
    }
}
