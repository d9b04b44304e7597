//! One-shot disruption transmitter that shuts down a lock zone.

use crate::controller::FlockController;
use crate::lock_zone::HeadlightLockZone;
use tracing::info;

/// What set the transmitter off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransmitterTrigger {
    /// Player interacted with it
    Interact,
    /// A crate hit it
    CrateImpact,
}

/// Disables its linked field the first time it is triggered.
#[derive(Debug, Clone, Default)]
pub struct DisruptionTransmitter {
    used: bool,
}

impl DisruptionTransmitter {
    /// Creates an unused transmitter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether it has fired.
    #[must_use]
    pub fn is_used(&self) -> bool {
        self.used
    }

    /// Player pressed interact in range. Returns whether it fired.
    pub fn interact(&mut self, zone: &mut HeadlightLockZone, flock: &mut FlockController) -> bool {
        self.fire(TransmitterTrigger::Interact, zone, flock)
    }

    /// A crate struck it. Returns whether it fired.
    pub fn crate_impact(&mut self, zone: &mut HeadlightLockZone, flock: &mut FlockController) -> bool {
        self.fire(TransmitterTrigger::CrateImpact, zone, flock)
    }

    fn fire(&mut self, trigger: TransmitterTrigger, zone: &mut HeadlightLockZone, flock: &mut FlockController) -> bool {
        if self.used {
            return false;
        }
        self.used = true;
        info!("Transmitter used ({:?}); disabling field", trigger);
        zone.disable_field(flock);
        true
    }
}
