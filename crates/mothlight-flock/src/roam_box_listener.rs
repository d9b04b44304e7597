//! Trigger-volume notifications for roam boxes.
//!
//! Behaves like a trigger collider on each moth: entering an active box
//! reports `inside = true`, leaving every box reports `inside = false`.
//! Switching a box off while a moth sits in it reports nothing; containment
//! re-checks box activity on its own.

use crate::controller::FlockController;
use crate::world::RoamBoxVolumes;
use mothlight_common::{FlockResult, MothId};
use tracing::debug;

/// Emits roam-box enter/exit calls for every moth.
#[derive(Debug, Clone, Default)]
pub struct RoamBoxListener {
    inside: Vec<MothId>,
}

impl RoamBoxListener {
    /// Creates a listener with every moth outside.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the listener last reported `id` as inside.
    #[must_use]
    pub fn is_inside(&self, id: MothId) -> bool {
        self.inside.contains(&id)
    }

    /// Compares each moth's position against the volumes and reports changes.
    pub fn update<V: RoamBoxVolumes + ?Sized>(&mut self, flock: &mut FlockController, volumes: &V) -> FlockResult<()> {
        let positions: Vec<_> = flock.moths().iter().map(|m| (m.id(), m.position())).collect();

        for (id, pos) in positions {
            let was_inside = self.inside.contains(&id);

            if !was_inside && volumes.active_roam_box_at(pos).is_some() {
                debug!("{} entered a roam box", id);
                self.inside.push(id);
                flock.set_moth_inside_roam_box(id, true)?;
            } else if was_inside && !volumes.inside_any_roam_box(pos) {
                debug!("{} left the roam boxes", id);
                self.inside.retain(|&m| m != id);
                flock.set_moth_inside_roam_box(id, false)?;
            }
        }
        Ok(())
    }
}
