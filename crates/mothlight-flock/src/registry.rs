//! Dense moth storage.
//!
//! Moths are discovered once at level load and never recreated mid-level, so
//! the registry is a plain vector and a [`MothId`] is the slot index.

use crate::moth::Moth;
use mothlight_common::{FlockError, FlockResult, MothId, Pose};

/// Registry of every moth in the level.
#[derive(Debug, Clone, Default)]
pub struct MothRegistry {
    moths: Vec<Moth>,
}

impl MothRegistry {
    /// Creates a registry with one moth per spawn pose.
    #[must_use]
    pub fn from_spawns(spawns: impl IntoIterator<Item = Pose>) -> Self {
        let moths = spawns
            .into_iter()
            .enumerate()
            .map(|(i, pose)| Moth::new(MothId::from_index(i), pose))
            .collect();
        Self { moths }
    }

    /// Returns the number of moths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.moths.len()
    }

    /// Returns whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.moths.is_empty()
    }

    /// Gets a moth by ID.
    pub fn get(&self, id: MothId) -> FlockResult<&Moth> {
        self.moths.get(id.index()).ok_or(FlockError::UnknownMoth(id))
    }

    /// Gets a mutable moth by ID.
    pub fn get_mut(&mut self, id: MothId) -> FlockResult<&mut Moth> {
        self.moths
            .get_mut(id.index())
            .ok_or(FlockError::UnknownMoth(id))
    }

    /// Iterates moths in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Moth> {
        self.moths.iter()
    }

    /// Iterates moths mutably in registration order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Moth> {
        self.moths.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_registry_from_spawns() {
        let registry = MothRegistry::from_spawns([
            Pose::at(Vec3::ZERO),
            Pose::at(Vec3::ONE),
            Pose::at(Vec3::Z),
        ]);

        assert_eq!(registry.len(), 3);
        let ids: Vec<_> = registry.iter().map(Moth::id).collect();
        assert_eq!(ids, vec![MothId::new(0), MothId::new(1), MothId::new(2)]);
        assert_eq!(
            registry.get(MothId::new(1)).expect("should exist").position(),
            Vec3::ONE
        );
    }

    #[test]
    fn test_registry_unknown_id() {
        let mut registry = MothRegistry::from_spawns([Pose::default()]);
        assert!(matches!(
            registry.get(MothId::new(5)),
            Err(FlockError::UnknownMoth(id)) if id == MothId::new(5)
        ));
        assert!(registry.get_mut(MothId::new(1)).is_err());
    }
}
