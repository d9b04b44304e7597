//! Seeded random source for orbit setup and sound pitch.

use std::f32::consts::TAU;

/// Deterministic RNG injected into the flock controller.
///
/// Identical seeds give identical orbit radii, spins and phases, so whole
/// levels replay exactly under test.
#[derive(Debug, Clone)]
pub struct FlockRng {
    inner: fastrand::Rng,
}

impl FlockRng {
    /// Create a new RNG with seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: fastrand::Rng::with_seed(seed),
        }
    }

    /// Get random f32 in [0, 1).
    pub fn next_f32(&mut self) -> f32 {
        self.inner.f32()
    }

    /// Get random value in range [min, max].
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }

    /// Either `1.0` or `-1.0` with equal odds.
    pub fn sign(&mut self) -> f32 {
        if self.inner.bool() {
            1.0
        } else {
            -1.0
        }
    }

    /// Random angle in radians, [0, TAU).
    pub fn angle(&mut self) -> f32 {
        self.next_f32() * TAU
    }
}
