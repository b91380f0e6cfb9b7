//! Seeded gradient noise.

use noise::{NoiseFn, Simplex};

/// Seeded 2D/3D simplex noise in roughly [-1, 1].
///
/// The permutation table is shuffled from the seed when the source is built,
/// so two sources with the same seed return identical values for identical
/// inputs on any thread.
#[derive(Clone, Debug)]
pub struct NoiseSource {
    seed: u32,
    simplex: Simplex,
}

impl NoiseSource {
    /// A source whose samples depend only on `seed`.
    pub fn new(seed: u32) -> Self {
        NoiseSource {
            seed,
            simplex: Simplex::new(seed),
        }
    }

    /// The seed.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// 2D simplex noise in roughly -1..=1.
    #[inline]
    pub fn sample_2d(&self, x: f64, y: f64) -> f64 {
        self.simplex.get([x, y])
    }

    /// 3D simplex noise in roughly -1..=1.
    #[inline]
    pub fn sample_3d(&self, x: f64, y: f64, z: f64) -> f64 {
        self.simplex.get([x, y, z])
    }
}
