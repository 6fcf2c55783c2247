//! Deterministic random number generation for policy slots.
//!
//! Slots never touch ambient randomness. Anything random (tile spawns,
//! the random AI opponent, its tie-breaks) draws from the [`GameRng`] carried
//! in the slot context, so a fixed seed reproduces a game exactly.
//!
//! ```
//! use arcade_mechanics::core::GameRng;
//!
//! // Independent stream per slot, stable for the same seed.
//! let mut spawn = GameRng::new(7).for_context("slide.tileSpawner");
//! let mut spawn_again = GameRng::new(7).for_context("slide.tileSpawner");
//! let cells = [0, 1, 2, 3];
//! assert_eq!(spawn.choose(&cells), spawn_again.choose(&cells));
//! ```

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHasher;
use std::hash::Hasher;

/// Seeded ChaCha8 generator with context-keyed streams.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Derive a stream keyed by a context label (typically a slot key).
    ///
    /// The derived seed depends only on the parent seed and the label bytes,
    /// so it is the same on every platform and toolchain.
    #[must_use]
    pub fn for_context(&self, context: &str) -> Self {
        let mut hasher = FxHasher::default();
        hasher.write_u64(self.seed);
        hasher.write(context.as_bytes());
        Self::new(hasher.finish())
    }

    fn gen_unit(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }

    /// `true` with the given probability.
    pub fn gen_bool(&mut self, probability: f64) -> bool {
        self.inner.gen_bool(probability.clamp(0.0, 1.0))
    }

    /// Uniformly pick an element; `None` for an empty slice.
    #[must_use]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        slice.choose(&mut self.inner)
    }

    /// Pick an index with probability proportional to its weight.
    ///
    /// Weights need not sum to 1. Returns `None` if empty or all weights
    /// are non-positive.
    pub fn choose_weighted(&mut self, weights: &[f64]) -> Option<usize> {
        let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
        if total <= 0.0 {
            return None;
        }

        let mut threshold = self.gen_unit() * total;
        let mut last_positive = None;

        for (i, &weight) in weights.iter().enumerate() {
            if weight <= 0.0 {
                continue;
            }
            last_positive = Some(i);
            threshold -= weight;
            if threshold < 0.0 {
                return Some(i);
            }
        }

        // Rounding can leave a sliver past the last bucket.
        last_positive
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::new(0)
    }
}
