//! Deterministic RNG hierarchy.
//!
//! A master seed generates deterministic sub-seeds for each `(stream, index)`
//! pair. Sub-seeds are derived via BLAKE3 hashing, independently of thread
//! scheduling order, so optimizer trials draw the same parameters whether they
//! run sequentially or on a thread pool.

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Stream name used for optimizer trials.
pub const TRIAL_STREAM: &str = "trial";

/// Deterministic RNG hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RngHierarchy {
    master_seed: u64,
}

impl RngHierarchy {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Derive a deterministic sub-seed for `(stream, index)`.
    ///
    /// Independent of derivation order: `sub_seed("trial", 3)` is the same
    /// value whether or not `sub_seed("trial", 2)` was derived first.
    pub fn sub_seed(&self, stream: &str, index: u64) -> u64 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.master_seed.to_le_bytes());
        hasher.update(stream.as_bytes());
        hasher.update(&index.to_le_bytes());
        let hash = hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&hash.as_bytes()[..8]);
        u64::from_le_bytes(bytes)
    }

    /// Create a seeded StdRng for `(stream, index)`.
    pub fn rng_for(&self, stream: &str, index: u64) -> StdRng {
        StdRng::seed_from_u64(self.sub_seed(stream, index))
    }

    /// RNG for optimizer trial `trial`.
    pub fn rng_for_trial(&self, trial: usize) -> StdRng {
        self.rng_for(TRIAL_STREAM, trial as u64)
    }
}
