//! Seeded RNG wrappers.
//!
//! Every source of randomness in a run hangs off `SimConfig::seed`:
//!
//! | Stream      | Type        | Seed                                          |
//! |-------------|-------------|-----------------------------------------------|
//! | per worker  | `WorkerRng` | `seed ^ (worker_id × φ64)`                    |
//! | generator   | `SimRng`    | child 0 of `SimRng::new(seed)`                |
//! | projector   | `SimRng`    | child 1 of `SimRng::new(seed)`                |
//!
//! `φ64` is the golden ratio's 64-bit fraction, so neighbouring worker ids
//! land far apart in seed space.  A worker's context-switch draws never
//! depend on how often anyone else drew.

use rand::distributions::uniform::{SampleRange, SampleUniform};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::WorkerId;

const GOLDEN_GAMMA: u64 = 0x9e37_79b9_7f4a_7c15;

#[inline]
fn mix(seed: u64, salt: u64) -> SmallRng {
    SmallRng::seed_from_u64(seed ^ salt.wrapping_mul(GOLDEN_GAMMA))
}

/// Context-switch lengths and other per-worker draws.
pub struct WorkerRng(SmallRng);

impl WorkerRng {
    pub fn new(global_seed: u64, worker: WorkerId) -> Self {
        WorkerRng(mix(global_seed, worker.0 as u64))
    }

    #[inline]
    pub fn gen_range<T: SampleUniform, R: SampleRange<T>>(&mut self, range: R) -> T {
        self.0.gen_range(range)
    }
}

/// Run-wide draws: ticket generation and the projection.
///
/// Hand each consumer its own [`child`](Self::child) so extra draws in one
/// place leave the others' sequences alone.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    pub fn child(&mut self, offset: u64) -> SimRng {
        let base = self.0.r#gen::<u64>();
        SimRng(mix(base, offset))
    }

    /// The underlying generator, for sampling `rand_distr` distributions.
    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    /// Uniform in `[0, 1)`.
    #[inline]
    pub fn unit(&mut self) -> f64 {
        self.0.r#gen()
    }

    #[inline]
    pub fn gen_range<T: SampleUniform, R: SampleRange<T>>(&mut self, range: R) -> T {
        self.0.gen_range(range)
    }
}
