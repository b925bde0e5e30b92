//! Seeded random number generation.
//!
//! Every operator takes its generator explicitly; nothing in the crate reads
//! a global random source. This module only fixes which generator the engine
//! and the binary construct.

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Generator used by the engine.
pub type Rng = StdRng;

/// Creates a deterministic generator from a seed.
pub fn create_rng(seed: u64) -> Rng {
    StdRng::seed_from_u64(seed)
}

/// Creates a generator seeded from the operating system.
pub fn entropy_rng() -> Rng {
    create_rng(rand::random())
}
