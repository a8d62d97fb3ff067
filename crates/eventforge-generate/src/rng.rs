//! Seeded pseudo-random streams.
//!
//! A run has a single seed. Each generation stage draws from its own ChaCha8
//! stream derived from that seed and the stage name, so adding draws to one
//! stage never shifts the values produced by another.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// FNV-1a style mix of a seed and a key.
pub fn hash_seed(seed: u64, key: &str) -> u64 {
    let mut hash = seed ^ 0xcbf29ce484222325;
    for byte in key.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

/// Deterministic stream for one named stage of a run.
pub fn stage_rng(seed: u64, stage: &str) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(hash_seed(seed, stage))
}
