//! Tests for the white-box pipeline. Randomized tests use a seeded ChaCha
//! RNG so every run is reproducible.

mod anf;
mod attack;
mod bits;
mod codegen;
mod equivalence;
mod groebner;
mod poly;
mod speck;
mod whitebox;

use {rand::SeedableRng, rand_chacha::ChaCha20Rng};

/// A reproducible RNG for randomized tests.
fn rng(seed: u64) -> ChaCha20Rng {
    ChaCha20Rng::seed_from_u64(seed)
}
