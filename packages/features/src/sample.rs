//! Seeded row sampling.

use rand::SeedableRng as _;
use rand::seq::index;
use rand_pcg::Pcg64;

/// Default row cap before sampling kicks in.
pub const DEFAULT_MAX_ROWS: usize = 20_000;

/// Seed of the sampling RNG; fixed so that runs are reproducible.
pub const SAMPLE_SEED: u64 = 42;

/// Picks at most `max_rows` distinct row indices out of `len`, without
/// replacement. Returns every index when `len <= max_rows`. Indices are
/// returned in ascending order.
#[must_use]
pub fn sample_indices(len: usize, max_rows: usize, seed: u64) -> Vec<usize> {
    if len <= max_rows {
        return (0..len).collect();
    }
    let mut rng = Pcg64::seed_from_u64(seed);
    let mut picked = index::sample(&mut rng, len, max_rows).into_vec();
    picked.sort_unstable();
    picked
}
