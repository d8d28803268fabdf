use rand::{rngs::StdRng, Rng, SeedableRng};
use std::sync::atomic::{AtomicU64, Ordering};

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// Create a [`StdRng`] seeded from the `SEED` environment variable.
///
/// Each call uses a unique seed derived from the base seed and an
/// incrementing counter to ensure deterministic yet distinct streams.
pub fn rng_from_env() -> StdRng {
    let base: u64 = std::env::var("SEED")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);
    let idx = COUNTER.fetch_add(1, Ordering::SeqCst);
    StdRng::seed_from_u64(base.wrapping_add(idx))
}

/// Create a [`StdRng`] from an explicit seed.
pub fn seeded(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Flat `rows x cols` matrix with elements drawn uniformly from `[min, max)`.
///
/// A range that is empty, has a NaN bound, or whose width is not a finite
/// `f32` fills the matrix with `min`.
pub fn random_matrix<R: Rng + ?Sized>(
    rng: &mut R,
    rows: usize,
    cols: usize,
    min: f32,
    max: f32,
) -> Vec<f32> {
    if !(min < max) || !(max - min).is_finite() {
        return vec![min; rows * cols];
    }
    (0..rows * cols).map(|_| rng.gen_range(min..max)).collect()
}

/// [`random_matrix`] over `[-1, 1)`.
pub fn random_matrix_default<R: Rng + ?Sized>(rng: &mut R, rows: usize, cols: usize) -> Vec<f32> {
    random_matrix(rng, rows, cols, -1.0, 1.0)
}
