//! Multi-head attention engines behind a common contract.
//!
//! Every engine consumes a flat row-major `[seq_len, d_model]` buffer and
//! returns a buffer of the same shape. Engines are built through validating
//! factories, own their weights, and keep no state between calls, so
//! [`Attention::forward`] takes `&self` and may be called from several threads
//! at once.

pub mod head;
pub mod naive;
pub mod parallel;
pub mod weights;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::bench::{self, BenchmarkResult};
use crate::config::AttentionConfig;
use crate::error::{AttentionError, Result};
use crate::rng::{random_matrix_default, rng_from_env};

pub use naive::NaiveAttention;
pub use parallel::ParallelAttention;
pub use weights::{WeightInit, WeightSet};

/// Iteration count used when a caller has no preference.
pub const DEFAULT_BENCH_ITERATIONS: usize = 100;

/// Common interface for attention variants.
pub trait Attention: Send + Sync {
    fn config(&self) -> &AttentionConfig;

    /// Stable identifier used when reporting and comparing variants.
    fn name(&self) -> &str;

    /// Full multi-head attention over `input`, which must hold exactly
    /// `seq_len * d_model` elements. Deterministic for a given instance.
    fn forward(&self, input: &[f32]) -> Result<Vec<f32>>;

    fn seq_len(&self) -> usize {
        self.config().seq_len()
    }

    fn d_model(&self) -> usize {
        self.config().d_model()
    }

    fn num_heads(&self) -> usize {
        self.config().num_heads()
    }

    fn head_dim(&self) -> usize {
        self.config().head_dim()
    }

    fn validate_input(&self, input: &[f32]) -> Result<()> {
        self.config().validate_input(input)
    }

    /// Latency and throughput of [`forward`](Attention::forward) on a random
    /// input of the engine's own shape drawn from [`rng_from_env`].
    fn benchmark_report(&self, iterations: usize) -> Result<BenchmarkResult> {
        let config = *self.config();
        let input = random_matrix_default(&mut rng_from_env(), config.seq_len(), config.d_model());
        self.benchmark_with_input(&input, iterations)
    }

    /// Times [`forward`](Attention::forward) on a caller-supplied input: one
    /// untimed warm-up call, then `iterations` timed calls.
    fn benchmark_with_input(&self, input: &[f32], iterations: usize) -> Result<BenchmarkResult> {
        if iterations == 0 {
            return Err(AttentionError::InvalidArgument {
                arg: "iterations",
                reason: "must be positive, got 0".to_string(),
            });
        }
        self.validate_input(input)?;
        let result = bench::time_function(
            || self.forward(input).map(|_| ()),
            iterations,
            self.config().forward_flops(),
        )?;
        log::debug!(
            "{} benchmark: {} iterations, {:.4} ms/iter",
            self.name(),
            iterations,
            result.time_ms
        );
        Ok(result)
    }

    /// Mean milliseconds per forward call; see [`benchmark_report`](Attention::benchmark_report).
    fn benchmark(&self, iterations: usize) -> Result<f64> {
        Ok(self.benchmark_report(iterations)?.time_ms)
    }
}

/// Selects an engine implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttentionKind {
    /// Sequential reference pipeline.
    Naive,
    /// Heads computed concurrently on the rayon pool.
    Parallel,
}

impl AttentionKind {
    pub const ALL: [AttentionKind; 2] = [AttentionKind::Naive, AttentionKind::Parallel];
}

impl fmt::Display for AttentionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttentionKind::Naive => f.write_str("naive"),
            AttentionKind::Parallel => f.write_str("parallel"),
        }
    }
}

impl FromStr for AttentionKind {
    type Err = AttentionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "naive" => Ok(AttentionKind::Naive),
            "parallel" => Ok(AttentionKind::Parallel),
            other => Err(AttentionError::InvalidArgument {
                arg: "kind",
                reason: format!("unknown attention variant '{other}'"),
            }),
        }
    }
}

/// Build an engine of the requested kind with freshly drawn weights.
///
/// The dimensions are validated before any weight is allocated.
pub fn create(
    kind: AttentionKind,
    seq_len: i64,
    d_model: i64,
    num_heads: i64,
) -> Result<Box<dyn Attention>> {
    let config = AttentionConfig::new(seq_len, d_model, num_heads)?;
    let weights = WeightSet::random(config.d_model(), &WeightInit::default(), &mut rng_from_env());
    create_with_weights(kind, config, weights)
}

/// Build an engine of the requested kind around an existing weight set.
pub fn create_with_weights(
    kind: AttentionKind,
    config: AttentionConfig,
    weights: WeightSet,
) -> Result<Box<dyn Attention>> {
    Ok(match kind {
        AttentionKind::Naive => Box::new(NaiveAttention::with_weights(config, weights)?),
        AttentionKind::Parallel => Box::new(ParallelAttention::with_weights(config, weights)?),
    })
}
