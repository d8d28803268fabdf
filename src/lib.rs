//! Multi-head scaled dot-product attention over flat row-major `f32` buffers.
//!
//! Tensors are plain slices with their shape passed alongside at every call.
//! [`math`] and [`softmax`] provide the primitives, [`attention`] composes
//! them into interchangeable engines behind the [`Attention`] trait, and
//! [`bench`] measures them.

pub mod attention;
pub mod bench;
pub mod config;
pub mod error;
pub mod logging;
pub mod math;
pub mod rng;
pub mod softmax;

pub use attention::{
    create, create_with_weights, Attention, AttentionKind, NaiveAttention, ParallelAttention,
    WeightInit, WeightSet, DEFAULT_BENCH_ITERATIONS,
};
pub use bench::BenchmarkResult;
pub use config::{AttentionConfig, RunConfig};
pub use error::{AttentionError, ConfigError, Result};
