//! Wall-clock timing of repeated calls.

use std::time::Instant;

use serde::Serialize;

use crate::error::{AttentionError, Result};

/// Average latency of a timed callable, with an optional throughput figure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BenchmarkResult {
    /// Mean wall-clock milliseconds per call.
    pub time_ms: f64,
    /// Billions of floating point operations per second, `0.0` when no
    /// operation count was supplied.
    pub gflops: f64,
}

impl BenchmarkResult {
    fn from_timing(time_ms: f64, flops: u64) -> Self {
        let gflops = if flops > 0 && time_ms > 0.0 {
            (flops as f64 / (time_ms / 1000.0)) / 1e9
        } else {
            0.0
        };
        Self { time_ms, gflops }
    }

    /// One-line summary such as `NaiveAttention: 1.25 ms (3.10 GFLOPS)`.
    pub fn summary(&self, name: &str) -> String {
        let mut line = format!("{name}: {:.2} ms", self.time_ms);
        if self.gflops > 0.0 {
            line.push_str(&format!(" ({:.2} GFLOPS)", self.gflops));
        }
        line
    }
}

/// Runs `func` once untimed, then `iterations` times under the clock, and
/// reports the mean latency.
///
/// The first failing call aborts the measurement and its error is returned.
pub fn time_function<F>(mut func: F, iterations: usize, flops: u64) -> Result<BenchmarkResult>
where
    F: FnMut() -> Result<()>,
{
    if iterations == 0 {
        return Err(AttentionError::InvalidArgument {
            arg: "iterations",
            reason: "must be positive, got 0".to_string(),
        });
    }

    // Warm-up
    func()?;

    let start = Instant::now();
    for _ in 0..iterations {
        func()?;
    }
    let elapsed = start.elapsed().as_secs_f64();
    let time_ms = elapsed * 1000.0 / iterations as f64;
    Ok(BenchmarkResult::from_timing(time_ms, flops))
}
