use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::attention::AttentionKind;
use crate::error::{AttentionError, ConfigError, Result};

/// Validated attention geometry: `(seq_len, d_model, num_heads)` with the
/// derived `head_dim = d_model / num_heads`.
///
/// The only way to obtain one is [`AttentionConfig::new`], so every instance
/// satisfies `seq_len > 0`, `d_model > 0`, `num_heads > 0` and
/// `d_model % num_heads == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttentionConfig {
    seq_len: usize,
    d_model: usize,
    num_heads: usize,
    head_dim: usize,
}

impl AttentionConfig {
    /// Validate the raw dimensions. Checks run in the order seq_len, d_model,
    /// num_heads, divisibility and the first violation is reported.
    pub fn new(seq_len: i64, d_model: i64, num_heads: i64) -> std::result::Result<Self, ConfigError> {
        if seq_len <= 0 {
            return Err(ConfigError::SeqLen(seq_len));
        }
        if d_model <= 0 {
            return Err(ConfigError::DModel(d_model));
        }
        if num_heads <= 0 {
            return Err(ConfigError::NumHeads(num_heads));
        }
        if d_model % num_heads != 0 {
            return Err(ConfigError::IndivisibleHeads { d_model, num_heads });
        }
        let too_large = ConfigError::TooLarge { seq_len, d_model };
        let seq_len_u = usize::try_from(seq_len).map_err(|_| too_large.clone())?;
        let d_model_u = usize::try_from(d_model).map_err(|_| too_large.clone())?;
        let num_heads_u =
            usize::try_from(num_heads).map_err(|_| ConfigError::NumHeads(num_heads))?;
        // input, weight and score buffers: [s, d], [d, d], [s, s]
        let fits = seq_len_u.checked_mul(d_model_u).is_some()
            && d_model_u.checked_mul(d_model_u).is_some()
            && seq_len_u.checked_mul(seq_len_u).is_some();
        if !fits {
            return Err(too_large);
        }
        Ok(Self {
            seq_len: seq_len_u,
            d_model: d_model_u,
            num_heads: num_heads_u,
            head_dim: d_model_u / num_heads_u,
        })
    }

    pub fn seq_len(&self) -> usize {
        self.seq_len
    }

    pub fn d_model(&self) -> usize {
        self.d_model
    }

    pub fn num_heads(&self) -> usize {
        self.num_heads
    }

    pub fn head_dim(&self) -> usize {
        self.head_dim
    }

    /// Number of elements an input or output buffer holds.
    pub fn input_len(&self) -> usize {
        self.seq_len * self.d_model
    }

    /// Rejects any buffer whose length is not exactly `seq_len * d_model`.
    pub fn validate_input(&self, input: &[f32]) -> Result<()> {
        let expected = self.input_len();
        if input.len() != expected {
            return Err(AttentionError::Shape {
                expected,
                actual: input.len(),
                seq_len: self.seq_len,
                d_model: self.d_model,
            });
        }
        Ok(())
    }

    /// Floating point operations of one forward pass, counting a multiply-add
    /// as two: four `[s, d] x [d, d]` projections plus `Q_h K_h^T` and
    /// `weights V_h` over all heads. Saturates at `u64::MAX`.
    pub fn forward_flops(&self) -> u64 {
        let s = self.seq_len as u64;
        let d = self.d_model as u64;
        let projections = 8u64.saturating_mul(s).saturating_mul(d).saturating_mul(d);
        let attention = 4u64.saturating_mul(s).saturating_mul(s).saturating_mul(d);
        projections.saturating_add(attention)
    }
}

/// One benchmark shape as written in a run configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ShapeSpec {
    pub seq_len: i64,
    pub d_model: i64,
    pub num_heads: i64,
}

impl ShapeSpec {
    pub fn validate(&self) -> std::result::Result<AttentionConfig, ConfigError> {
        AttentionConfig::new(self.seq_len, self.d_model, self.num_heads)
    }
}

/// Benchmark run configuration loaded from a TOML or JSON file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Timed forward calls per benchmark.
    pub iterations: usize,
    /// Seed for weight and input generation; falls back to `SEED`.
    pub seed: Option<u64>,
    /// Variants to benchmark against each other.
    pub variants: Vec<AttentionKind>,
    pub shapes: Vec<ShapeSpec>,
    /// Largest tolerated absolute difference between a variant and the naive output.
    pub tolerance: f32,
    /// Directory receiving benchmark records; records are not persisted when unset.
    pub log_dir: Option<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            iterations: crate::attention::DEFAULT_BENCH_ITERATIONS,
            seed: None,
            variants: vec![AttentionKind::Naive, AttentionKind::Parallel],
            shapes: vec![
                ShapeSpec {
                    seq_len: 4,
                    d_model: 8,
                    num_heads: 2,
                },
                ShapeSpec {
                    seq_len: 64,
                    d_model: 256,
                    num_heads: 8,
                },
            ],
            tolerance: 1e-4,
            log_dir: None,
        }
    }
}

impl RunConfig {
    /// Load configuration from the given path. Supports TOML or JSON based on
    /// the file extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        if path.extension().and_then(|e| e.to_str()) == Some("json") {
            Ok(serde_json::from_str(&content)?)
        } else {
            Ok(toml::from_str(&content)?)
        }
    }
}
