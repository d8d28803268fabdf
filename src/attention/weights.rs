//! Projection weights owned by an attention engine.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{AttentionError, Result};
use crate::rng::random_matrix;

/// How fresh weights are drawn.
///
/// The default draws every projection matrix uniformly from `[-0.1, 0.1)` and
/// zero-initialises all four biases.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightInit {
    /// Half-width of the uniform range.
    pub range: f32,
    /// Whether bias vectors are present.
    pub bias: bool,
}

impl Default for WeightInit {
    fn default() -> Self {
        Self {
            range: 0.1,
            bias: true,
        }
    }
}

/// The four `[d_model, d_model]` projections and their optional biases,
/// stored row-major so that `Q = X * w_q + b_q`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightSet {
    pub d_model: usize,
    pub w_q: Vec<f32>,
    pub w_k: Vec<f32>,
    pub w_v: Vec<f32>,
    pub w_o: Vec<f32>,
    #[serde(default)]
    pub b_q: Option<Vec<f32>>,
    #[serde(default)]
    pub b_k: Option<Vec<f32>>,
    #[serde(default)]
    pub b_v: Option<Vec<f32>>,
    #[serde(default)]
    pub b_o: Option<Vec<f32>>,
}

impl WeightSet {
    pub fn random<R: Rng + ?Sized>(d_model: usize, init: &WeightInit, rng: &mut R) -> Self {
        let range = init.range.abs();
        let w_q = random_matrix(&mut *rng, d_model, d_model, -range, range);
        let w_k = random_matrix(&mut *rng, d_model, d_model, -range, range);
        let w_v = random_matrix(&mut *rng, d_model, d_model, -range, range);
        let w_o = random_matrix(&mut *rng, d_model, d_model, -range, range);
        let bias = || init.bias.then(|| vec![0.0; d_model]);
        Self {
            d_model,
            w_q,
            w_k,
            w_v,
            w_o,
            b_q: bias(),
            b_k: bias(),
            b_v: bias(),
            b_o: bias(),
        }
    }

    /// Identity projections without biases; the engine then attends directly
    /// over its input.
    pub fn identity(d_model: usize) -> Self {
        let mut eye = vec![0.0; d_model * d_model];
        for i in 0..d_model {
            eye[i * d_model + i] = 1.0;
        }
        Self {
            d_model,
            w_q: eye.clone(),
            w_k: eye.clone(),
            w_v: eye.clone(),
            w_o: eye,
            b_q: None,
            b_k: None,
            b_v: None,
            b_o: None,
        }
    }

    /// Checks that every matrix is `d_model x d_model` and every present bias
    /// has `d_model` elements.
    pub fn validate(&self, d_model: usize) -> Result<()> {
        if self.d_model != d_model {
            return Err(AttentionError::Weights {
                reason: format!("weights built for d_model {}, engine has {d_model}", self.d_model),
            });
        }
        let matrices = [
            ("w_q", &self.w_q),
            ("w_k", &self.w_k),
            ("w_v", &self.w_v),
            ("w_o", &self.w_o),
        ];
        for (name, m) in matrices {
            if m.len() != d_model * d_model {
                return Err(AttentionError::Weights {
                    reason: format!(
                        "{name} has {} elements, expected {d_model}x{d_model}",
                        m.len()
                    ),
                });
            }
        }
        let biases = [
            ("b_q", &self.b_q),
            ("b_k", &self.b_k),
            ("b_v", &self.b_v),
            ("b_o", &self.b_o),
        ];
        for (name, b) in biases {
            if let Some(b) = b {
                if b.len() != d_model {
                    return Err(AttentionError::Weights {
                        reason: format!("{name} has {} elements, expected {d_model}", b.len()),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}
