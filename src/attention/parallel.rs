//! Multi-head attention with heads computed concurrently.

use rand::Rng;
use rayon::prelude::*;

use super::head;
use super::weights::{WeightInit, WeightSet};
use super::Attention;
use crate::config::AttentionConfig;
use crate::error::Result;
use crate::rng::rng_from_env;

/// Same pipeline as [`NaiveAttention`](super::NaiveAttention), with the
/// per-head stage spread over the rayon pool.
///
/// Each head still runs scores, softmax and the weighted sum in order, and all
/// heads are materialised before concatenation, so for equal weights the
/// output matches the naive engine.
#[derive(Debug, Clone)]
pub struct ParallelAttention {
    config: AttentionConfig,
    weights: WeightSet,
}

impl ParallelAttention {
    pub const NAME: &'static str = "ParallelAttention";

    pub fn create(seq_len: i64, d_model: i64, num_heads: i64) -> Result<Self> {
        let config = AttentionConfig::new(seq_len, d_model, num_heads)?;
        Ok(Self::with_rng(config, &WeightInit::default(), &mut rng_from_env()))
    }

    pub fn with_rng<R: Rng + ?Sized>(config: AttentionConfig, init: &WeightInit, rng: &mut R) -> Self {
        let weights = WeightSet::random(config.d_model(), init, rng);
        log::debug!(
            "{} init seq_len={} d_model={} num_heads={} threads={}",
            Self::NAME,
            config.seq_len(),
            config.d_model(),
            config.num_heads(),
            rayon::current_num_threads()
        );
        Self { config, weights }
    }

    pub fn with_weights(config: AttentionConfig, weights: WeightSet) -> Result<Self> {
        weights.validate(config.d_model())?;
        Ok(Self { config, weights })
    }

    pub fn weights(&self) -> &WeightSet {
        &self.weights
    }
}

impl Attention for ParallelAttention {
    fn config(&self) -> &AttentionConfig {
        &self.config
    }

    fn name(&self) -> &str {
        Self::NAME
    }

    fn forward(&self, input: &[f32]) -> Result<Vec<f32>> {
        self.validate_input(input)?;
        let projections = head::project_qkv(&self.weights, &self.config, input)?;
        let heads = (0..self.config.num_heads())
            .into_par_iter()
            .map(|h| head::attend_head(&projections, &self.config, h))
            .collect::<Result<Vec<_>>>()?;
        head::concat_and_project(&self.weights, &self.config, &heads)
    }
}
