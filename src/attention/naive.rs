//! Reference multi-head attention: every stage runs sequentially on the
//! calling thread.

use rand::Rng;

use super::head;
use super::weights::{WeightInit, WeightSet};
use super::Attention;
use crate::config::AttentionConfig;
use crate::error::Result;
use crate::rng::rng_from_env;

/// Straightforward multi-head attention favouring clarity over speed; the
/// baseline other variants are validated against.
#[derive(Debug, Clone)]
pub struct NaiveAttention {
    config: AttentionConfig,
    weights: WeightSet,
}

impl NaiveAttention {
    pub const NAME: &'static str = "NaiveAttention";

    /// Validate the dimensions and draw weights from [`rng_from_env`].
    pub fn create(seq_len: i64, d_model: i64, num_heads: i64) -> Result<Self> {
        let config = AttentionConfig::new(seq_len, d_model, num_heads)?;
        Ok(Self::with_rng(config, &WeightInit::default(), &mut rng_from_env()))
    }

    pub fn with_rng<R: Rng + ?Sized>(config: AttentionConfig, init: &WeightInit, rng: &mut R) -> Self {
        let weights = WeightSet::random(config.d_model(), init, rng);
        log::debug!(
            "{} init seq_len={} d_model={} num_heads={} weights=uniform(+-{}) bias={}",
            Self::NAME,
            config.seq_len(),
            config.d_model(),
            config.num_heads(),
            init.range,
            init.bias
        );
        Self { config, weights }
    }

    /// Wrap an existing weight set, rejecting it if its shapes do not fit `config`.
    pub fn with_weights(config: AttentionConfig, weights: WeightSet) -> Result<Self> {
        weights.validate(config.d_model())?;
        Ok(Self { config, weights })
    }

    pub fn weights(&self) -> &WeightSet {
        &self.weights
    }
}

impl Attention for NaiveAttention {
    fn config(&self) -> &AttentionConfig {
        &self.config
    }

    fn name(&self) -> &str {
        Self::NAME
    }

    fn forward(&self, input: &[f32]) -> Result<Vec<f32>> {
        self.validate_input(input)?;
        let projections = head::project_qkv(&self.weights, &self.config, input)?;
        let mut heads = Vec::with_capacity(self.config.num_heads());
        for h in 0..self.config.num_heads() {
            heads.push(head::attend_head(&projections, &self.config, h)?);
        }
        head::concat_and_project(&self.weights, &self.config, &heads)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AttentionError;

    fn identity_engine(seq_len: i64, d_model: i64, num_heads: i64) -> NaiveAttention {
        let config = AttentionConfig::new(seq_len, d_model, num_heads).unwrap();
        NaiveAttention::with_weights(config, WeightSet::identity(config.d_model())).unwrap()
    }

    #[test]
    fn identical_tokens_pass_through_identity_weights() {
        // every token attends uniformly over copies of itself
        let attn = identity_engine(3, 4, 2);
        let row = [0.5, -1.0, 2.0, 0.25];
        let x: Vec<f32> = row.iter().cycle().take(12).cloned().collect();
        let out = attn.forward(&x).unwrap();
        for (a, b) in out.iter().zip(x.iter()) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn heads_only_see_their_own_columns() {
        // head 0 owns column 0, head 1 owns column 1; with a zero column the
        // head attends uniformly and averages its values
        let attn = identity_engine(2, 2, 2);
        let x = [1.0, 0.0, 3.0, 0.0];
        let out = attn.forward(&x).unwrap();
        assert_eq!(out[1], 0.0);
        assert_eq!(out[3], 0.0);
        assert!(out[2] > out[0]);
    }

    #[test]
    fn rejects_wrong_input_size() {
        let attn = identity_engine(4, 8, 2);
        let err = attn.forward(&[1.0; 10]).unwrap_err();
        assert!(matches!(
            err,
            AttentionError::Shape {
                expected: 32,
                actual: 10,
                ..
            }
        ));
    }

    #[test]
    fn with_weights_rejects_mismatched_set() {
        let config = AttentionConfig::new(2, 8, 2).unwrap();
        let err = NaiveAttention::with_weights(config, WeightSet::identity(4)).unwrap_err();
        assert!(matches!(err, AttentionError::Weights { .. }));
    }
}
