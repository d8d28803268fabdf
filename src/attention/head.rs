//! Pipeline stages shared by every engine: projections, per-head scaled
//! dot-product attention, and the output projection.
//!
//! Heads read disjoint column bands of Q, K and V and never write shared
//! state, so [`attend_head`] can run for different heads concurrently.

use super::weights::WeightSet;
use crate::config::AttentionConfig;
use crate::error::Result;
use crate::math;
use crate::softmax::row_softmax;

/// `X * W + b` for a `[rows, d_model]` input and a `[d_model, d_model]` weight.
pub(crate) fn linear(
    input: &[f32],
    weights: &[f32],
    bias: Option<&[f32]>,
    rows: usize,
    d_model: usize,
) -> Result<Vec<f32>> {
    let out = math::matmul(input, weights, rows, d_model, d_model)?;
    match bias {
        Some(b) => math::add_bias(&out, b, rows, d_model),
        None => Ok(out),
    }
}

/// Row-stochastic attention weights `softmax(Q K^T / sqrt(head_dim))` for one
/// head, shaped `[seq_len, seq_len]`.
pub fn attention_probs(q: &[f32], k: &[f32], seq_len: usize, head_dim: usize) -> Result<Vec<f32>> {
    let k_t = math::transpose(k, seq_len, head_dim)?;
    let raw = math::matmul(q, &k_t, seq_len, head_dim, seq_len)?;
    let scores = math::scale(&raw, 1.0 / (head_dim as f32).sqrt());
    row_softmax(&scores, seq_len, seq_len)
}

/// Scaled dot-product attention for one head; each of `q`, `k`, `v` is
/// `[seq_len, head_dim]` and so is the result.
pub fn scaled_dot_product(
    q: &[f32],
    k: &[f32],
    v: &[f32],
    seq_len: usize,
    head_dim: usize,
) -> Result<Vec<f32>> {
    let probs = attention_probs(q, k, seq_len, head_dim)?;
    math::matmul(&probs, v, seq_len, seq_len, head_dim)
}

/// Q, K and V for one forward call, each `[seq_len, d_model]`.
pub(crate) struct Projections {
    q: Vec<f32>,
    k: Vec<f32>,
    v: Vec<f32>,
}

pub(crate) fn project_qkv(
    weights: &WeightSet,
    config: &AttentionConfig,
    input: &[f32],
) -> Result<Projections> {
    let (s, d) = (config.seq_len(), config.d_model());
    Ok(Projections {
        q: linear(input, &weights.w_q, weights.b_q.as_deref(), s, d)?,
        k: linear(input, &weights.w_k, weights.b_k.as_deref(), s, d)?,
        v: linear(input, &weights.w_v, weights.b_v.as_deref(), s, d)?,
    })
}

/// Attention output of head `h`, which owns columns
/// `[h * head_dim, (h + 1) * head_dim)` of the projections.
pub(crate) fn attend_head(p: &Projections, config: &AttentionConfig, h: usize) -> Result<Vec<f32>> {
    let (s, d, hd) = (config.seq_len(), config.d_model(), config.head_dim());
    let qh = math::slice_cols(&p.q, s, d, h * hd, hd)?;
    let kh = math::slice_cols(&p.k, s, d, h * hd, hd)?;
    let vh = math::slice_cols(&p.v, s, d, h * hd, hd)?;
    scaled_dot_product(&qh, &kh, &vh, s, hd)
}

/// Places each head's `[seq_len, head_dim]` output back into its column band
/// and applies the output projection.
pub(crate) fn concat_and_project(
    weights: &WeightSet,
    config: &AttentionConfig,
    heads: &[Vec<f32>],
) -> Result<Vec<f32>> {
    let (s, d, hd) = (config.seq_len(), config.d_model(), config.head_dim());
    let mut concat = vec![0.0; s * d];
    for (h, out) in heads.iter().enumerate() {
        math::copy_cols_into(&mut concat, s, d, h * hd, out, hd)?;
    }
    linear(&concat, &weights.w_o, weights.b_o.as_deref(), s, d)
}
