//! Numerically stable softmax over flat row-major buffers.
//!
//! Every row is shifted by its maximum before exponentiation, so the largest
//! exponent is `exp(0) = 1` and no finite input can overflow.

use crate::error::{AttentionError, Result};
use crate::math::inc_ops;

fn softmax_row_into(src: &[f32], dst: &mut [f32]) {
    // stabilised against overflow
    let max = src.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let mut sum = 0.0f32;
    for (d, &x) in dst.iter_mut().zip(src) {
        let e = (x - max).exp();
        *d = e;
        sum += e;
    }
    for d in dst.iter_mut() {
        *d /= sum;
    }
}

/// Applies softmax to each row of a `rows x cols` matrix independently.
///
/// Every output row sums to one and every element lies in `[0, 1]` for any
/// finite input.
pub fn row_softmax(matrix: &[f32], rows: usize, cols: usize) -> Result<Vec<f32>> {
    if matrix.len() != rows * cols {
        return Err(AttentionError::dimension(
            "row_softmax",
            format!(
                "matrix has {} elements, expected {rows}x{cols} = {}",
                matrix.len(),
                rows * cols
            ),
        ));
    }
    inc_ops();
    let mut out = vec![0.0; matrix.len()];
    if cols == 0 {
        return Ok(out);
    }
    for (src, dst) in matrix.chunks_exact(cols).zip(out.chunks_exact_mut(cols)) {
        softmax_row_into(src, dst);
    }
    Ok(out)
}

/// Softmax over a single vector. An empty vector is returned unchanged.
pub fn vector_softmax(vector: &[f32]) -> Vec<f32> {
    if vector.is_empty() {
        return Vec::new();
    }
    let mut out = vec![0.0; vector.len()];
    softmax_row_into(vector, &mut out);
    out
}
