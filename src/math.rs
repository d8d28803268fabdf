//! Dense matrix primitives over flat row-major `f32` buffers.
//!
//! Buffers carry no shape metadata: every routine takes the dimensions it
//! operates on explicitly and rejects buffers whose length disagrees with them.
//! Element `(i, j)` of a `rows x cols` matrix lives at `i * cols + j`.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{AttentionError, Result};

static MATRIX_OPS: AtomicUsize = AtomicUsize::new(0);

pub fn reset_matrix_ops() {
    MATRIX_OPS.store(0, Ordering::SeqCst);
}

/// Number of matrix primitives executed since the last reset.
pub fn matrix_ops_count() -> usize {
    MATRIX_OPS.load(Ordering::SeqCst)
}

pub(crate) fn inc_ops() {
    MATRIX_OPS.fetch_add(1, Ordering::SeqCst);
}

fn expect_len(op: &'static str, name: &str, buf: &[f32], rows: usize, cols: usize) -> Result<()> {
    match rows.checked_mul(cols) {
        Some(len) if len == buf.len() => Ok(()),
        Some(len) => Err(AttentionError::dimension(
            op,
            format!("{name} has {} elements, expected {rows}x{cols} = {len}", buf.len()),
        )),
        None => Err(AttentionError::dimension(
            op,
            format!("{name} shape {rows}x{cols} overflows usize"),
        )),
    }
}

fn check_band(op: &'static str, cols: usize, start: usize, width: usize) -> Result<()> {
    match start.checked_add(width) {
        Some(end) if end <= cols => Ok(()),
        _ => Err(AttentionError::dimension(
            op,
            format!("columns {start}..+{width} exceed width {cols}"),
        )),
    }
}

/// Dense product `C = A * B` with `A: [rows_a, cols_a]` and `B: [cols_a, cols_b]`.
///
/// All three dimensions must be non-zero and both buffers must match them
/// exactly. The loop runs in `i-k-j` order so the inner loop streams through
/// contiguous rows of `B` and `C`.
pub fn matmul(a: &[f32], b: &[f32], rows_a: usize, cols_a: usize, cols_b: usize) -> Result<Vec<f32>> {
    if rows_a == 0 || cols_a == 0 || cols_b == 0 {
        return Err(AttentionError::dimension(
            "matmul",
            format!("dimensions must be positive, got {rows_a}x{cols_a} * {cols_a}x{cols_b}"),
        ));
    }
    expect_len("matmul", "A", a, rows_a, cols_a)?;
    expect_len("matmul", "B", b, cols_a, cols_b)?;
    inc_ops();

    let mut out = vec![0.0; rows_a * cols_b];
    for i in 0..rows_a {
        let a_row = &a[i * cols_a..(i + 1) * cols_a];
        let out_row = &mut out[i * cols_b..(i + 1) * cols_b];
        for (k, &a_val) in a_row.iter().enumerate() {
            let b_row = &b[k * cols_b..(k + 1) * cols_b];
            for (o, &b_val) in out_row.iter_mut().zip(b_row) {
                *o += a_val * b_val;
            }
        }
    }
    Ok(out)
}

/// Transpose of a `rows x cols` matrix; the result is `cols x rows`.
pub fn transpose(a: &[f32], rows: usize, cols: usize) -> Result<Vec<f32>> {
    expect_len("transpose", "A", a, rows, cols)?;
    inc_ops();
    let mut out = vec![0.0; rows * cols];
    for i in 0..rows {
        for j in 0..cols {
            out[j * rows + i] = a[i * cols + j];
        }
    }
    Ok(out)
}

/// Broadcasts `bias[j]` onto every row: `result[i, j] = matrix[i, j] + bias[j]`.
pub fn add_bias(matrix: &[f32], bias: &[f32], rows: usize, cols: usize) -> Result<Vec<f32>> {
    expect_len("add_bias", "matrix", matrix, rows, cols)?;
    if bias.len() != cols {
        return Err(AttentionError::dimension(
            "add_bias",
            format!("bias has {} elements, expected {cols}", bias.len()),
        ));
    }
    inc_ops();
    let mut out = matrix.to_vec();
    if cols == 0 {
        return Ok(out);
    }
    for row in out.chunks_exact_mut(cols) {
        for (v, b) in row.iter_mut().zip(bias) {
            *v += b;
        }
    }
    Ok(out)
}

/// Elementwise multiplication by a scalar.
pub fn scale(matrix: &[f32], factor: f32) -> Vec<f32> {
    inc_ops();
    matrix.iter().map(|v| v * factor).collect()
}

/// Copies the column band `[start, start + width)` of a `rows x cols` matrix
/// into a new `rows x width` buffer.
pub fn slice_cols(
    matrix: &[f32],
    rows: usize,
    cols: usize,
    start: usize,
    width: usize,
) -> Result<Vec<f32>> {
    expect_len("slice_cols", "matrix", matrix, rows, cols)?;
    check_band("slice_cols", cols, start, width)?;
    let mut out = Vec::with_capacity(rows * width);
    if width == 0 {
        return Ok(out);
    }
    for row in matrix.chunks_exact(cols) {
        out.extend_from_slice(&row[start..start + width]);
    }
    Ok(out)
}

/// Writes a `rows x width` block into columns `[start, start + width)` of a
/// `rows x cols` destination. Inverse of [`slice_cols`].
pub fn copy_cols_into(
    dest: &mut [f32],
    rows: usize,
    cols: usize,
    start: usize,
    src: &[f32],
    width: usize,
) -> Result<()> {
    expect_len("copy_cols_into", "dest", dest, rows, cols)?;
    expect_len("copy_cols_into", "src", src, rows, width)?;
    check_band("copy_cols_into", cols, start, width)?;
    if width == 0 {
        return Ok(());
    }
    for (dst_row, src_row) in dest.chunks_exact_mut(cols).zip(src.chunks_exact(width)) {
        dst_row[start..start + width].copy_from_slice(src_row);
    }
    Ok(())
}

/// Largest absolute elementwise difference, or `None` when the lengths differ.
pub fn max_abs_diff(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.len() != b.len() {
        return None;
    }
    Some(
        a.iter()
            .zip(b)
            .map(|(x, y)| (x - y).abs())
            .fold(0.0f32, f32::max),
    )
}

/// True when both buffers have the same length and every pair is within `atol`.
pub fn is_close(a: &[f32], b: &[f32], atol: f32) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() < atol)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matmul_rejects_zero_dimension() {
        let err = matmul(&[], &[], 0, 2, 2).unwrap_err();
        assert!(matches!(err, AttentionError::DimensionMismatch { op: "matmul", .. }));
    }

    #[test]
    fn matmul_non_square() {
        // [1 2 3] * [[1],[2],[3]] = [14]
        let c = matmul(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0], 1, 3, 1).unwrap();
        assert_eq!(c, vec![14.0]);
    }

    #[test]
    fn slice_and_copy_cols_are_inverse() {
        let m: Vec<f32> = (0..12).map(|v| v as f32).collect();
        let mut rebuilt = vec![0.0; 12];
        for h in 0..2 {
            let band = slice_cols(&m, 3, 4, h * 2, 2).unwrap();
            copy_cols_into(&mut rebuilt, 3, 4, h * 2, &band, 2).unwrap();
        }
        assert_eq!(rebuilt, m);
    }

    #[test]
    fn slice_cols_out_of_range() {
        let m = vec![0.0; 8];
        assert!(slice_cols(&m, 2, 4, 3, 2).is_err());
    }

    #[test]
    fn overflowing_shapes_are_errors() {
        let err = transpose(&[1.0], usize::MAX, 2).unwrap_err();
        assert!(matches!(err, AttentionError::DimensionMismatch { op: "transpose", .. }));
        let m = vec![0.0; 8];
        assert!(slice_cols(&m, 2, 4, usize::MAX, 2).is_err());
        let mut dest = vec![0.0; 8];
        assert!(copy_cols_into(&mut dest, 2, 4, 1, &[0.0; 4], usize::MAX).is_err());
    }

    #[test]
    fn max_abs_diff_lengths() {
        assert_eq!(max_abs_diff(&[1.0], &[1.0, 2.0]), None);
        assert_eq!(max_abs_diff(&[1.0, 2.0], &[1.5, 1.0]), Some(1.0));
    }
}
