use attention_kernels::softmax::{row_softmax, vector_softmax};
use proptest::prelude::*;

fn softmax_reference(data: &[f32], cols: usize) -> Vec<f32> {
    let mut v = vec![0.0; data.len()];
    for (out_row, row_slice) in v.chunks_mut(cols).zip(data.chunks(cols)) {
        let max = row_slice.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let exps: Vec<f32> = row_slice.iter().map(|x| (*x - max).exp()).collect();
        let sum: f32 = exps.iter().sum();
        for (out, e) in out_row.iter_mut().zip(exps.iter()) {
            *out = e / sum;
        }
    }
    v
}

#[test]
fn softmax_matches_reference() {
    let m = vec![1.0, 2.0, 3.0, -1.0, 0.0, 1.0];
    let expected = softmax_reference(&m, 3);
    let actual = row_softmax(&m, 2, 3).unwrap();
    for (a, b) in actual.iter().zip(expected.iter()) {
        assert!((a - b).abs() < 1e-6);
    }
}

#[test]
fn softmax_rows_sum_to_one() {
    let sm = row_softmax(&[1.0, 2.0, 3.0, -1.0, 0.0, 1.0], 2, 3).unwrap();
    for row in sm.chunks(3) {
        let sum: f32 = row.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
    }
}

#[test]
fn vector_softmax_is_positive_and_normalised() {
    let out = vector_softmax(&[1.0, 2.0, 3.0]);
    assert!(out.iter().all(|&v| v > 0.0));
    let sum: f32 = out.iter().sum();
    assert!((sum - 1.0).abs() < 1e-6);
    assert!(out[0] < out[1] && out[1] < out[2]);
}

#[test]
fn large_values_do_not_overflow() {
    let out = vector_softmax(&[1000.0, 1001.0, 1002.0]);
    assert!(out.iter().all(|v| v.is_finite() && !v.is_nan()));
    let sum: f32 = out.iter().sum();
    assert!((sum - 1.0).abs() < 1e-5);
    // shift invariance: same result as [0, 1, 2]
    let shifted = vector_softmax(&[0.0, 1.0, 2.0]);
    for (a, b) in out.iter().zip(shifted.iter()) {
        assert!((a - b).abs() < 1e-6);
    }
}

#[test]
fn widely_separated_values_saturate_cleanly() {
    let out = row_softmax(&[-1e30, 0.0, 1e30], 1, 3).unwrap();
    assert_eq!(out[2], 1.0);
    assert_eq!(out[0], 0.0);
    assert_eq!(out[1], 0.0);
}

#[test]
fn all_zero_row_is_uniform() {
    let out = row_softmax(&[0.0; 8], 2, 4).unwrap();
    for v in out {
        assert!((v - 0.25).abs() < 1e-7);
    }
}

#[test]
fn negative_values() {
    let out = vector_softmax(&[-5.0, -3.0, -4.0]);
    let expected = softmax_reference(&[-5.0, -3.0, -4.0], 3);
    for (a, b) in out.iter().zip(expected.iter()) {
        assert!((a - b).abs() < 1e-7);
    }
}

#[test]
fn empty_vector_returned_unchanged() {
    assert_eq!(vector_softmax(&[]), Vec::<f32>::new());
}

proptest! {
    #[test]
    fn rows_are_stochastic_for_finite_input(
        rows in 1usize..6,
        cols in 1usize..40,
        seed in prop::collection::vec(-1e4f32..1e4f32, 240),
    ) {
        let data: Vec<f32> = seed.iter().cycle().take(rows * cols).cloned().collect();
        let out = row_softmax(&data, rows, cols).unwrap();
        prop_assert_eq!(out.len(), data.len());
        for row in out.chunks(cols) {
            let sum: f32 = row.iter().sum();
            prop_assert!((sum - 1.0).abs() < 1e-5, "row sum {}", sum);
            for &v in row {
                prop_assert!(v.is_finite());
                prop_assert!((0.0..=1.0).contains(&v));
            }
        }
    }
}
