use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::Rng;
use attention_kernels::math;

// Straight i-j-k triple loop, kept as a baseline for the cache-friendly kernel.
fn matmul_ijk(a: &[f32], b: &[f32], n: usize) -> Vec<f32> {
    let mut out = vec![0.0; n * n];
    for i in 0..n {
        for j in 0..n {
            let mut acc = 0.0;
            for k in 0..n {
                acc += a[i * n + k] * b[k * n + j];
            }
            out[i * n + j] = acc;
        }
    }
    out
}

fn bench_matmul(c: &mut Criterion) {
    let mut rng = rand::thread_rng();
    let mut group = c.benchmark_group("matmul");
    for size in [64usize, 128, 256] {
        let a: Vec<f32> = (0..size * size).map(|_| rng.gen()).collect();
        let b: Vec<f32> = (0..size * size).map(|_| rng.gen()).collect();

        group.bench_with_input(BenchmarkId::new("ijk", size), &size, |bencher, &n| {
            bencher.iter(|| black_box(matmul_ijk(black_box(&a), black_box(&b), n)));
        });
        group.bench_with_input(BenchmarkId::new("ikj", size), &size, |bencher, &n| {
            bencher.iter(|| black_box(math::matmul(black_box(&a), black_box(&b), n, n, n)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_matmul);
criterion_main!(benches);
