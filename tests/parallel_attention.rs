use attention_kernels::math::max_abs_diff;
use attention_kernels::rng::{random_matrix_default, seeded};
use attention_kernels::{
    create_with_weights, Attention, AttentionConfig, AttentionError, AttentionKind,
    NaiveAttention, ParallelAttention, WeightInit, WeightSet,
};

#[test]
fn parallel_matches_naive_across_shapes() {
    for (seq_len, d_model, num_heads) in [(1, 4, 1), (4, 8, 2), (7, 24, 6), (16, 64, 8)] {
        let config = AttentionConfig::new(seq_len, d_model, num_heads).unwrap();
        let weights = WeightSet::random(config.d_model(), &WeightInit::default(), &mut seeded(3));
        let naive = create_with_weights(AttentionKind::Naive, config, weights.clone()).unwrap();
        let parallel = create_with_weights(AttentionKind::Parallel, config, weights).unwrap();
        let input = random_matrix_default(&mut seeded(4), config.seq_len(), config.d_model());

        let a = naive.forward(&input).unwrap();
        let b = parallel.forward(&input).unwrap();
        assert!(max_abs_diff(&a, &b).unwrap() < 1e-5);
    }
}

#[test]
fn parallel_weights_round_trip_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("w.json");

    let config = AttentionConfig::new(5, 10, 5).unwrap();
    let naive = NaiveAttention::with_rng(config, &WeightInit::default(), &mut seeded(8));
    naive.weights().save(&path).unwrap();

    let parallel = ParallelAttention::with_weights(config, WeightSet::load(&path).unwrap()).unwrap();
    let input = random_matrix_default(&mut seeded(9), 5, 10);
    assert_eq!(naive.forward(&input).unwrap(), parallel.forward(&input).unwrap());
}

#[test]
fn parallel_validates_like_naive() {
    assert!(matches!(
        ParallelAttention::create(4, 7, 2),
        Err(AttentionError::Config(_))
    ));
    let engine = ParallelAttention::create(4, 8, 2).unwrap();
    assert!(matches!(
        engine.forward(&[0.0; 31]),
        Err(AttentionError::Shape { .. })
    ));
    assert!(engine.benchmark(0).is_err());
    assert!(engine.benchmark(2).unwrap() > 0.0);
}
