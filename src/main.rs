use std::env;
use std::process::ExitCode;

use indicatif::ProgressBar;

use attention_kernels::attention::{create_with_weights, WeightInit, WeightSet};
use attention_kernels::config::{AttentionConfig, RunConfig};
use attention_kernels::logging::{BenchRecord, Logger};
use attention_kernels::math;
use attention_kernels::rng::{random_matrix_default, rng_from_env, seeded};
use attention_kernels::{AttentionKind, Result};

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        eprintln!("Usage: {} [config.toml|config.json]", args[0]);
        return ExitCode::SUCCESS;
    }

    let cfg = match args.get(1) {
        Some(path) => match RunConfig::from_path(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::error!("failed to load config {path}: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => RunConfig::default(),
    };

    match run(&cfg) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            eprintln!("Some checks failed.");
            ExitCode::FAILURE
        }
        Err(e) => {
            log::error!("benchmark aborted: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Benchmarks every configured variant on every shape. Returns `false` when a
/// sanity or agreement check failed.
fn run(cfg: &RunConfig) -> Result<bool> {
    let mut logger = match &cfg.log_dir {
        Some(dir) => Some(Logger::new(Some(dir.clone()), None)?),
        None => None,
    };
    let mut rng = match cfg.seed {
        Some(seed) => seeded(seed),
        None => rng_from_env(),
    };

    let pb = ProgressBar::new((cfg.shapes.len() * cfg.variants.len()) as u64);
    let mut passed = true;

    for shape in &cfg.shapes {
        let config = match shape.validate() {
            Ok(config) => config,
            Err(e) => {
                log::error!("skipping shape {shape:?}: {e}");
                passed = false;
                pb.inc(cfg.variants.len() as u64);
                continue;
            }
        };
        let weights = WeightSet::random(config.d_model(), &WeightInit::default(), &mut rng);
        let input = random_matrix_default(&mut rng, config.seq_len(), config.d_model());
        let reference = create_with_weights(AttentionKind::Naive, config, weights.clone())?
            .forward(&input)?;

        for &kind in &cfg.variants {
            let engine = create_with_weights(kind, config, weights.clone())?;

            math::reset_matrix_ops();
            let output = engine.forward(&input)?;
            let matrix_ops = math::matrix_ops_count();

            passed &= sanity_check(engine.name(), &config, &input, &output);
            let diff = math::max_abs_diff(&reference, &output).unwrap_or(f32::INFINITY);
            if diff > cfg.tolerance {
                log::warn!(
                    "{} diverges from naive by {diff:.3e} (tolerance {:.1e})",
                    engine.name(),
                    cfg.tolerance
                );
                passed = false;
            }

            let result = engine.benchmark_with_input(&input, cfg.iterations)?;
            log::info!(
                "{} seq_len={} d_model={} num_heads={}: {}",
                kind,
                config.seq_len(),
                config.d_model(),
                config.num_heads(),
                result.summary(engine.name())
            );
            pb.set_message(result.summary(engine.name()));
            pb.inc(1);

            if let Some(logger) = logger.as_mut() {
                logger.log(&BenchRecord {
                    variant: kind.to_string(),
                    seq_len: config.seq_len(),
                    d_model: config.d_model(),
                    num_heads: config.num_heads(),
                    iterations: cfg.iterations,
                    time_ms: result.time_ms,
                    gflops: result.gflops,
                    max_abs_diff: diff,
                    matrix_ops,
                })?;
            }
        }
    }
    pb.finish_with_message("benchmark done");

    if let Some(logger) = &logger {
        log::info!("records written to {}", logger.dir().display());
    }
    Ok(passed)
}

fn sanity_check(name: &str, config: &AttentionConfig, input: &[f32], output: &[f32]) -> bool {
    let mut ok = true;
    if output.len() != config.input_len() {
        log::error!(
            "{name}: output size {} != input size {}",
            output.len(),
            config.input_len()
        );
        ok = false;
    }
    if !output.iter().all(|v| v.is_finite()) {
        log::error!("{name}: output contains NaN or infinity");
        ok = false;
    }
    if output == input {
        log::error!("{name}: output is identical to input");
        ok = false;
    }
    ok
}
