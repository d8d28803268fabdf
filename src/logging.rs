use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use csv::Writer;
use serde::Serialize;

use crate::error::Result;

/// Sink appending benchmark records to `metrics.jsonl` and `metrics.csv`
/// under `<log_dir>/<experiment>/`.
pub struct Logger {
    dir: PathBuf,
    json: File,
    csv: Writer<File>,
}

/// One benchmarked (variant, shape) pair.
#[derive(Debug, Clone, Serialize)]
pub struct BenchRecord {
    pub variant: String,
    pub seq_len: usize,
    pub d_model: usize,
    pub num_heads: usize,
    pub iterations: usize,
    pub time_ms: f64,
    pub gflops: f64,
    /// Largest absolute difference from the naive engine's output.
    pub max_abs_diff: f32,
    /// Matrix primitives executed by a single forward call.
    pub matrix_ops: usize,
}

impl Logger {
    pub fn new(log_dir: Option<String>, experiment: Option<String>) -> Result<Self> {
        let base = log_dir.unwrap_or_else(|| "runs".to_string());
        let exp = experiment.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_else(|_| Duration::from_secs(0))
                .as_secs()
                .to_string()
        });
        let dir = PathBuf::from(base).join(exp);
        std::fs::create_dir_all(&dir)?;
        let json = OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join("metrics.jsonl"))?;
        let csv_path = dir.join("metrics.csv");
        // header only for a fresh file so appended runs stay parseable
        let write_header = !csv_path.exists();
        let csv_file = OpenOptions::new().create(true).append(true).open(&csv_path)?;
        let csv = csv::WriterBuilder::new()
            .has_headers(write_header)
            .from_writer(csv_file);
        Ok(Logger { dir, json, csv })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn log(&mut self, record: &BenchRecord) -> Result<()> {
        writeln!(self.json, "{}", serde_json::to_string(record)?)?;
        self.csv.serialize(record).map_err(std::io::Error::from)?;
        self.csv.flush()?;
        Ok(())
    }
}
