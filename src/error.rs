//! Error types shared by the matrix primitives and the attention engines.

use thiserror::Error;

/// Rejection reasons for an attention configuration.
///
/// Each invariant has its own variant so callers can tell which constraint
/// failed and with which value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("seq_len must be positive, got {0}")]
    SeqLen(i64),

    #[error("d_model must be positive, got {0}")]
    DModel(i64),

    #[error("num_heads must be positive, got {0}")]
    NumHeads(i64),

    #[error("d_model ({d_model}) must be divisible by num_heads ({num_heads})")]
    IndivisibleHeads { d_model: i64, num_heads: i64 },

    /// A buffer the engine allocates would not fit in `usize`.
    #[error("seq_len ({seq_len}) and d_model ({d_model}) give buffers larger than usize::MAX elements")]
    TooLarge { seq_len: i64, d_model: i64 },
}

/// Errors surfaced by attention engines and the primitives they are built from.
#[derive(Debug, Error)]
pub enum AttentionError {
    /// The engine configuration violated one of its invariants.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The input buffer does not hold exactly `seq_len * d_model` elements.
    #[error("input size mismatch: expected {expected} ({seq_len}x{d_model}), got {actual}")]
    Shape {
        expected: usize,
        actual: usize,
        seq_len: usize,
        d_model: usize,
    },

    /// A matrix primitive received buffers that disagree with the declared dimensions.
    #[error("dimension mismatch in {op}: {reason}")]
    DimensionMismatch { op: &'static str, reason: String },

    /// A scalar argument was out of range.
    #[error("invalid argument '{arg}': {reason}")]
    InvalidArgument { arg: &'static str, reason: String },

    /// A weight set does not fit the engine it is handed to.
    #[error("invalid weights: {reason}")]
    Weights { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl AttentionError {
    pub(crate) fn dimension(op: &'static str, reason: impl Into<String>) -> Self {
        AttentionError::DimensionMismatch {
            op,
            reason: reason.into(),
        }
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, AttentionError>;
