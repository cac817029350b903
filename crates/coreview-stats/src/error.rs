/// Errors produced by binning and statistics routines.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum StatsError {
    #[display("insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData { required: usize, actual: usize },
    #[display("singular fit: x values must contain at least two distinct values")]
    SingularFit,
    #[display("constant input: correlation is undefined when a series has zero variance")]
    ConstantInput,
    #[display("series length mismatch: x has {x_len} values, y has {y_len}")]
    LengthMismatch { x_len: usize, y_len: usize },
    #[display("invalid bin spec: {reason}")]
    InvalidBinSpec { reason: String },
    #[display("confidence level must be in (0, 1), got {level}")]
    InvalidConfidenceLevel { level: f64 },
    #[display("failed to construct distribution: {reason}")]
    Distribution { reason: String },
}
