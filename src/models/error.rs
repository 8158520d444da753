use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScoreError {
    #[error("Invalid wallet address format: {0}")]
    InvalidAddress(String),

    #[error("Unsupported chain ID: {0}")]
    UnsupportedChain(u64),

    #[error("Invalid {table} weights: {message}")]
    InvalidWeights { table: String, message: String },

    #[error("Metric missing from aggregation input: {0}")]
    MissingMetric(String),

    #[error("Upstream data source {source_name} failed: {message}")]
    Upstream { source_name: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ScoreError {
    /// Caller-input errors are reported as-is and never retried or defaulted.
    pub fn is_validation(&self) -> bool {
        matches!(self, ScoreError::InvalidAddress(_) | ScoreError::UnsupportedChain(_))
    }
}

pub type Result<T> = std::result::Result<T, ScoreError>;
