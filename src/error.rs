// Mon Oct 19 2026 - Alex

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Worker count must be greater than 0")]
    NoWorkers,
    #[error("Malformed config: {0}")]
    Malformed(String),
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Sum mismatch: produced {produced} != drained {drained}")]
    SumMismatch { produced: i64, drained: i64 },
    #[error("Count mismatch: produced {produced} != drained {drained}")]
    CountMismatch { produced: i64, drained: i64 },
    #[error("Distribution mismatch: produced {produced} items but relays account for {distributed}")]
    DistributionMismatch { produced: i64, distributed: i64 },
    #[error("Stage failed: {0}")]
    StageFailed(String),
    #[error("Failed to spawn stage thread: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    InvalidConfig(#[from] ConfigError),
}

impl PipelineError {
    /// True for the three fatal accounting failures. Setup and stage failures
    /// return false.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            PipelineError::SumMismatch { .. }
                | PipelineError::CountMismatch { .. }
                | PipelineError::DistributionMismatch { .. }
        )
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
