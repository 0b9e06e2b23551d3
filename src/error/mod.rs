//! Error handling for the PheWAS core engine.

use thiserror::Error;

/// Specialized error type for PheWAS study runs
#[derive(Debug, Error)]
pub enum PhewasError {
    /// An event carries a diagnosis coding system the vocabulary does not support.
    /// Unmapped codes within a supported system are not errors; they are dropped
    /// and counted in the build diagnostics.
    #[error("unsupported diagnosis coding system: {0}")]
    UnknownCodeKind(String),

    /// The control candidate pool is empty, so no matching graph can be built
    #[error("control matching failed: candidate pool is empty")]
    NoCandidatePool,

    /// Configuration rejected before any computation began
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Malformed subject records or inconsistent input tables
    #[error("data error: {0}")]
    Data(String),

    /// Inconsistent phenotype vocabulary table
    #[error("vocabulary error: {0}")]
    Vocabulary(String),

    /// The association batch was cancelled before completing
    #[error("association batch cancelled")]
    Cancelled,
}

/// Result type for PheWAS core operations
pub type Result<T> = std::result::Result<T, PhewasError>;
