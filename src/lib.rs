//! A Rust library for phenome-wide association studies: cohort matrix
//! construction, maximum-cardinality matched-control selection, batch
//! regression testing, and multiple-comparison correction.

pub mod algorithm;
pub mod cohort;
pub mod config;
pub mod error;
pub mod models;
pub mod study;
pub mod vocabulary;

// Re-export the most common types for easier use
// Core types
pub use config::StudyConfig;
pub use error::{PhewasError, Result};
pub use models::{CodeSystem, DiagnosisEvent, Subject};
pub use vocabulary::Vocabulary;

// Cohort matrix
pub use cohort::{
    AggregationPolicy, AggregationSettings, BuildDiagnostics, CohortMatrix, CohortMatrixBuilder,
};

// Matching
pub use algorithm::matching::{
    ControlMatcher, MatchResult, MatchRule, MatchSummary, MatchingSettings, Tolerance,
};

// Association testing and correction
pub use algorithm::association::{
    AssociationResult, AssociationTestEngine, CancelFlag, ModelFamily, ModelSettings,
    NotTestableReason, TestOutcome, TestStatistic,
};
pub use algorithm::correction::{CorrectionMethod, CorrectionSettings};

// Pipeline
pub use study::{StudyOutput, run_study};
