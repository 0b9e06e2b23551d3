//! Per-phenotype regression testing
//!
//! A stateless fit over (design matrix, phenotype column) per retained
//! phenotype, run as a parallel map with no shared mutable state.

pub mod design;
pub mod engine;
pub mod linalg;
pub mod linear;
pub mod logistic;
pub mod types;

pub use design::Design;
pub use engine::{AssociationTestEngine, CancelFlag, ModelFamily, ModelSettings, TestStatistic};
pub use types::{AssociationResult, FitSummary, NotTestableReason, TestOutcome};
