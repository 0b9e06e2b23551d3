//! Result types for the association test engine

use serde::{Deserialize, Serialize};

/// Why a phenotype could not be tested
///
/// These are local, recoverable conditions: the phenotype stays in the
/// output with this reason attached, and the batch continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotTestableReason {
    /// Phenotype column is constant (all present or all absent) in the
    /// current cohort
    ConstantPhenotype,
    /// Normal or information matrix was singular
    SingularDesign,
    /// Iterative fit did not converge within the iteration cap
    NonConvergence,
    /// Fewer observations than model parameters
    TooFewSamples,
}

/// Point estimates from a successful model fit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitSummary {
    /// Coefficient on the exposure term
    pub effect: f64,
    /// Standard error of the exposure coefficient
    pub se: f64,
    /// Two-sided raw p-value for the exposure term
    pub p_value: f64,
}

/// Outcome of testing one phenotype
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TestOutcome {
    /// Model fit succeeded
    Fitted(FitSummary),
    /// Phenotype recorded as untestable; excluded from correction
    NotTestable {
        /// Local failure that made the phenotype untestable
        reason: NotTestableReason,
    },
}

impl TestOutcome {
    /// Raw p-value, if the phenotype was fitted
    #[must_use]
    pub fn p_value(&self) -> Option<f64> {
        match self {
            Self::Fitted(fit) => Some(fit.p_value),
            Self::NotTestable { .. } => None,
        }
    }
}

/// Per-phenotype association result row
///
/// Created once per engine run and read-only downstream; the corrector
/// fills in `p_corrected` and `significant`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociationResult {
    /// Phenotype identifier
    pub phenotype: String,
    /// Sample size used for this fit
    pub n: usize,
    /// Fit outcome or untestable marker
    pub outcome: TestOutcome,
    /// Multiplicity-adjusted p-value, set by the corrector
    pub p_corrected: Option<f64>,
    /// Significance flag after correction
    pub significant: bool,
}

impl AssociationResult {
    /// Create an uncorrected result row
    #[must_use]
    pub fn new(phenotype: impl Into<String>, n: usize, outcome: TestOutcome) -> Self {
        Self {
            phenotype: phenotype.into(),
            n,
            outcome,
            p_corrected: None,
            significant: false,
        }
    }
}
