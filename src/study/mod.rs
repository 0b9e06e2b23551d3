//! End-to-end study pipeline
//!
//! One logical pipeline per run: map events into the cohort matrix,
//! optionally subset it through matched-control selection, fit one model
//! per phenotype, and correct across the resulting p-values. Every run
//! yields a complete result table with per-row status.

use crate::algorithm::association::{AssociationResult, AssociationTestEngine, CancelFlag};
use crate::algorithm::correction;
use crate::algorithm::matching::{ControlMatcher, MatchSummary};
use crate::cohort::{BuildDiagnostics, CohortMatrixBuilder};
use crate::config::StudyConfig;
use crate::error::{PhewasError, Result};
use crate::models::Subject;
use crate::vocabulary::Vocabulary;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Output of a full study run, consumed by reporting collaborators
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyOutput {
    /// Per-phenotype association results, corrected and flagged
    pub results: Vec<AssociationResult>,
    /// Matching summary, present when matched-control selection ran
    pub match_summary: Option<MatchSummary>,
    /// Diagnostic counters from the matrix build
    pub diagnostics: BuildDiagnostics,
}

/// Run a complete PheWAS study over a loaded subject collection
///
/// The configuration is validated before any computation. With matching
/// enabled, an empty candidate pool either fails the run or, when the
/// fallback is configured, degrades to testing the full unmatched cohort.
pub fn run_study(
    subjects: &[Subject],
    vocabulary: &Vocabulary,
    covariate_names: Vec<String>,
    config: &StudyConfig,
    cancel: &CancelFlag,
) -> Result<StudyOutput> {
    let start_time = Instant::now();
    config.validate()?;

    let builder = CohortMatrixBuilder::new(vocabulary, covariate_names, config.aggregation.clone());
    let (cohort, diagnostics) = builder.build(subjects)?;

    let (cohort, match_summary) = if config.matching.enabled {
        let matcher = ControlMatcher::new(config.matching.clone());
        match matcher.select(&cohort) {
            Ok(result) => {
                let matched = cohort.subset_rows(&result.matched_rows());
                (matched, Some(result.summary))
            }
            Err(PhewasError::NoCandidatePool) if config.matching.fall_back_to_full_cohort => {
                warn!("candidate pool is empty; falling back to the full unmatched cohort");
                (cohort, None)
            }
            Err(e) => return Err(e),
        }
    } else {
        (cohort, None)
    };

    let engine = AssociationTestEngine::new(config.model.clone());
    let mut results = engine.run(&cohort, cancel)?;
    correction::apply(&mut results, &config.correction)?;

    info!(
        "Study run complete: {} phenotype rows in {:.2?}",
        results.len(),
        start_time.elapsed()
    );

    Ok(StudyOutput {
        results,
        match_summary,
        diagnostics,
    })
}
