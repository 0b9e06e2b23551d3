//! Cohort matrix construction from raw subject event streams
//!
//! For each subject, events are mapped through the phenotype vocabulary and
//! accumulated as distinct-event-day counts per phenotype, then binarized or
//! kept as counts according to the aggregation policy. Phenotypes present in
//! too few subjects are dropped before testing.

use crate::cohort::CohortMatrix;
use crate::error::{PhewasError, Result};
use crate::models::Subject;
use crate::vocabulary::Vocabulary;
use chrono::NaiveDate;
use log::{debug, info};
use ndarray::Array2;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

/// How per-subject phenotype occurrences are rolled up into matrix values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AggregationPolicy {
    /// Binary presence: a phenotype counts as present only if it was coded
    /// on at least `min_occurrences` distinct days. The distinct-day rule
    /// suppresses incidental and rule-out diagnoses.
    Presence {
        /// Minimum number of distinct event days
        min_occurrences: usize,
    },
    /// Distinct-event-day counts, for quantitative (linear) models
    Count,
}

impl Default for AggregationPolicy {
    fn default() -> Self {
        Self::Presence { min_occurrences: 2 }
    }
}

/// Configuration for the cohort matrix build
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationSettings {
    /// Rollup policy applied within each subject
    pub policy: AggregationPolicy,
    /// Phenotypes present in fewer subjects than this across the whole
    /// cohort are dropped before testing
    pub min_cohort_count: usize,
}

impl Default for AggregationSettings {
    fn default() -> Self {
        Self {
            policy: AggregationPolicy::default(),
            min_cohort_count: 5,
        }
    }
}

/// Diagnostic counters emitted by the matrix build, for downstream reporting
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildDiagnostics {
    /// Events whose code had no phenotype mapping (dropped, not errors)
    pub unmapped_codes: usize,
    /// Phenotypes dropped for falling below the minimum cohort count
    pub dropped_phenotypes: usize,
    /// Phenotypes retained for testing
    pub retained_phenotypes: usize,
}

/// Builder turning a subject collection into a [`CohortMatrix`]
#[derive(Debug)]
pub struct CohortMatrixBuilder<'a> {
    vocabulary: &'a Vocabulary,
    covariate_names: Vec<String>,
    settings: AggregationSettings,
}

impl<'a> CohortMatrixBuilder<'a> {
    /// Create a builder over a loaded vocabulary
    ///
    /// `covariate_names` fixes the order and arity of every subject's
    /// covariate vector.
    #[must_use]
    pub fn new(
        vocabulary: &'a Vocabulary,
        covariate_names: Vec<String>,
        settings: AggregationSettings,
    ) -> Self {
        Self {
            vocabulary,
            covariate_names,
            settings,
        }
    }

    /// Build the cohort matrix and covariate table from a subject collection
    ///
    /// Fails on duplicate subject ids, covariate arity mismatches, and
    /// events from unsupported coding systems. Unmapped codes are dropped
    /// and counted in the returned diagnostics.
    pub fn build(&self, subjects: &[Subject]) -> Result<(CohortMatrix, BuildDiagnostics)> {
        let n_subjects = subjects.len();
        let n_vocab = self.vocabulary.n_phenotypes();

        let mut seen_ids = FxHashSet::default();
        for subject in subjects {
            if !seen_ids.insert(subject.id.as_str()) {
                return Err(PhewasError::Data(format!(
                    "duplicate subject id: {}",
                    subject.id
                )));
            }
            if subject.covariates.len() != self.covariate_names.len() {
                return Err(PhewasError::Data(format!(
                    "subject {} has {} covariates, expected {}",
                    subject.id,
                    subject.covariates.len(),
                    self.covariate_names.len()
                )));
            }
        }

        let mut diagnostics = BuildDiagnostics::default();
        let mut raw = Array2::<f64>::zeros((n_subjects, n_vocab));

        // Distinct event days per (subject, phenotype), keyed per subject
        let mut days: FxHashMap<usize, FxHashSet<NaiveDate>> = FxHashMap::default();
        for (row, subject) in subjects.iter().enumerate() {
            days.clear();
            for event in &subject.events {
                match self.vocabulary.map(event.system, &event.code)? {
                    Some(phenotype) => {
                        days.entry(phenotype).or_default().insert(event.date);
                    }
                    None => diagnostics.unmapped_codes += 1,
                }
            }
            for (&phenotype, dates) in &days {
                let count = dates.len();
                raw[(row, phenotype)] = match self.settings.policy {
                    AggregationPolicy::Presence { min_occurrences } => {
                        if count >= min_occurrences { 1.0 } else { 0.0 }
                    }
                    AggregationPolicy::Count => count as f64,
                };
            }
        }

        // Drop phenotype columns below the cohort-wide presence floor
        let mut retained: Vec<usize> = Vec::new();
        for col in 0..n_vocab {
            let present = raw.column(col).iter().filter(|&&v| v > 0.0).count();
            if present >= self.settings.min_cohort_count {
                retained.push(col);
            } else if present > 0 {
                debug!(
                    "dropping phenotype {} (present in {present} subjects, floor {})",
                    self.vocabulary.phenotype_id(col),
                    self.settings.min_cohort_count
                );
            }
        }
        diagnostics.retained_phenotypes = retained.len();
        diagnostics.dropped_phenotypes = n_vocab - retained.len();

        let mut values = Array2::<f64>::zeros((n_subjects, retained.len()));
        for (out_col, &col) in retained.iter().enumerate() {
            values.column_mut(out_col).assign(&raw.column(col));
        }
        let phenotype_ids = retained
            .iter()
            .map(|&col| self.vocabulary.phenotype_id(col).to_string())
            .collect();

        let subject_ids = subjects.iter().map(|s| s.id.clone()).collect();
        let exposures = subjects.iter().map(|s| s.exposure).collect();
        let mut covariates = Array2::<f64>::zeros((n_subjects, self.covariate_names.len()));
        for (row, subject) in subjects.iter().enumerate() {
            for (col, &value) in subject.covariates.iter().enumerate() {
                covariates[(row, col)] = value;
            }
        }

        info!(
            "Built cohort matrix: {n_subjects} subjects × {} phenotypes ({} dropped, {} unmapped codes)",
            diagnostics.retained_phenotypes, diagnostics.dropped_phenotypes, diagnostics.unmapped_codes
        );

        Ok((
            CohortMatrix::new(
                subject_ids,
                exposures,
                phenotype_ids,
                values,
                self.covariate_names.clone(),
                covariates,
            ),
            diagnostics,
        ))
    }
}
