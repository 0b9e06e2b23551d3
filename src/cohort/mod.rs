//! Cohort matrix: subjects × phenotypes plus a parallel covariate table
//!
//! The matrix is built once per run by [`builder::CohortMatrixBuilder`] and
//! treated as immutable afterwards; the matched-cohort subset is a fresh
//! matrix, not a view.

pub mod builder;

pub use builder::{AggregationPolicy, AggregationSettings, BuildDiagnostics, CohortMatrixBuilder};

use ndarray::{Array2, ArrayView1, Axis};

/// Aggregated phenotype values and covariates for one study cohort
///
/// Invariant: `subject_ids`, `exposures`, the rows of `values` and the rows
/// of `covariates` are all aligned, in the same order.
#[derive(Debug, Clone)]
pub struct CohortMatrix {
    /// Subject identifiers, one per row
    subject_ids: Vec<String>,
    /// Exposure values, aligned with `subject_ids`
    exposures: Vec<f64>,
    /// Retained phenotype identifiers, one per column of `values`
    phenotype_ids: Vec<String>,
    /// Phenotype values (presence flags or counts), subjects × phenotypes
    values: Array2<f64>,
    /// Ordered covariate names, one per column of `covariates`
    covariate_names: Vec<String>,
    /// Covariate table, subjects × covariates
    covariates: Array2<f64>,
}

impl CohortMatrix {
    pub(crate) fn new(
        subject_ids: Vec<String>,
        exposures: Vec<f64>,
        phenotype_ids: Vec<String>,
        values: Array2<f64>,
        covariate_names: Vec<String>,
        covariates: Array2<f64>,
    ) -> Self {
        debug_assert_eq!(subject_ids.len(), exposures.len());
        debug_assert_eq!(subject_ids.len(), values.nrows());
        debug_assert_eq!(subject_ids.len(), covariates.nrows());
        debug_assert_eq!(phenotype_ids.len(), values.ncols());
        debug_assert_eq!(covariate_names.len(), covariates.ncols());
        Self {
            subject_ids,
            exposures,
            phenotype_ids,
            values,
            covariate_names,
            covariates,
        }
    }

    /// Number of subjects (rows)
    #[must_use]
    pub fn n_subjects(&self) -> usize {
        self.subject_ids.len()
    }

    /// Number of retained phenotypes (columns)
    #[must_use]
    pub fn n_phenotypes(&self) -> usize {
        self.phenotype_ids.len()
    }

    /// Subject identifiers in row order
    #[must_use]
    pub fn subject_ids(&self) -> &[String] {
        &self.subject_ids
    }

    /// Exposure values in row order
    #[must_use]
    pub fn exposures(&self) -> &[f64] {
        &self.exposures
    }

    /// Retained phenotype identifiers in column order
    #[must_use]
    pub fn phenotype_ids(&self) -> &[String] {
        &self.phenotype_ids
    }

    /// Ordered covariate names
    #[must_use]
    pub fn covariate_names(&self) -> &[String] {
        &self.covariate_names
    }

    /// One phenotype column across all subjects
    #[must_use]
    pub fn phenotype_column(&self, idx: usize) -> ArrayView1<'_, f64> {
        self.values.column(idx)
    }

    /// Covariate value for a subject row by covariate column index
    #[must_use]
    pub fn covariate_value(&self, row: usize, covariate: usize) -> f64 {
        self.covariates[(row, covariate)]
    }

    /// Position of a covariate by name
    #[must_use]
    pub fn covariate_index(&self, name: &str) -> Option<usize> {
        self.covariate_names.iter().position(|n| n == name)
    }

    /// Full covariate table, subjects × covariates
    #[must_use]
    pub fn covariates(&self) -> &Array2<f64> {
        &self.covariates
    }

    /// Build a new cohort matrix containing only the given rows, in the
    /// given order
    #[must_use]
    pub fn subset_rows(&self, rows: &[usize]) -> Self {
        let subject_ids = rows.iter().map(|&r| self.subject_ids[r].clone()).collect();
        let exposures = rows.iter().map(|&r| self.exposures[r]).collect();
        let values = self.values.select(Axis(0), rows);
        let covariates = self.covariates.select(Axis(0), rows);
        Self::new(
            subject_ids,
            exposures,
            self.phenotype_ids.clone(),
            values,
            self.covariate_names.clone(),
            covariates,
        )
    }
}
