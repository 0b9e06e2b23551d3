//! Design matrix assembly
//!
//! One base design matrix is built per run: intercept, exposure, then the
//! configured covariate columns in configuration order. The exposure column
//! position is fixed so the engine can read its coefficient directly, and a
//! reduced design (exposure removed) supports likelihood-ratio tests.

use crate::cohort::CohortMatrix;
use crate::error::{PhewasError, Result};
use ndarray::{Array2, Axis, s};

/// Column index of the intercept in every design matrix
pub const INTERCEPT_COL: usize = 0;
/// Column index of the exposure term in the full design matrix
pub const EXPOSURE_COL: usize = 1;

/// Full and reduced design matrices shared by all phenotype fits
#[derive(Debug, Clone)]
pub struct Design {
    /// Intercept + exposure + covariates, subjects × parameters
    pub full: Array2<f64>,
    /// Intercept + covariates only, for likelihood-ratio null fits
    pub reduced: Array2<f64>,
}

impl Design {
    /// Assemble the design matrices from the cohort
    ///
    /// Covariate names must resolve against the cohort table; an unknown
    /// name is a configuration error caught before any fitting.
    pub fn from_cohort(cohort: &CohortMatrix, covariates: &[String]) -> Result<Self> {
        let n = cohort.n_subjects();
        let p = 2 + covariates.len();

        let mut full = Array2::<f64>::zeros((n, p));
        full.column_mut(INTERCEPT_COL).fill(1.0);
        for (row, &exposure) in cohort.exposures().iter().enumerate() {
            full[(row, EXPOSURE_COL)] = exposure;
        }
        for (k, name) in covariates.iter().enumerate() {
            let col = cohort.covariate_index(name).ok_or_else(|| {
                PhewasError::InvalidConfig(format!(
                    "model covariate not present in cohort: {name}"
                ))
            })?;
            for row in 0..n {
                full[(row, 2 + k)] = cohort.covariate_value(row, col);
            }
        }

        // Reduced design drops the exposure column
        let mut reduced = Array2::<f64>::zeros((n, p - 1));
        reduced
            .column_mut(0)
            .assign(&full.index_axis(Axis(1), INTERCEPT_COL));
        if p > 2 {
            reduced
                .slice_mut(s![.., 1..])
                .assign(&full.slice(s![.., 2..]));
        }

        Ok(Self { full, reduced })
    }

    /// Number of observations
    #[must_use]
    pub fn n_observations(&self) -> usize {
        self.full.nrows()
    }

    /// Number of parameters in the full model
    #[must_use]
    pub fn n_parameters(&self) -> usize {
        self.full.ncols()
    }
}
