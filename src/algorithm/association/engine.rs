//! Batch association testing across phenotype columns
//!
//! Each phenotype fit is an independent pure computation over the shared
//! read-only design matrix, so the batch is a rayon parallel map into a
//! position-indexed result vector: completion order cannot affect output
//! order. A single cancellation flag aborts the whole batch; individual
//! fits are never resumed.

use crate::algorithm::association::design::{Design, EXPOSURE_COL};
use crate::algorithm::association::{linear, logistic};
use crate::algorithm::association::types::{
    AssociationResult, FitSummary, NotTestableReason, TestOutcome,
};
use crate::cohort::CohortMatrix;
use crate::error::{PhewasError, Result};
use log::info;
use ndarray::Array1;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ChiSquared, ContinuousCDF, Normal, StudentsT};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// Regression family fitted per phenotype
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelFamily {
    /// Logistic regression on binary presence phenotypes
    Logistic,
    /// Linear regression on quantitative phenotype values
    Linear,
}

/// Test statistic used for the exposure term
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestStatistic {
    /// Two-sided Wald test on the exposure coefficient
    Wald,
    /// Likelihood-ratio test against the model without the exposure term
    LikelihoodRatio,
}

/// Configuration for the association test engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSettings {
    /// Regression family
    pub family: ModelFamily,
    /// Statistic for the exposure p-value
    pub statistic: TestStatistic,
    /// Covariate names adjusted for, in design order
    pub covariates: Vec<String>,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            family: ModelFamily::Logistic,
            statistic: TestStatistic::Wald,
            covariates: Vec::new(),
        }
    }
}

/// Shared flag cancelling an in-flight association batch as a whole
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Create a fresh, uncancelled flag
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of the batch
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Engine fitting one regression per retained phenotype
#[derive(Debug)]
pub struct AssociationTestEngine {
    settings: ModelSettings,
}

impl AssociationTestEngine {
    /// Create a new engine with the given model settings
    #[must_use]
    pub const fn new(settings: ModelSettings) -> Self {
        Self { settings }
    }

    /// Fit the configured model for every phenotype column in the cohort
    ///
    /// Degenerate phenotypes (constant column, singular design,
    /// non-convergence) are recorded as `NotTestable` rows; only
    /// cancellation fails the batch.
    pub fn run(&self, cohort: &CohortMatrix, cancel: &CancelFlag) -> Result<Vec<AssociationResult>> {
        let start_time = Instant::now();
        let design = Design::from_cohort(cohort, &self.settings.covariates)?;

        info!(
            "Testing {} phenotypes across {} subjects ({:?}, {:?})",
            cohort.n_phenotypes(),
            cohort.n_subjects(),
            self.settings.family,
            self.settings.statistic
        );

        let results: Result<Vec<AssociationResult>> = (0..cohort.n_phenotypes())
            .into_par_iter()
            .map(|idx| {
                if cancel.is_cancelled() {
                    return Err(PhewasError::Cancelled);
                }
                Ok(self.test_phenotype(cohort, &design, idx))
            })
            .collect();
        let results = results?;

        let testable = results
            .iter()
            .filter(|r| matches!(r.outcome, TestOutcome::Fitted(_)))
            .count();
        info!(
            "Association batch complete: {testable}/{} phenotypes testable in {:.2?}",
            results.len(),
            start_time.elapsed()
        );

        Ok(results)
    }

    /// Fit one phenotype column; degeneracy becomes a `NotTestable` row
    fn test_phenotype(
        &self,
        cohort: &CohortMatrix,
        design: &Design,
        idx: usize,
    ) -> AssociationResult {
        let phenotype = &cohort.phenotype_ids()[idx];
        let n = cohort.n_subjects();
        let y: Array1<f64> = cohort.phenotype_column(idx).to_owned();

        if is_constant(&y) {
            return AssociationResult::new(
                phenotype,
                n,
                TestOutcome::NotTestable {
                    reason: NotTestableReason::ConstantPhenotype,
                },
            );
        }

        let outcome = match self.fit_and_test(design, &y) {
            Ok(fit) => TestOutcome::Fitted(fit),
            Err(reason) => TestOutcome::NotTestable { reason },
        };
        AssociationResult::new(phenotype, n, outcome)
    }

    fn fit_and_test(
        &self,
        design: &Design,
        y: &Array1<f64>,
    ) -> std::result::Result<FitSummary, NotTestableReason> {
        match self.settings.family {
            ModelFamily::Logistic => {
                let full = logistic::fit(&design.full, y)?;
                let effect = full.coefficients[EXPOSURE_COL];
                let se = full.standard_errors[EXPOSURE_COL];
                let p_value = match self.settings.statistic {
                    TestStatistic::Wald => wald_normal_p(effect, se),
                    TestStatistic::LikelihoodRatio => {
                        let reduced = logistic::fit(&design.reduced, y)?;
                        likelihood_ratio_p(full.log_likelihood, reduced.log_likelihood)
                    }
                };
                Ok(FitSummary {
                    effect,
                    se,
                    p_value,
                })
            }
            ModelFamily::Linear => {
                let full = linear::fit(&design.full, y)?;
                let effect = full.coefficients[EXPOSURE_COL];
                let se = full.standard_errors[EXPOSURE_COL];
                let p_value = match self.settings.statistic {
                    TestStatistic::Wald => wald_t_p(effect, se, full.df_residual),
                    TestStatistic::LikelihoodRatio => {
                        let reduced = linear::fit(&design.reduced, y)?;
                        likelihood_ratio_p(full.log_likelihood, reduced.log_likelihood)
                    }
                };
                Ok(FitSummary {
                    effect,
                    se,
                    p_value,
                })
            }
        }
    }
}

fn is_constant(y: &Array1<f64>) -> bool {
    y.iter().all(|&v| v == y[0])
}

/// Two-sided Wald p-value from a standard normal reference
///
/// Evaluated on the lower tail: `1 - cdf(z)` cancels catastrophically for
/// large z and would collapse strong signals to an exact zero.
fn wald_normal_p(effect: f64, se: f64) -> f64 {
    let normal = Normal::new(0.0, 1.0).expect("standard normal parameters are valid");
    let z = (effect / se).abs();
    2.0 * normal.cdf(-z)
}

/// Two-sided Wald p-value from a Student's t reference with `df` degrees of
/// freedom, evaluated on the lower tail for the same stability reason
fn wald_t_p(effect: f64, se: f64, df: usize) -> f64 {
    let t_dist =
        StudentsT::new(0.0, 1.0, df as f64).expect("t distribution parameters are valid");
    let t = (effect / se).abs();
    2.0 * t_dist.cdf(-t)
}

/// Likelihood-ratio p-value, chi-squared with one degree of freedom, via the
/// survival tail
fn likelihood_ratio_p(ll_full: f64, ll_reduced: f64) -> f64 {
    let chi2 = ChiSquared::new(1.0).expect("chi-squared parameters are valid");
    let stat = (2.0 * (ll_full - ll_reduced)).max(0.0);
    chi2.sf(stat)
}
