//! Multiple-comparison correction across phenotype p-values
//!
//! `NotTestable` rows keep their output position but are excluded from the
//! testable denominator. Both procedures are pure functions of the raw
//! p-values, so re-running on identical input is idempotent.

use crate::algorithm::association::types::AssociationResult;
use crate::error::{PhewasError, Result};
use log::info;
use serde::{Deserialize, Serialize};

/// Supported correction procedures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionMethod {
    /// Family-wise: significance threshold alpha / n_testable
    Bonferroni,
    /// Benjamini-Hochberg false discovery rate step-up
    Fdr,
}

/// Configuration for the correction phase
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrectionSettings {
    /// Correction procedure
    pub method: CorrectionMethod,
    /// Significance level
    pub alpha: f64,
}

impl Default for CorrectionSettings {
    fn default() -> Self {
        Self {
            method: CorrectionMethod::Fdr,
            alpha: 0.05,
        }
    }
}

/// Apply the configured correction in place, setting `p_corrected` and
/// `significant` on every fitted row
pub fn apply(results: &mut [AssociationResult], settings: &CorrectionSettings) -> Result<()> {
    if !(settings.alpha > 0.0 && settings.alpha < 1.0) {
        return Err(PhewasError::InvalidConfig(format!(
            "correction alpha must be in (0, 1), got {}",
            settings.alpha
        )));
    }

    // (result position, raw p) for rows that were actually fitted
    let testable: Vec<(usize, f64)> = results
        .iter()
        .enumerate()
        .filter_map(|(idx, r)| r.outcome.p_value().map(|p| (idx, p)))
        .collect();
    let n = testable.len();
    if n == 0 {
        return Ok(());
    }

    match settings.method {
        CorrectionMethod::Bonferroni => {
            let threshold = settings.alpha / n as f64;
            for (idx, p) in testable {
                results[idx].p_corrected = Some((p * n as f64).min(1.0));
                results[idx].significant = p <= threshold;
            }
        }
        CorrectionMethod::Fdr => {
            let mut order = testable;
            order.sort_by(|a, b| a.1.total_cmp(&b.1));

            // Largest rank k with p(k) <= k/n * alpha marks ranks <= k
            let mut cutoff_rank = 0;
            for (rank0, &(_, p)) in order.iter().enumerate() {
                let rank = rank0 + 1;
                if p <= rank as f64 / n as f64 * settings.alpha {
                    cutoff_rank = rank;
                }
            }

            // Adjusted p-values via the step-up running minimum
            let mut running_min = 1.0_f64;
            for (rank0, &(idx, p)) in order.iter().enumerate().rev() {
                let rank = rank0 + 1;
                running_min = running_min.min(p * n as f64 / rank as f64).min(1.0);
                results[idx].p_corrected = Some(running_min);
                results[idx].significant = rank <= cutoff_rank;
            }
        }
    }

    let significant = results.iter().filter(|r| r.significant).count();
    info!(
        "Correction ({:?}, alpha {}): {significant}/{n} testable phenotypes significant",
        settings.method, settings.alpha
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::association::types::{FitSummary, NotTestableReason, TestOutcome};

    fn fitted(p: f64) -> AssociationResult {
        AssociationResult::new(
            format!("pheno-{p}"),
            10,
            TestOutcome::Fitted(FitSummary {
                effect: 0.5,
                se: 0.1,
                p_value: p,
            }),
        )
    }

    fn untestable() -> AssociationResult {
        AssociationResult::new(
            "constant",
            10,
            TestOutcome::NotTestable {
                reason: NotTestableReason::ConstantPhenotype,
            },
        )
    }

    #[test]
    fn bonferroni_threshold_is_alpha_over_n() {
        // 100 testable phenotypes at alpha 0.05: threshold exactly 0.0005
        let mut results: Vec<_> = (1..=100).map(|i| fitted(i as f64 / 1000.0)).collect();
        results[0] = fitted(0.0005);
        results[1] = fitted(0.00051);
        apply(
            &mut results,
            &CorrectionSettings {
                method: CorrectionMethod::Bonferroni,
                alpha: 0.05,
            },
        )
        .unwrap();
        assert!(results[0].significant);
        assert!(!results[1].significant);
    }

    #[test]
    fn fdr_flags_hand_computed_prefix() {
        let mut results: Vec<_> = [0.001, 0.02, 0.03, 0.04, 0.5]
            .into_iter()
            .map(fitted)
            .collect();
        apply(
            &mut results,
            &CorrectionSettings {
                method: CorrectionMethod::Fdr,
                alpha: 0.05,
            },
        )
        .unwrap();
        // k/n * alpha thresholds: 0.01, 0.02, 0.03, 0.04, 0.05 - ranks 1-4 pass
        let flags: Vec<bool> = results.iter().map(|r| r.significant).collect();
        assert_eq!(flags, vec![true, true, true, true, false]);
    }

    #[test]
    fn untestable_rows_keep_position_and_shrink_denominator() {
        let mut results = vec![fitted(0.01), untestable(), fitted(0.04)];
        apply(
            &mut results,
            &CorrectionSettings {
                method: CorrectionMethod::Bonferroni,
                alpha: 0.05,
            },
        )
        .unwrap();
        // Denominator is 2, not 3
        assert_eq!(results[0].p_corrected, Some(0.02));
        assert!(results[0].significant);
        assert_eq!(results[1].p_corrected, None);
        assert!(!results[1].significant);
        assert_eq!(results[2].p_corrected, Some(0.08));
    }

    #[test]
    fn reapplying_is_idempotent() {
        let settings = CorrectionSettings::default();
        let mut once = vec![fitted(0.001), fitted(0.2), untestable()];
        apply(&mut once, &settings).unwrap();
        let mut twice = once.clone();
        apply(&mut twice, &settings).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn invalid_alpha_rejected() {
        let mut results = vec![fitted(0.01)];
        let err = apply(
            &mut results,
            &CorrectionSettings {
                method: CorrectionMethod::Fdr,
                alpha: 1.5,
            },
        );
        assert!(matches!(err, Err(PhewasError::InvalidConfig(_))));
    }
}
