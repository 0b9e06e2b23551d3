//! Configuration for a full study run
//!
//! One serde-friendly tree composing the per-phase settings, validated up
//! front so configuration mistakes surface before any computation begins.

use crate::algorithm::association::{ModelFamily, ModelSettings};
use crate::algorithm::correction::CorrectionSettings;
use crate::algorithm::matching::{MatchingSettings, Tolerance};
use crate::cohort::{AggregationPolicy, AggregationSettings};
use crate::error::{PhewasError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for a full PheWAS study run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudyConfig {
    /// Matched-control selection settings
    pub matching: MatchingSettings,
    /// Event rollup and column pruning settings
    pub aggregation: AggregationSettings,
    /// Regression model settings
    pub model: ModelSettings,
    /// Multiple-comparison correction settings
    pub correction: CorrectionSettings,
}

impl StudyConfig {
    /// Fail-fast validation of the whole configuration tree
    ///
    /// Covariate names are resolved later against the cohort table; this
    /// checks everything knowable without data.
    pub fn validate(&self) -> Result<()> {
        if !(self.correction.alpha > 0.0 && self.correction.alpha < 1.0) {
            return Err(PhewasError::InvalidConfig(format!(
                "correction alpha must be in (0, 1), got {}",
                self.correction.alpha
            )));
        }

        match self.aggregation.policy {
            AggregationPolicy::Presence { min_occurrences } if min_occurrences == 0 => {
                return Err(PhewasError::InvalidConfig(
                    "presence rollup requires min_occurrences >= 1".to_string(),
                ));
            }
            AggregationPolicy::Count if self.model.family == ModelFamily::Logistic => {
                return Err(PhewasError::InvalidConfig(
                    "logistic models require the presence aggregation policy".to_string(),
                ));
            }
            _ => {}
        }

        for rule in &self.matching.rules {
            if let Tolerance::Within(window) = rule.tolerance {
                if !(window >= 0.0) {
                    return Err(PhewasError::InvalidConfig(format!(
                        "matching tolerance for {} must be non-negative, got {window}",
                        rule.covariate
                    )));
                }
            }
        }

        let mut seen = std::collections::HashSet::new();
        for name in &self.model.covariates {
            if !seen.insert(name.as_str()) {
                return Err(PhewasError::InvalidConfig(format!(
                    "duplicate model covariate: {name}"
                )));
            }
        }

        Ok(())
    }
}
