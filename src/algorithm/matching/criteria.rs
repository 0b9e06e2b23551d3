//! Matching criteria definitions for case-control matching
//!
//! A control is eligible for a case only if every configured covariate rule
//! holds between the two subjects.

use serde::{Deserialize, Serialize};

/// Allowed difference between a case and a control on one covariate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Tolerance {
    /// Values must be identical (e.g., sex)
    Exact,
    /// Absolute difference must not exceed the given window (e.g., age ±k)
    Within(f64),
}

impl Tolerance {
    /// Whether two covariate values satisfy this tolerance
    #[must_use]
    pub fn accepts(&self, case: f64, control: f64) -> bool {
        match *self {
            Self::Exact => case == control,
            Self::Within(window) => (case - control).abs() <= window,
        }
    }
}

/// One per-covariate matching rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRule {
    /// Covariate name, resolved against the cohort covariate table
    pub covariate: String,
    /// Tolerance applied to this covariate
    pub tolerance: Tolerance,
}

impl MatchRule {
    /// Create a new rule
    #[must_use]
    pub fn new(covariate: impl Into<String>, tolerance: Tolerance) -> Self {
        Self {
            covariate: covariate.into(),
            tolerance,
        }
    }
}

/// Configuration for the control-matching phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingSettings {
    /// Whether matched-control selection runs at all
    pub enabled: bool,
    /// Per-covariate tolerance rules; all must hold for an edge to exist
    pub rules: Vec<MatchRule>,
    /// On `NoCandidatePool`, fall back to testing the full unmatched cohort
    /// instead of failing the run
    pub fall_back_to_full_cohort: bool,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            rules: Vec::new(),
            fall_back_to_full_cohort: false,
        }
    }
}

impl MatchingSettings {
    /// Create a new builder for constructing matching settings
    #[must_use]
    pub fn builder() -> MatchingSettingsBuilder {
        MatchingSettingsBuilder::new()
    }
}

/// Builder for constructing matching settings
#[derive(Debug, Clone, Default)]
pub struct MatchingSettingsBuilder {
    settings: MatchingSettings,
}

impl MatchingSettingsBuilder {
    /// Create a new builder with matching enabled and no rules
    #[must_use]
    pub fn new() -> Self {
        Self {
            settings: MatchingSettings {
                enabled: true,
                ..MatchingSettings::default()
            },
        }
    }

    /// Add a per-covariate tolerance rule
    #[must_use]
    pub fn rule(mut self, covariate: impl Into<String>, tolerance: Tolerance) -> Self {
        self.settings.rules.push(MatchRule::new(covariate, tolerance));
        self
    }

    /// Set whether an empty candidate pool falls back to the full cohort
    #[must_use]
    pub const fn fall_back_to_full_cohort(mut self, fall_back: bool) -> Self {
        self.settings.fall_back_to_full_cohort = fall_back;
        self
    }

    /// Build the matching settings
    #[must_use]
    pub fn build(self) -> MatchingSettings {
        self.settings
    }
}
