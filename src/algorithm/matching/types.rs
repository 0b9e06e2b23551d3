//! Type definitions for the matching algorithm

use serde::{Deserialize, Serialize};

/// One matched case-control pair, as row indices into the cohort matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedPair {
    /// Cohort row index of the case
    pub case_row: usize,
    /// Cohort row index of the selected control
    pub control_row: usize,
}

/// Summary counts of a matching run, for downstream reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSummary {
    /// Cases matched one-to-one to a control
    pub n_cases_matched: usize,
    /// Distinct controls selected
    pub n_controls_selected: usize,
    /// Cases with no eligible control, excluded from the matched cohort
    pub n_cases_unmatched: usize,
}

/// Result of the matching process
///
/// The pair mapping is injective: no case and no control appears twice.
/// The matching is maximum-cardinality over the compatibility graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Matched pairs in case row order
    pub pairs: Vec<MatchedPair>,
    /// Cohort row indices of cases left unmatched
    pub unmatched_cases: Vec<usize>,
    /// Summary counts
    pub summary: MatchSummary,
}

impl MatchResult {
    /// Cohort row indices of the matched cohort: matched cases in original
    /// row order, followed by their controls in the same case order
    #[must_use]
    pub fn matched_rows(&self) -> Vec<usize> {
        let mut rows = Vec::with_capacity(self.pairs.len() * 2);
        rows.extend(self.pairs.iter().map(|p| p.case_row));
        rows.extend(self.pairs.iter().map(|p| p.control_row));
        rows
    }
}
