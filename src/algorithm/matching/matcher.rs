//! Core matching orchestration
//!
//! Splits the cohort into cases and candidate controls by exposure, builds
//! the compatibility graph, runs maximum bipartite matching, and assembles
//! the match result with unmatched-case reporting.

use crate::algorithm::matching::criteria::MatchingSettings;
use crate::algorithm::matching::graph::MatchingGraph;
use crate::algorithm::matching::hopcroft_karp::maximum_matching;
use crate::algorithm::matching::types::{MatchResult, MatchSummary, MatchedPair};
use crate::cohort::CohortMatrix;
use crate::error::{PhewasError, Result};
use log::info;
use std::time::Instant;

/// Matcher selecting a maximum-cardinality balanced control set
#[derive(Debug)]
pub struct ControlMatcher {
    settings: MatchingSettings,
}

impl ControlMatcher {
    /// Create a new matcher with the given settings
    #[must_use]
    pub const fn new(settings: MatchingSettings) -> Self {
        Self { settings }
    }

    /// Select matched controls for the cases in the cohort
    ///
    /// Cases are rows with exposure 1, candidate controls rows with exposure
    /// 0; matching therefore requires a binary-coded exposure. Cases with no
    /// eligible control are reported unmatched, never an error. An empty
    /// candidate pool is `NoCandidatePool`.
    pub fn select(&self, cohort: &CohortMatrix) -> Result<MatchResult> {
        let start_time = Instant::now();

        let mut case_rows = Vec::new();
        let mut control_rows = Vec::new();
        for (row, &exposure) in cohort.exposures().iter().enumerate() {
            if exposure == 1.0 {
                case_rows.push(row);
            } else if exposure == 0.0 {
                control_rows.push(row);
            } else {
                return Err(PhewasError::InvalidConfig(format!(
                    "control matching requires a binary exposure; subject {} has exposure {exposure}",
                    cohort.subject_ids()[row]
                )));
            }
        }

        info!(
            "Matching {} cases against a pool of {} candidate controls",
            case_rows.len(),
            control_rows.len()
        );

        let graph = MatchingGraph::build(cohort, case_rows, control_rows, &self.settings.rules)?;
        let matching = maximum_matching(&graph.adjacency, graph.n_controls());

        let mut pairs = Vec::with_capacity(graph.n_cases());
        let mut unmatched_cases = Vec::new();
        for (case_node, pair) in matching.pair_left.iter().enumerate() {
            match pair {
                Some(control_node) => pairs.push(MatchedPair {
                    case_row: graph.case_rows[case_node],
                    control_row: graph.control_rows[*control_node],
                }),
                None => unmatched_cases.push(graph.case_rows[case_node]),
            }
        }

        let summary = MatchSummary {
            n_cases_matched: pairs.len(),
            n_controls_selected: pairs.len(),
            n_cases_unmatched: unmatched_cases.len(),
        };

        info!(
            "Matching complete: {} of {} cases matched ({} unmatched) in {:.2?}",
            summary.n_cases_matched,
            graph.n_cases(),
            summary.n_cases_unmatched,
            start_time.elapsed()
        );

        Ok(MatchResult {
            pairs,
            unmatched_cases,
            summary,
        })
    }
}

/// Verify that no case or control row appears more than once in a result
///
/// Used by tests and debug assertions; a violation would mean the matching
/// lost its injectivity invariant.
#[must_use]
pub fn verify_injective(result: &MatchResult) -> bool {
    let mut cases = rustc_hash::FxHashSet::default();
    let mut controls = rustc_hash::FxHashSet::default();
    result
        .pairs
        .iter()
        .all(|pair| cases.insert(pair.case_row) && controls.insert(pair.control_row))
}
