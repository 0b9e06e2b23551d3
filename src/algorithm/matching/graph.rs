//! Compatibility graph construction for case-control matching
//!
//! The graph is bipartite: one node per case, one per candidate control,
//! with an edge wherever every covariate tolerance rule holds. Adjacency is
//! stored as explicit index-based neighbor lists, built fresh per run.

use crate::algorithm::matching::criteria::MatchRule;
use crate::cohort::CohortMatrix;
use crate::error::{PhewasError, Result};
use smallvec::SmallVec;

/// Bipartite compatibility graph between cases and candidate controls
///
/// Node ids are positions within `case_rows` / `control_rows`, which hold
/// the underlying cohort row indices. Input row order is preserved so that
/// the downstream matching is deterministic.
#[derive(Debug)]
pub struct MatchingGraph {
    /// Cohort row index of each case node
    pub case_rows: Vec<usize>,
    /// Cohort row index of each control node
    pub control_rows: Vec<usize>,
    /// Eligible control node ids per case node, in control input order
    pub adjacency: Vec<Vec<usize>>,
}

impl MatchingGraph {
    /// Build the compatibility graph from the cohort covariate table
    ///
    /// Rule covariate names are resolved against the cohort here; an unknown
    /// name is a configuration error. An empty control pool is
    /// `NoCandidatePool`.
    pub fn build(
        cohort: &CohortMatrix,
        case_rows: Vec<usize>,
        control_rows: Vec<usize>,
        rules: &[MatchRule],
    ) -> Result<Self> {
        if control_rows.is_empty() {
            return Err(PhewasError::NoCandidatePool);
        }

        // Resolve rule covariates to column indices once
        let resolved: SmallVec<[(usize, &MatchRule); 8]> = rules
            .iter()
            .map(|rule| {
                cohort
                    .covariate_index(&rule.covariate)
                    .map(|col| (col, rule))
                    .ok_or_else(|| {
                        PhewasError::InvalidConfig(format!(
                            "matching rule references unknown covariate: {}",
                            rule.covariate
                        ))
                    })
            })
            .collect::<Result<_>>()?;

        let mut adjacency = Vec::with_capacity(case_rows.len());
        for &case_row in &case_rows {
            let mut eligible: Vec<usize> = Vec::new();
            for (control_node, &control_row) in control_rows.iter().enumerate() {
                let compatible = resolved.iter().all(|&(col, rule)| {
                    rule.tolerance.accepts(
                        cohort.covariate_value(case_row, col),
                        cohort.covariate_value(control_row, col),
                    )
                });
                if compatible {
                    eligible.push(control_node);
                }
            }
            adjacency.push(eligible);
        }

        Ok(Self {
            case_rows,
            control_rows,
            adjacency,
        })
    }

    /// Number of case nodes
    #[must_use]
    pub fn n_cases(&self) -> usize {
        self.case_rows.len()
    }

    /// Number of control nodes
    #[must_use]
    pub fn n_controls(&self) -> usize {
        self.control_rows.len()
    }
}
