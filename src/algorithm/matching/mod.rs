//! Maximum-cardinality case-control matching
//!
//! Eligibility between a case and a candidate control is a per-covariate
//! tolerance predicate; selecting the largest one-to-one matched control set
//! is maximum bipartite matching, solved with Hopcroft-Karp.

pub mod criteria;
pub mod graph;
pub mod hopcroft_karp;
pub mod matcher;
pub mod types;

pub use criteria::{MatchRule, MatchingSettings, MatchingSettingsBuilder, Tolerance};
pub use graph::MatchingGraph;
pub use matcher::{ControlMatcher, verify_injective};
pub use types::{MatchResult, MatchSummary, MatchedPair};
