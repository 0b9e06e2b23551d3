//! Tests for maximum-cardinality case-control matching

use phewas_core::algorithm::matching::hopcroft_karp::maximum_matching;
use phewas_core::{
    AggregationSettings, CodeSystem, CohortMatrix, CohortMatrixBuilder, ControlMatcher,
    MatchingSettings, PhewasError, Subject, Tolerance, Vocabulary,
};
use phewas_core::algorithm::matching::verify_injective;

/// Exhaustive maximum matching size, for checking maximality on small graphs
fn brute_force_max(adjacency: &[Vec<usize>], n_right: usize) -> usize {
    fn recurse(adjacency: &[Vec<usize>], case: usize, used: &mut Vec<bool>) -> usize {
        if case == adjacency.len() {
            return 0;
        }
        // Leave this case unmatched
        let mut best = recurse(adjacency, case + 1, used);
        for &control in &adjacency[case] {
            if !used[control] {
                used[control] = true;
                best = best.max(1 + recurse(adjacency, case + 1, used));
                used[control] = false;
            }
        }
        best
    }
    recurse(adjacency, 0, &mut vec![false; n_right])
}

#[test]
fn matching_size_is_maximal_on_small_graphs() {
    let graphs: Vec<(Vec<Vec<usize>>, usize)> = vec![
        (vec![vec![0], vec![0], vec![0, 1], vec![2], vec![2, 3]], 5),
        (vec![vec![0, 1], vec![1, 2], vec![2, 3], vec![3, 4], vec![4, 0]], 5),
        (vec![vec![1], vec![1], vec![1], vec![0, 1, 2], vec![]], 3),
        (vec![vec![], vec![], vec![0]], 2),
    ];
    for (adjacency, n_right) in graphs {
        let matching = maximum_matching(&adjacency, n_right);
        assert_eq!(
            matching.size(),
            brute_force_max(&adjacency, n_right),
            "not maximal on {adjacency:?}"
        );
    }
}

fn subject(id: &str, exposure: f64, age: f64, sex: f64) -> Subject {
    Subject::new(id, exposure, vec![age, sex], Vec::new())
}

fn cohort_of(subjects: &[Subject]) -> CohortMatrix {
    let vocabulary = Vocabulary::from_entries(
        &[CodeSystem::Icd9],
        Vec::<(CodeSystem, String, String)>::new(),
    )
    .unwrap();
    let builder = CohortMatrixBuilder::new(
        &vocabulary,
        vec!["age".to_string(), "sex".to_string()],
        AggregationSettings::default(),
    );
    builder.build(subjects).unwrap().0
}

fn age_sex_settings() -> MatchingSettings {
    MatchingSettings::builder()
        .rule("age", Tolerance::Within(1.0))
        .rule("sex", Tolerance::Exact)
        .build()
}

#[test]
fn selects_matched_controls_within_tolerance() {
    let subjects = vec![
        subject("case-1", 1.0, 30.0, 0.0),
        subject("case-2", 1.0, 40.0, 1.0),
        subject("ctrl-1", 0.0, 30.5, 0.0),
        subject("ctrl-2", 0.0, 41.0, 1.0),
        subject("ctrl-3", 0.0, 70.0, 0.0),
    ];
    let cohort = cohort_of(&subjects);
    let result = ControlMatcher::new(age_sex_settings())
        .select(&cohort)
        .unwrap();

    assert_eq!(result.summary.n_cases_matched, 2);
    assert_eq!(result.summary.n_controls_selected, 2);
    assert_eq!(result.summary.n_cases_unmatched, 0);
    assert!(verify_injective(&result));
}

#[test]
fn case_with_no_eligible_control_is_reported_not_fatal() {
    let subjects = vec![
        subject("case-1", 1.0, 30.0, 0.0),
        subject("case-2", 1.0, 90.0, 0.0),
        subject("ctrl-1", 0.0, 30.0, 0.0),
    ];
    let cohort = cohort_of(&subjects);
    let result = ControlMatcher::new(age_sex_settings())
        .select(&cohort)
        .unwrap();

    assert_eq!(result.summary.n_cases_matched, 1);
    assert_eq!(result.summary.n_cases_unmatched, 1);
    assert_eq!(result.unmatched_cases, vec![1]);
}

#[test]
fn contested_control_is_reassigned_through_augmenting_path() {
    // Both cases prefer ctrl-1 by adjacency order, but case-1 can only take
    // ctrl-1; a maximum matching must push case-2 onto ctrl-2.
    let subjects = vec![
        subject("case-1", 1.0, 30.0, 0.0),
        subject("case-2", 1.0, 30.6, 0.0),
        subject("ctrl-1", 0.0, 30.2, 0.0),
        subject("ctrl-2", 0.0, 31.0, 0.0),
    ];
    let cohort = cohort_of(&subjects);
    let settings = MatchingSettings::builder()
        .rule("age", Tolerance::Within(0.5))
        .build();
    let result = ControlMatcher::new(settings).select(&cohort).unwrap();

    assert_eq!(result.summary.n_cases_matched, 2);
    assert!(verify_injective(&result));
}

#[test]
fn rerunning_yields_identical_matching() {
    let subjects = vec![
        subject("case-1", 1.0, 30.0, 0.0),
        subject("case-2", 1.0, 30.0, 0.0),
        subject("case-3", 1.0, 31.0, 0.0),
        subject("ctrl-1", 0.0, 30.0, 0.0),
        subject("ctrl-2", 0.0, 30.5, 0.0),
        subject("ctrl-3", 0.0, 31.0, 0.0),
        subject("ctrl-4", 0.0, 31.8, 0.0),
    ];
    let cohort = cohort_of(&subjects);
    let matcher = ControlMatcher::new(age_sex_settings());
    let first = matcher.select(&cohort).unwrap();
    let second = matcher.select(&cohort).unwrap();
    assert_eq!(first, second);
}

#[test]
fn empty_candidate_pool_is_fatal() {
    let subjects = vec![
        subject("case-1", 1.0, 30.0, 0.0),
        subject("case-2", 1.0, 40.0, 0.0),
    ];
    let cohort = cohort_of(&subjects);
    let result = ControlMatcher::new(age_sex_settings()).select(&cohort);
    assert!(matches!(result, Err(PhewasError::NoCandidatePool)));
}

#[test]
fn non_binary_exposure_rejected_for_matching() {
    let subjects = vec![
        subject("s-1", 2.5, 30.0, 0.0),
        subject("s-2", 0.0, 30.0, 0.0),
    ];
    let cohort = cohort_of(&subjects);
    let result = ControlMatcher::new(age_sex_settings()).select(&cohort);
    assert!(matches!(result, Err(PhewasError::InvalidConfig(_))));
}

#[test]
fn unknown_rule_covariate_rejected() {
    let subjects = vec![
        subject("case-1", 1.0, 30.0, 0.0),
        subject("ctrl-1", 0.0, 30.0, 0.0),
    ];
    let cohort = cohort_of(&subjects);
    let settings = MatchingSettings::builder()
        .rule("height", Tolerance::Within(5.0))
        .build();
    let result = ControlMatcher::new(settings).select(&cohort);
    assert!(matches!(result, Err(PhewasError::InvalidConfig(_))));
}
