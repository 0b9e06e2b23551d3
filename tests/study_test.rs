//! End-to-end pipeline tests on a small synthetic cohort

use chrono::NaiveDate;
use phewas_core::{
    AggregationPolicy, AggregationSettings, CancelFlag, CodeSystem, CorrectionMethod,
    CorrectionSettings, DiagnosisEvent, MatchingSettings, ModelFamily, ModelSettings,
    PhewasError, StudyConfig, Subject, TestStatistic, Tolerance, Vocabulary, run_study,
};

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn event(code: &str, day: u32) -> DiagnosisEvent {
    DiagnosisEvent::new(
        code,
        CodeSystem::Icd9,
        NaiveDate::from_ymd_opt(2020, 1, day).unwrap(),
    )
}

fn vocabulary() -> Vocabulary {
    Vocabulary::from_entries(
        &[CodeSystem::Icd9],
        vec![(CodeSystem::Icd9, "250.00", "diabetes")],
    )
    .unwrap()
}

fn subject(id: &str, exposure: f64, age: f64, diabetic: bool) -> Subject {
    let mut events = Vec::new();
    if diabetic {
        events.push(event("250.00", 3));
        events.push(event("250.00", 17));
    }
    Subject::new(id, exposure, vec![age], events)
}

/// Four cases and eight controls with a hand-computable compatibility
/// structure under age tolerance ±1:
///   case-1 (30), case-2 (30), case-3 (30) all compete for ctrl-1 (30) and
///   ctrl-2 (31); case-4 (60) can only take ctrl-3 (59). The maximum
///   matching is therefore 3, with one of the age-30 cases unmatched.
fn synthetic_cohort() -> Vec<Subject> {
    vec![
        subject("case-1", 1.0, 30.0, true),
        subject("case-2", 1.0, 30.0, false),
        subject("case-3", 1.0, 30.0, true),
        subject("case-4", 1.0, 60.0, true),
        subject("ctrl-1", 0.0, 30.0, false),
        subject("ctrl-2", 0.0, 31.0, true),
        subject("ctrl-3", 0.0, 59.0, false),
        subject("ctrl-4", 0.0, 90.0, false),
        subject("ctrl-5", 0.0, 90.0, true),
        subject("ctrl-6", 0.0, 91.0, false),
        subject("ctrl-7", 0.0, 92.0, true),
        subject("ctrl-8", 0.0, 93.0, false),
    ]
}

fn config() -> StudyConfig {
    StudyConfig {
        matching: MatchingSettings::builder()
            .rule("age", Tolerance::Within(1.0))
            .build(),
        aggregation: AggregationSettings {
            policy: AggregationPolicy::Presence { min_occurrences: 2 },
            min_cohort_count: 2,
        },
        model: ModelSettings {
            family: ModelFamily::Logistic,
            statistic: TestStatistic::Wald,
            covariates: Vec::new(),
        },
        correction: CorrectionSettings {
            method: CorrectionMethod::Fdr,
            alpha: 0.05,
        },
    }
}

#[test]
fn matched_study_run_produces_expected_matching_and_results() {
    init_logs();
    let vocab = vocabulary();
    let subjects = synthetic_cohort();
    let output = run_study(
        &subjects,
        &vocab,
        vec!["age".to_string()],
        &config(),
        &CancelFlag::new(),
    )
    .unwrap();

    let summary = output.match_summary.unwrap();
    assert_eq!(summary.n_cases_matched, 3);
    assert_eq!(summary.n_controls_selected, 3);
    assert_eq!(summary.n_cases_unmatched, 1);

    // Complete table: one row per retained phenotype, annotated either way
    assert_eq!(output.results.len(), 1);
    assert_eq!(output.results[0].phenotype, "diabetes");
    assert_eq!(output.results[0].n, 6);
    assert_eq!(output.diagnostics.unmapped_codes, 0);
}

#[test]
fn repeated_runs_are_reproducible() {
    init_logs();
    let vocab = vocabulary();
    let subjects = synthetic_cohort();
    let cfg = config();
    let first = run_study(
        &subjects,
        &vocab,
        vec!["age".to_string()],
        &cfg,
        &CancelFlag::new(),
    )
    .unwrap();
    let second = run_study(
        &subjects,
        &vocab,
        vec!["age".to_string()],
        &cfg,
        &CancelFlag::new(),
    )
    .unwrap();

    assert_eq!(first.results, second.results);
    assert_eq!(first.match_summary, second.match_summary);
}

#[test]
fn invalid_configuration_fails_before_any_computation() {
    init_logs();
    let vocab = vocabulary();
    let subjects = synthetic_cohort();
    let mut cfg = config();
    // Counts cannot feed a logistic model
    cfg.aggregation.policy = AggregationPolicy::Count;
    let result = run_study(
        &subjects,
        &vocab,
        vec!["age".to_string()],
        &cfg,
        &CancelFlag::new(),
    );
    assert!(matches!(result, Err(PhewasError::InvalidConfig(_))));
}

#[test]
fn empty_pool_falls_back_to_full_cohort_when_configured() {
    init_logs();
    let vocab = vocabulary();
    // Exposed subjects only: no candidate controls at all
    let subjects: Vec<Subject> = (0..6)
        .map(|i| subject(&format!("case-{i}"), 1.0, 30.0, i % 2 == 0))
        .collect();

    let mut cfg = config();
    let without_fallback = run_study(
        &subjects,
        &vocab,
        vec!["age".to_string()],
        &cfg,
        &CancelFlag::new(),
    );
    assert!(matches!(without_fallback, Err(PhewasError::NoCandidatePool)));

    cfg.matching = MatchingSettings::builder()
        .rule("age", Tolerance::Within(1.0))
        .fall_back_to_full_cohort(true)
        .build();
    let output = run_study(
        &subjects,
        &vocab,
        vec!["age".to_string()],
        &cfg,
        &CancelFlag::new(),
    )
    .unwrap();
    assert!(output.match_summary.is_none());
    assert_eq!(output.results.len(), 1);
}

#[test]
fn disabled_matching_tests_the_full_cohort() {
    init_logs();
    let vocab = vocabulary();
    let subjects = synthetic_cohort();
    let mut cfg = config();
    cfg.matching = MatchingSettings::default();
    let output = run_study(
        &subjects,
        &vocab,
        vec!["age".to_string()],
        &cfg,
        &CancelFlag::new(),
    )
    .unwrap();

    assert!(output.match_summary.is_none());
    assert_eq!(output.results[0].n, 12);
}

#[test]
fn study_output_serializes_for_reporting_collaborators() {
    init_logs();
    let vocab = vocabulary();
    let subjects = synthetic_cohort();
    let output = run_study(
        &subjects,
        &vocab,
        vec!["age".to_string()],
        &config(),
        &CancelFlag::new(),
    )
    .unwrap();

    let json = serde_json::to_string(&output).unwrap();
    assert!(json.contains("\"diabetes\""));
    assert!(json.contains("n_cases_matched"));
}
