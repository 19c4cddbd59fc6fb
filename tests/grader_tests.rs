use didact::{
    CaseGrader, CaseOutcome, ExecutionFault, SetupError, TestCase, grade, grade_to_text,
};

const CORRECT: &str = "fn factorial(n) { if n <= 1 { 1 } else { n * factorial(n - 1) } }";

#[test]
fn correct_factorial_passes_every_case() {
    let report = grade(CORRECT).expect("grade");

    assert_eq!(report.results().len(), 3);
    assert!(report.results().iter().all(|r| r.passed()));
    assert!(report.all_passed());

    let text = report.render();
    assert!(text.contains("factorial(0) = 1"));
    assert!(text.contains("factorial(3) = 6"));
    assert!(text.contains("factorial(5) = 120"));
    assert!(text.ends_with("\nAll tests passed!"));
}

#[test]
fn identity_function_fails_every_case_and_continues() {
    let report = grade("fn factorial(n) { n }").expect("grade");

    assert_eq!(report.results().len(), 3);
    assert!(!report.all_passed());

    let text = report.render();
    assert!(text.contains("factorial(0) = 0, expected 1"));
    assert!(text.contains("factorial(3) = 3, expected 6"));
    assert!(text.contains("factorial(5) = 5, expected 120"));
    assert!(!text.contains("All tests passed!"));
}

#[test]
fn missing_base_case_short_circuits_after_first_case() {
    let report = grade("fn factorial(n) { factorial(n) }").expect("grade");

    assert_eq!(report.results().len(), 1, "remaining cases must be absent, not failed");
    assert_eq!(report.results()[0].case.input, 0);
    assert!(matches!(
        report.results()[0].outcome,
        CaseOutcome::Fault(ExecutionFault::UnboundedRecursion)
    ));
    assert!(!report.all_passed());
    assert!(report.render().contains("caused infinite recursion (missing base case?)"));
}

#[test]
fn runtime_fault_is_recorded_per_case_without_short_circuit() {
    let report =
        grade("fn factorial(n) { if n == 0 { throw \"boom\" } else { n } }").expect("grade");

    assert_eq!(report.results().len(), 3);
    assert!(matches!(
        &report.results()[0].outcome,
        CaseOutcome::Fault(ExecutionFault::Runtime(message)) if message.contains("boom")
    ));
    assert!(matches!(report.results()[1].outcome, CaseOutcome::Fail { .. }));
    assert!(matches!(report.results()[2].outcome, CaseOutcome::Fail { .. }));
    assert!(report.render().contains("factorial(0) error:"));
}

#[test]
fn infinite_loop_is_caught_by_the_budget() {
    let report = grade("fn factorial(n) { let i = 0; loop { i += 1; } }").expect("grade");

    assert_eq!(report.results().len(), 1);
    assert!(matches!(
        report.results()[0].outcome,
        CaseOutcome::Fault(ExecutionFault::OutOfBudget)
    ));
    assert!(report.render().contains("exceeded its execution budget"));
}

#[test]
fn empty_and_whitespace_sources_are_setup_errors() {
    assert!(matches!(grade(""), Err(SetupError::MissingFunction(_))));
    assert!(matches!(grade("   "), Err(SetupError::MissingFunction(_))));
}

#[test]
fn no_factorial_defined_is_a_setup_error_naming_the_function() {
    let err = grade("let x = 1;").expect_err("setup error");
    assert!(matches!(err, SetupError::MissingFunction(_)));
    assert!(err.to_string().contains("factorial"));
}

#[test]
fn shadowed_non_function_binding_is_a_setup_error() {
    let err = grade("let factorial = 42;").expect_err("setup error");
    assert!(matches!(err, SetupError::NotCallable(_)));
}

#[test]
fn syntax_error_is_a_setup_error() {
    let err = grade("fn factorial(n) {").expect_err("setup error");
    assert!(matches!(err, SetupError::Load(_)));
}

#[test]
fn non_integer_return_is_a_fail_not_a_fault() {
    let report = grade("fn factorial(n) { \"nope\" }").expect("grade");

    assert_eq!(report.results().len(), 3);
    assert!(report.render().contains("factorial(0) = nope, expected 1"));
}

#[test]
fn bodyless_function_fails_with_unit_value() {
    let report = grade("fn factorial(n) { }").expect("grade");

    assert_eq!(report.results().len(), 3);
    assert!(report.render().contains("factorial(0) = (), expected 1"));
}

#[test]
fn closure_bound_to_the_name_is_callable() {
    let report = grade("let factorial = |n| 1;").expect("grade");

    assert_eq!(report.results().len(), 3);
    assert!(report.results()[0].passed());
    assert!(!report.results()[1].passed());
    assert!(!report.all_passed());
}

#[test]
fn report_preserves_fixed_case_order() {
    let report = grade("fn factorial(n) { n }").expect("grade");
    let inputs: Vec<i64> = report.results().iter().map(|r| r.case.input).collect();
    assert_eq!(inputs, vec![0, 3, 5]);
}

#[test]
fn grading_is_idempotent() {
    let first = grade_to_text(CORRECT);
    let second = grade_to_text(CORRECT);
    assert_eq!(first, second);

    let first = grade_to_text("fn factorial(n) { factorial(n) }");
    let second = grade_to_text("fn factorial(n) { factorial(n) }");
    assert_eq!(first, second);
}

#[test]
fn grade_to_text_folds_setup_errors_into_the_message() {
    let text = grade_to_text("let x = 1;");
    assert!(text.contains("No function named 'factorial' found"));
}

#[test]
fn report_serializes_to_stable_json() {
    let report = grade(CORRECT).expect("grade");
    let value: serde_json::Value =
        serde_json::from_str(&report.to_json().expect("serialize")).expect("parse");

    assert_eq!(value["fn_name"], "factorial");
    assert_eq!(value["all_passed"], true);
    assert_eq!(value["results"][0]["case"]["input"], 0);
    assert_eq!(value["results"][0]["outcome"]["Pass"]["actual"], 1);

    let report = grade("fn factorial(n) { factorial(n) }").expect("grade");
    let value: serde_json::Value =
        serde_json::from_str(&report.to_json().expect("serialize")).expect("parse");

    assert_eq!(value["all_passed"], false);
    assert_eq!(value["results"][0]["outcome"]["Fault"], "UnboundedRecursion");
}

#[test]
fn grader_accepts_custom_cases_and_function_name() {
    let report = CaseGrader::builder()
        .source("fn double(n) { n * 2 }")
        .fn_name("double")
        .cases(vec![TestCase::new(2, 4), TestCase::new(5, 10)])
        .build()
        .grade()
        .expect("grade");

    assert!(report.all_passed());
    assert!(report.render().contains("double(2) = 4"));
}
