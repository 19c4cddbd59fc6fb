use didact::{ExecutionFault, Sandbox, SetupError, grade};

#[test]
fn top_level_statements_run_once_at_load() {
    let sandbox = Sandbox::new();
    // Loading runs the module-level code; a fault there is a load error.
    let err = sandbox
        .load("let x = 1 / 0; fn factorial(n) { 1 }", "factorial")
        .err()
        .expect("load fault");
    assert!(matches!(err, SetupError::Load(_)));
}

#[test]
fn submission_invocations_do_not_share_state() {
    let sandbox = Sandbox::new();
    let submission = sandbox
        .load("fn factorial(n) { if n <= 1 { 1 } else { n * factorial(n - 1) } }", "factorial")
        .expect("load");

    let a = submission.invoke(5).expect("invoke");
    let b = submission.invoke(5).expect("invoke");
    assert_eq!(a.as_int().expect("int"), 120);
    assert_eq!(b.as_int().expect("int"), 120);
}

#[test]
fn nothing_leaks_between_grading_calls() {
    // The first submission leaves a binding behind in its own scope...
    let err = grade("let leak = 1;").expect_err("no factorial");
    assert!(matches!(err, SetupError::MissingFunction(_)));

    // ...which the next submission must not be able to observe.
    let report = grade("fn factorial(n) { leak }").expect("grade");
    assert!(matches!(
        report.results()[0].outcome,
        didact::CaseOutcome::Fault(ExecutionFault::Runtime(_))
    ));
}

#[test]
fn functions_cannot_see_module_level_bindings() {
    // Rhai functions are pure: the loaded scope is not visible inside them,
    // which is exactly the isolation the grader wants.
    let sandbox = Sandbox::new();
    let submission = sandbox
        .load("let secret = 7; fn factorial(n) { secret }", "factorial")
        .expect("load");

    assert!(matches!(submission.invoke(0), Err(ExecutionFault::Runtime(_))));
}

#[test]
fn recursion_depth_cap_surfaces_as_a_fault_not_a_crash() {
    let sandbox = Sandbox::new();
    let submission = sandbox
        .load("fn factorial(n) { factorial(n - 1) }", "factorial")
        .expect("load");

    assert!(matches!(
        submission.invoke(0),
        Err(ExecutionFault::UnboundedRecursion)
    ));
}

#[test]
fn operation_budget_surfaces_as_a_fault() {
    let sandbox = Sandbox::new();
    let submission = sandbox
        .load("fn factorial(n) { let i = 0; while true { i += 1; } i }", "factorial")
        .expect("load");

    assert!(matches!(submission.invoke(0), Err(ExecutionFault::OutOfBudget)));
}

#[test]
fn load_reports_missing_function_for_unrelated_definitions() {
    let sandbox = Sandbox::new();
    let err = sandbox
        .load("fn fact(n) { 1 }", "factorial")
        .err()
        .expect("missing");
    assert!(matches!(err, SetupError::MissingFunction(name) if name == "factorial"));
}
