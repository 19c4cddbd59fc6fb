#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::fmt::Display;

use itertools::Itertools;
use rhai::Dynamic;
use serde::Serialize;
use tabled::{
    Table, Tabled,
    settings::{Panel, Style},
};
use typed_builder::TypedBuilder;

use crate::{
    constants::{FACTORIAL_CASES, FUNCTION_NAME},
    sandbox::{ExecutionFault, Sandbox, SetupError},
};

/// An ordered `(input, expected_output)` pair. Immutable, defined at
/// configuration time, never derived from user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TestCase {
    /// Argument passed to the submitted function.
    pub input:    i64,
    /// Value the submitted function must return.
    pub expected: i64,
}

impl TestCase {
    /// Creates a test case.
    pub fn new(input: i64, expected: i64) -> Self {
        Self { input, expected }
    }
}

/// The fixed factorial case set, in evaluation order.
pub fn factorial_cases() -> Vec<TestCase> {
    FACTORIAL_CASES
        .iter()
        .map(|&(input, expected)| TestCase::new(input, expected))
        .collect()
}

/// What happened when a single test case was run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CaseOutcome {
    /// The submission returned the expected value.
    Pass {
        /// The value returned (equal to the expected output).
        actual: i64,
    },
    /// The submission returned something else. The actual value is kept as
    /// rendered text since submissions may return non-integers.
    Fail {
        /// Rendering of the value actually returned.
        actual:   String,
        /// The value that was expected.
        expected: i64,
    },
    /// Invocation raised a fault.
    Fault(ExecutionFault),
}

/// One processed test case paired with its outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseResult {
    /// The test case that was run.
    pub case:    TestCase,
    /// What running it produced.
    pub outcome: CaseOutcome,
}

impl CaseResult {
    /// Whether this case passed.
    pub fn passed(&self) -> bool {
        matches!(self.outcome, CaseOutcome::Pass { .. })
    }

    /// Renders this result as one human-readable report line.
    fn line(&self, fn_name: &str) -> String {
        let n = self.case.input;
        match &self.outcome {
            CaseOutcome::Pass { actual } => format!("{fn_name}({n}) = {actual}"),
            CaseOutcome::Fail { actual, expected } => {
                format!("{fn_name}({n}) = {actual}, expected {expected}")
            }
            CaseOutcome::Fault(ExecutionFault::UnboundedRecursion) => {
                format!("{fn_name}({n}) caused infinite recursion (missing base case?)")
            }
            CaseOutcome::Fault(ExecutionFault::OutOfBudget) => {
                format!("{fn_name}({n}) exceeded its execution budget (infinite loop?)")
            }
            CaseOutcome::Fault(ExecutionFault::Runtime(message)) => {
                format!("{fn_name}({n}) error: {message}")
            }
        }
    }
}

/// Row shape for the tabled overview of a report.
#[derive(Tabled)]
struct CaseRow {
    /// The case as `factorial(n)`.
    #[tabled(rename = "Case")]
    case:     String,
    /// Expected output for the case.
    #[tabled(rename = "Expected")]
    expected: String,
    /// Outcome description.
    #[tabled(rename = "Outcome")]
    outcome:  String,
}

/// The ordered result of grading one submission. Produced fresh on every
/// grading call, never persisted; identical source always renders to
/// identical text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GradeReport {
    /// Name of the function that was graded.
    fn_name:    String,
    /// Per-case results, in evaluation order. May be shorter than the case
    /// set when grading short-circuited.
    results:    Vec<CaseResult>,
    /// True iff every configured case was run and passed.
    all_passed: bool,
}

impl GradeReport {
    /// The name of the graded function.
    pub fn fn_name(&self) -> &str {
        &self.fn_name
    }

    /// Per-case results in evaluation order.
    pub fn results(&self) -> &[CaseResult] {
        &self.results
    }

    /// True iff every configured case passed.
    pub fn all_passed(&self) -> bool {
        self.all_passed
    }

    /// One human-readable line per processed case, without the banner.
    pub fn lines(&self) -> Vec<String> {
        self.results.iter().map(|r| r.line(&self.fn_name)).collect()
    }

    /// The full report text: one line per processed case, followed by a
    /// success banner iff every case passed.
    pub fn render(&self) -> String {
        let mut text = self.lines().iter().join("\n");
        if self.all_passed {
            text.push_str("\n\nAll tests passed!");
        }
        text
    }

    /// Serializes the report for machine consumers.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Renders the report as a table for terminal display.
    pub fn table(&self) -> Table {
        let rows = self.results.iter().map(|r| CaseRow {
            case:     format!("{}({})", self.fn_name, r.case.input),
            expected: r.case.expected.to_string(),
            outcome:  r.line(&self.fn_name),
        });
        let passed = self.results.iter().filter(|r| r.passed()).count();

        let mut table = Table::new(rows);
        table
            .with(Panel::header("Grading Overview"))
            .with(Panel::footer(format!("Passed: {passed}/{}", self.results.len())))
            .with(Style::modern());
        table
    }
}

impl Display for GradeReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// Renders a returned value for a report line. Unit is spelled out so a
/// body-less function fails legibly.
fn render_value(value: &Dynamic) -> String {
    if value.is_unit() {
        "()".to_string()
    } else {
        value.to_string()
    }
}

/// A grader that runs a submission against a fixed ordered case set inside a
/// disposable [`Sandbox`].
///
/// Cases run sequentially in configuration order. A wrong value is recorded
/// and grading continues; a runtime fault is recorded and grading continues;
/// unbounded recursion (and budget exhaustion) stop the remaining cases,
/// since those faults dominate whatever would follow.
#[derive(TypedBuilder, Clone)]
pub struct CaseGrader {
    /// The submission's source code.
    #[builder(setter(into))]
    source:  String,
    /// Name of the function to extract and call.
    #[builder(default = FUNCTION_NAME.to_string(), setter(into))]
    fn_name: String,
    /// Ordered cases to run.
    #[builder(default = factorial_cases())]
    cases:   Vec<TestCase>,
}

impl CaseGrader {
    /// Grades the submission.
    ///
    /// Returns a [`SetupError`] without attempting any case when the source
    /// fails to load or defines no usable function; otherwise every fault is
    /// absorbed into the report.
    pub fn grade(&self) -> Result<GradeReport, SetupError> {
        let sandbox = Sandbox::new();
        let submission = sandbox.load(&self.source, &self.fn_name)?;

        let mut results = Vec::with_capacity(self.cases.len());
        let mut all_passed = true;

        for case in &self.cases {
            let outcome = match submission.invoke(case.input) {
                Ok(value) => match value.clone().as_int() {
                    Ok(actual) if actual == case.expected => CaseOutcome::Pass { actual },
                    Ok(actual) => CaseOutcome::Fail {
                        actual:   actual.to_string(),
                        expected: case.expected,
                    },
                    Err(_) => CaseOutcome::Fail {
                        actual:   render_value(&value),
                        expected: case.expected,
                    },
                },
                Err(fault) => CaseOutcome::Fault(fault),
            };

            if !matches!(outcome, CaseOutcome::Pass { .. }) {
                all_passed = false;
            }
            let stop = matches!(
                outcome,
                CaseOutcome::Fault(ExecutionFault::UnboundedRecursion)
                    | CaseOutcome::Fault(ExecutionFault::OutOfBudget)
            );

            results.push(CaseResult {
                case: *case,
                outcome,
            });

            if stop {
                tracing::debug!(
                    input = case.input,
                    "stopping early, remaining cases dominated by this fault"
                );
                break;
            }
        }

        Ok(GradeReport {
            fn_name: self.fn_name.clone(),
            results,
            all_passed,
        })
    }
}

/// Grades `source` against the fixed factorial case set.
pub fn grade(source: &str) -> Result<GradeReport, SetupError> {
    CaseGrader::builder().source(source).build().grade()
}

/// Grades `source` and always yields human-readable text, folding a
/// [`SetupError`] into its message. This is what the UI and the tutor see.
pub fn grade_to_text(source: &str) -> String {
    match grade(source) {
        Ok(report) => report.render(),
        Err(e) => e.to_string(),
    }
}
