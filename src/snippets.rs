#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use crate::{
    constants::{BASE_CASE_SNIPPET, RECURSIVE_CASE_SNIPPET, TRUST_RECURSION_SNIPPET},
    grade::{CaseOutcome, GradeReport},
    sandbox::ExecutionFault,
};

/// Names of the built-in snippets, in pedagogical order.
pub const SNIPPET_NAMES: [&str; 3] = ["base_case", "recursive_case", "trust_recursion"];

/// Looks up a snippet by name.
pub fn snippet(name: &str) -> Option<&'static str> {
    match name {
        "base_case" => Some(BASE_CASE_SNIPPET),
        "recursive_case" => Some(RECURSIVE_CASE_SNIPPET),
        "trust_recursion" => Some(TRUST_RECURSION_SNIPPET),
        _ => None,
    }
}

/// Picks the most relevant snippet for a grade report.
///
/// Runaway recursion points at a missing base case; wrong values point at the
/// recursive case; a clean pass gets the abstraction lesson.
pub fn suggest(report: &GradeReport) -> &'static str {
    let runaway = report.results().iter().any(|r| {
        matches!(
            r.outcome,
            CaseOutcome::Fault(ExecutionFault::UnboundedRecursion)
                | CaseOutcome::Fault(ExecutionFault::OutOfBudget)
        )
    });

    if runaway {
        BASE_CASE_SNIPPET
    } else if report.all_passed() {
        TRUST_RECURSION_SNIPPET
    } else {
        RECURSIVE_CASE_SNIPPET
    }
}
