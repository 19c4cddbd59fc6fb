#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::time::Duration;

/// Name of the function every submission must define.
pub const FUNCTION_NAME: &str = "factorial";

/// The fixed `(input, expected_output)` pairs every submission is graded
/// against, in the order they are evaluated.
pub const FACTORIAL_CASES: [(i64, i64); 3] = [(0, 1), (3, 6), (5, 120)];

/// Maximum recursion depth before a submission is considered to recurse
/// without bound. Deep enough for any sensible `factorial`, shallow enough to
/// fail fast.
pub const MAX_CALL_DEPTH: usize = 64;

/// Operation budget for a single invocation of the submitted function. A
/// non-recursive infinite loop trips this long before the wall clock does.
pub const MAX_OPERATIONS: u64 = 1_000_000;

/// Wall-clock budget for a single grading call, enforced from the engine's
/// progress callback as a backstop to [`MAX_OPERATIONS`].
pub const EVAL_TIMEOUT: Duration = Duration::from_secs(5);

/// Placeholder shown in the editor before the student types anything.
pub const STARTER_CODE: &str = "fn factorial(n) {\n    // write your code here\n}\n";

/// System message that frames the AI tutor as Socratic: questions and hints,
/// never answers.
pub const SYSTEM_MESSAGE: &str = include_str!("prompts/system_message.md");

/// System message for evaluating a student's explanation of their solution:
/// check base case, recursive case, and combination, then praise or question.
pub const REFLECTION_MESSAGE: &str = include_str!("prompts/reflection_message.md");

/// Hint snippet explaining base cases.
pub const BASE_CASE_SNIPPET: &str = include_str!("snippets/base_case.md");

/// Hint snippet explaining recursive cases.
pub const RECURSIVE_CASE_SNIPPET: &str = include_str!("snippets/recursive_case.md");

/// Hint snippet on trusting the recursive call.
pub const TRUST_RECURSION_SNIPPET: &str = include_str!("snippets/trust_recursion.md");
