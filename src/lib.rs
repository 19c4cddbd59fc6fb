//! # didact
//!
//! An interactive recursion tutor: students write a Rhai `factorial`
//! function, the grader runs it against fixed test cases inside a disposable
//! sandbox, and a hint service offers Socratic guidance grounded in the
//! grader's output.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Environment-sourced configuration for the hint service
pub mod config;
/// A module defining a bunch of constant values to be used throughout
pub mod constants;
/// For all things related to grading submissions
pub mod grade;
/// The isolated, disposable evaluation scope submissions run in
pub mod sandbox;
/// The HTTP surface: tutoring page, grading and hint endpoints
pub mod server;
/// The built-in dictionary of hint snippets
pub mod snippets;
/// The Socratic hint service and its conversation state
pub mod tutor;

pub use grade::{CaseGrader, CaseOutcome, CaseResult, GradeReport, TestCase, grade, grade_to_text};
pub use sandbox::{ExecutionFault, Sandbox, SetupError, Submission};
pub use tutor::{Conversation, Tutor};
