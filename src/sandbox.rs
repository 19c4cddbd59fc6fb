#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::time::Instant;

use rhai::{AST, CallFnOptions, Dynamic, Engine, EvalAltResult, FnPtr, Scope};

use crate::constants::{EVAL_TIMEOUT, MAX_CALL_DEPTH, MAX_OPERATIONS};

/// A problem that prevents any test case from running: the submission failed
/// to load, or no usable callable was found. Surfaced verbatim to the caller.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SetupError {
    /// The source failed to parse, or its top-level statements faulted while
    /// being loaded.
    #[error("Error loading code: {0}")]
    Load(String),
    /// Nothing named after the expected function exists in the submission.
    #[error("No function named '{0}' found. Define: fn {0}(n) {{ ... }}")]
    MissingFunction(String),
    /// Something with the expected name exists, but it cannot be called.
    #[error("'{0}' is defined but is not a function")]
    NotCallable(String),
}

/// A fault raised while invoking the submitted function for a single test
/// case. Never propagates to the caller as a panic or an `Err` from grading;
/// each fault becomes a report entry.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub enum ExecutionFault {
    /// Recursion exceeded the safety depth.
    #[error("recursion exceeded the safety depth")]
    UnboundedRecursion,
    /// The operation or wall-clock budget was exhausted.
    #[error("execution budget exhausted")]
    OutOfBudget,
    /// Any other runtime fault, with its message.
    #[error("{0}")]
    Runtime(String),
}

impl ExecutionFault {
    /// Maps an engine fault onto the grading taxonomy.
    fn classify(fault: &EvalAltResult) -> Self {
        match fault {
            EvalAltResult::ErrorStackOverflow(_) => Self::UnboundedRecursion,
            EvalAltResult::ErrorTooManyOperations(_) | EvalAltResult::ErrorTerminated(..) => {
                Self::OutOfBudget
            }
            other => Self::Runtime(other.to_string()),
        }
    }
}

/// How the submission's entry point is reached: a script `fn` definition, or
/// a function pointer (closure) bound to the expected name at load time.
#[derive(Clone)]
enum Callable {
    /// A script function defined with `fn`.
    Named(String),
    /// A function pointer left in the evaluation scope.
    Ptr(FnPtr),
}

/// An isolated, disposable evaluation scope for one grading call.
///
/// The engine carries hard limits so untrusted submissions cannot take the
/// process down: a recursion-depth cap (surfaces as
/// [`ExecutionFault::UnboundedRecursion`]), an operation budget, and a
/// wall-clock deadline enforced from the progress callback. A `Sandbox` is
/// built per grading call and discarded afterwards; nothing the submission
/// does persists across calls.
pub struct Sandbox {
    /// The limited engine used for compiling, loading, and invoking.
    engine: Engine,
}

impl Sandbox {
    /// Creates a sandbox whose wall-clock budget starts counting now.
    pub fn new() -> Self {
        let mut engine = Engine::new();
        engine.set_max_call_levels(MAX_CALL_DEPTH);
        engine.set_max_operations(MAX_OPERATIONS);
        engine.set_max_expr_depths(64, 64);

        let deadline = Instant::now() + EVAL_TIMEOUT;
        engine.on_progress(move |_| {
            if Instant::now() >= deadline {
                Some("wall-clock budget exhausted".into())
            } else {
                None
            }
        });

        Self { engine }
    }

    /// Compiles `source`, runs its top-level statements in a fresh scope, and
    /// locates a callable bound to `fn_name`.
    ///
    /// Module-level code runs exactly once, here; invoking the submission per
    /// test case does not re-run it. Empty or whitespace-only source compiles
    /// to an empty program and reports [`SetupError::MissingFunction`].
    pub fn load(&self, source: &str, fn_name: &str) -> Result<Submission<'_>, SetupError> {
        let ast = self
            .engine
            .compile(source)
            .map_err(|e| SetupError::Load(e.to_string()))?;

        let mut scope = Scope::new();
        self.engine
            .run_ast_with_scope(&mut scope, &ast)
            .map_err(|e| SetupError::Load(e.to_string()))?;

        let callable = if ast.iter_functions().any(|f| f.name == fn_name) {
            Callable::Named(fn_name.to_string())
        } else if let Some(ptr) = scope.get_value::<FnPtr>(fn_name) {
            Callable::Ptr(ptr)
        } else if scope.contains(fn_name) {
            return Err(SetupError::NotCallable(fn_name.to_string()));
        } else {
            return Err(SetupError::MissingFunction(fn_name.to_string()));
        };

        Ok(Submission {
            engine: &self.engine,
            ast,
            scope,
            callable,
        })
    }
}

impl Default for Sandbox {
    fn default() -> Self {
        Self::new()
    }
}

/// A loaded submission, ready to be invoked once per test case.
pub struct Submission<'e> {
    /// The sandbox engine the submission was loaded with.
    engine: &'e Engine,
    /// The compiled program.
    ast: AST,
    /// Scope state left behind by the top-level statements.
    scope: Scope<'static>,
    /// The entry point located at load time.
    callable: Callable,
}

impl Submission<'_> {
    /// Invokes the submission's entry point with a single integer argument.
    ///
    /// Each invocation works on a clone of the loaded scope, so one test case
    /// cannot observe state another left behind. Engine faults are classified
    /// into the grading taxonomy rather than propagated.
    pub fn invoke(&self, input: i64) -> Result<Dynamic, ExecutionFault> {
        let mut scope = self.scope.clone();

        let result = match &self.callable {
            Callable::Named(name) => {
                let options = CallFnOptions::new().eval_ast(false).rewind_scope(true);
                self.engine
                    .call_fn_with_options::<Dynamic>(options, &mut scope, &self.ast, name, (input,))
            }
            Callable::Ptr(ptr) => ptr.call::<Dynamic>(self.engine, &self.ast, (input,)),
        };

        result.map_err(|e| ExecutionFault::classify(&e))
    }
}
