//! Modcheck Error Handling - Unified Harness Error Type
//!
//! Every failure mode in the harness is represented by [`HarnessError`]. The
//! taxonomy mirrors the scenario lifecycle: configuration classification,
//! registry resolution, generator invocation, scheduling, and suite loading.
//! A reconciliation mismatch is *not* an error - it is a data result carried
//! by `ReconciliationResult` with `passed = false`.
//!
//! Propagation policy: all per-scenario errors are caught at the runner
//! boundary and converted into a per-scenario `Errored` outcome. No single
//! scenario's failure may abort sibling scenarios or corrupt the aggregate
//! report.

use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all harness failure modes.
#[derive(Debug, Error, Diagnostic)]
pub enum HarnessError {
    /// The rule evaluator cannot classify a field combination into an
    /// artifact set. Fatal to the scenario, not to the suite.
    #[error("configuration error: {message}")]
    #[diagnostic(code(modcheck::rules::configuration))]
    Configuration { message: String },

    /// No generator is registered for the requested module id.
    #[error("no generator registered for module '{module_id}'")]
    #[diagnostic(
        code(modcheck::registry::unknown_module),
        help("register a generator for this module id before running the suite")
    )]
    Registry { module_id: String },

    /// The external generator returned an error or panicked.
    #[error("generator for module '{module_id}' failed: {message}")]
    #[diagnostic(code(modcheck::generator::failed))]
    Generator { module_id: String, message: String },

    /// The scenario was still unstarted when the run-level deadline passed.
    #[error("scenario '{name}' was not started before the run deadline")]
    #[diagnostic(code(modcheck::runner::timeout))]
    Timeout { name: String },

    /// A suite file could not be read or deserialized.
    #[error("suite file '{path}' could not be loaded: {message}")]
    #[diagnostic(code(modcheck::suite::load))]
    Suite { path: String, message: String },

    /// A fixture violated a data-model invariant at load time.
    #[error("invalid fixture: {message}")]
    #[diagnostic(code(modcheck::suite::invalid))]
    Invalid { message: String },

    /// Harness-internal failure. Indicates a harness bug, not a bad fixture.
    #[error("internal harness error: {message}")]
    #[diagnostic(
        code(modcheck::internal),
        help("this is an internal harness error; please report it as a bug")
    )]
    Internal { message: String },
}

impl HarnessError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn registry(module_id: impl Into<String>) -> Self {
        Self::Registry {
            module_id: module_id.into(),
        }
    }

    pub fn generator(module_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Generator {
            module_id: module_id.into(),
            message: message.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Stable category name used by reporting and test assertions.
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "configuration",
            Self::Registry { .. } => "registry",
            Self::Generator { .. } => "generator",
            Self::Timeout { .. } => "timeout",
            Self::Suite { .. } => "suite",
            Self::Invalid { .. } => "invalid",
            Self::Internal { .. } => "internal",
        }
    }
}

/// Prints a HarnessError with full miette diagnostics.
///
/// Use this for user-facing error display; it renders the diagnostic code
/// and help text alongside the message.
pub fn print_error(error: HarnessError) {
    use miette::Report;
    let report = Report::new(error);
    eprintln!("{report:?}");
}
