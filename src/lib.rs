//! Modcheck: a contract-validation harness for declarative infrastructure
//! module generators.
//!
//! Given a module configuration (a module type, field values, and target
//! deployment layers), a generation engine is expected to emit a
//! deterministic set of output artifacts. Modcheck defines *scenarios* -
//! configuration inputs paired with the exact file set that must result -
//! and verifies that the generator's actual output matches exactly.
//!
//! # Architecture
//!
//! Execution follows a phase-based model per scenario:
//! 1. **Loading**: deserialize and validate a suite fixture ([`discovery`])
//! 2. **Resolution**: look up the module's generator ([`registry`])
//! 3. **Invocation**: call the external generator with the configuration
//! 4. **Reconciliation**: diff actual against expected path sets
//!    ([`reconcile`]), optionally cross-checked against the conditional rule
//!    evaluator ([`rules`])
//! 5. **Reporting**: aggregate per-scenario verdicts into a suite report
//!    ([`report`])
//!
//! Only path presence is asserted; file content is out of scope. The
//! generator and the filesystem are external collaborators consumed at
//! their interfaces.

pub mod config;
pub mod discovery;
pub mod error;
pub mod reconcile;
pub mod registry;
pub mod report;
pub mod rules;
pub mod runner;

pub use crate::config::{FieldValue, ModuleConfig, ModuleKind, Scenario, TestSuite};
pub use crate::error::HarnessError;
pub use crate::reconcile::{normalize_path, reconcile, ReconciliationResult};
pub use crate::registry::{ModuleGenerator, ModuleRegistry};
pub use crate::report::{render, ReportStyle, SuiteReport};
pub use crate::rules::{build_default_rule_registry, default_rules, RuleRegistry, RuleSet};
pub use crate::runner::{run_scenario, run_suite, RunConfig, ScenarioOutcome, ScenarioReport};
