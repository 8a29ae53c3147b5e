//! Scenario Runner - orchestrates scenario execution against the registry.
//!
//! The runner follows a per-scenario pipeline:
//! 1. **Resolve**: look up the generator for the scenario's module id.
//! 2. **Invoke**: call the external generator with the configuration.
//! 3. **Reconcile**: diff the normalized actual path set against the oracle.
//! 4. **Classify**: pass, fail (reconciliation mismatch), or error
//!    (infrastructure fault - unknown module, generator failure, timeout).
//!
//! A failed assertion and an errored scenario are distinct outcomes: the
//! first means the generator produced the wrong files, the second means the
//! harness could not observe the generator at all. Errors are caught at this
//! boundary; no scenario aborts its siblings.
//!
//! Scenarios are mutually independent and immutable, so `workers > 1` runs
//! them on a bounded pool of scoped threads. Results always report in the
//! suite's declared order regardless of completion order.

use std::collections::BTreeSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::config::{Scenario, TestSuite};
use crate::error::HarnessError;
use crate::reconcile::{normalize_path, reconcile, ReconciliationResult};
use crate::registry::ModuleRegistry;
use crate::report::SuiteReport;
use crate::rules::default_rules;

/// Execution settings for a suite run.
pub struct RunConfig {
    /// Diagnostic mode: also derive the rule-based expectation and attach a
    /// warning (never a failure) when the declared fixture disagrees.
    pub check_rules: bool,
    /// Bounded worker count; 1 means sequential execution.
    pub workers: usize,
    /// Run-level deadline. Scenarios unstarted at the deadline are reported
    /// as errored (timeout), never silently dropped; in-flight scenarios
    /// complete normally.
    pub timeout: Option<Duration>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            check_rules: false,
            workers: 1,
            timeout: None,
        }
    }
}

/// The verdict for one executed scenario.
#[derive(Debug)]
pub enum ScenarioOutcome {
    /// Expected and actual sets matched exactly.
    Passed(ReconciliationResult),
    /// Reconciliation mismatch: the assertion failed.
    Failed(ReconciliationResult),
    /// Test infrastructure fault; no assertion was evaluated.
    Errored(HarnessError),
}

impl ScenarioOutcome {
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Passed(_))
    }

    pub const fn status(&self) -> &'static str {
        match self {
            Self::Passed(_) => "passed",
            Self::Failed(_) => "failed",
            Self::Errored(_) => "errored",
        }
    }

    pub fn reconciliation(&self) -> Option<&ReconciliationResult> {
        match self {
            Self::Passed(r) | Self::Failed(r) => Some(r),
            Self::Errored(_) => None,
        }
    }

    pub fn error(&self) -> Option<&HarnessError> {
        match self {
            Self::Errored(e) => Some(e),
            _ => None,
        }
    }
}

impl Serialize for ScenarioOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ScenarioOutcome", 2)?;
        state.serialize_field("status", self.status())?;
        match self {
            Self::Passed(r) | Self::Failed(r) => {
                state.serialize_field("reconciliation", r)?;
            }
            Self::Errored(e) => {
                state.serialize_field("error", &e.to_string())?;
            }
        }
        state.end()
    }
}

/// One scenario's entry in the suite report.
#[derive(Debug, Serialize)]
pub struct ScenarioReport {
    pub name: String,
    pub outcome: ScenarioOutcome,
    /// Diagnostic-mode note, e.g. fixture drift against the rule-derived set.
    pub warning: Option<String>,
}

// =============================================================================
// SINGLE-SCENARIO EXECUTION
// =============================================================================

/// Executes one scenario and produces its report entry.
pub fn run_scenario(
    scenario: &Scenario,
    registry: &ModuleRegistry,
    config: &RunConfig,
) -> ScenarioReport {
    let outcome = match execute_scenario(scenario, registry) {
        Ok(result) if result.passed => ScenarioOutcome::Passed(result),
        Ok(result) => ScenarioOutcome::Failed(result),
        Err(error) => ScenarioOutcome::Errored(error),
    };
    let warning = if config.check_rules {
        rule_drift_warning(scenario)
    } else {
        None
    };
    ScenarioReport {
        name: scenario.name.clone(),
        outcome,
        warning,
    }
}

fn execute_scenario(
    scenario: &Scenario,
    registry: &ModuleRegistry,
) -> Result<ReconciliationResult, HarnessError> {
    let generator = registry.resolve(&scenario.config.module_id)?;

    let produced = invoke_generator(scenario, || generator.generate(&scenario.config))?;
    let actual: BTreeSet<String> = produced.iter().map(|p| normalize_path(p)).collect();

    // A disabled module must produce nothing; its declared expectedFiles are
    // overridden by the empty oracle. This is an explicit state, distinct
    // from a misconfigured module producing wrong files.
    let expected = if scenario.config.enabled {
        scenario.expected_set()
    } else {
        BTreeSet::new()
    };

    Ok(reconcile(&expected, &actual))
}

/// Calls the external generator, converting a panic into a generator error
/// so one misbehaving generator cannot take down the rest of the suite.
fn invoke_generator<F>(scenario: &Scenario, call: F) -> Result<BTreeSet<String>, HarnessError>
where
    F: FnOnce() -> Result<BTreeSet<String>, HarnessError>,
{
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(result) => result,
        Err(payload) => Err(HarnessError::generator(
            scenario.config.module_id.clone(),
            panic_message(&*payload),
        )),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("generator panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("generator panicked: {}", s)
    } else {
        "generator panicked".to_string()
    }
}

/// Compares the scenario's oracle against the rule-derived expectation.
///
/// Disagreement surfaces stale fixtures without making the rule engine the
/// source of truth, so the result is a warning, never a failure. Derivation
/// errors (e.g. a module type with no rule set) are also warnings here.
fn rule_drift_warning(scenario: &Scenario) -> Option<String> {
    let oracle = if scenario.config.enabled {
        scenario.expected_set()
    } else {
        BTreeSet::new()
    };
    match default_rules().derive_expected(&scenario.config) {
        Ok(derived) if derived == oracle => None,
        Ok(derived) => Some(format!(
            "declared expectedFiles disagree with rule-derived set (declared: [{}]; derived: [{}])",
            join(&oracle),
            join(&derived),
        )),
        Err(e) => Some(format!("rule derivation unavailable: {}", e)),
    }
}

fn join(paths: &BTreeSet<String>) -> String {
    paths.iter().cloned().collect::<Vec<_>>().join(", ")
}

// =============================================================================
// SUITE EXECUTION
// =============================================================================

/// Runs every scenario in the suite and aggregates a report in declared
/// order. The run always completes with one outcome per declared scenario;
/// it never exits early on first failure.
pub fn run_suite(suite: &TestSuite, registry: &ModuleRegistry, config: &RunConfig) -> SuiteReport {
    let deadline = config.timeout.map(|t| Instant::now() + t);
    let scenarios = if config.workers > 1 && suite.scenarios.len() > 1 {
        run_parallel(&suite.scenarios, registry, config, deadline)
    } else {
        run_sequential(&suite.scenarios, registry, config, deadline)
    };
    SuiteReport {
        module_id: suite.module_id.clone(),
        module_name: suite.module_name.clone(),
        scenarios,
    }
}

fn timed_out(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|d| Instant::now() >= d)
}

fn timeout_report(scenario: &Scenario) -> ScenarioReport {
    ScenarioReport {
        name: scenario.name.clone(),
        outcome: ScenarioOutcome::Errored(HarnessError::Timeout {
            name: scenario.name.clone(),
        }),
        warning: None,
    }
}

fn run_sequential(
    scenarios: &[Scenario],
    registry: &ModuleRegistry,
    config: &RunConfig,
    deadline: Option<Instant>,
) -> Vec<ScenarioReport> {
    scenarios
        .iter()
        .map(|scenario| {
            if timed_out(deadline) {
                timeout_report(scenario)
            } else {
                run_scenario(scenario, registry, config)
            }
        })
        .collect()
}

/// Bounded worker pool over scoped threads.
///
/// Workers claim scenarios by atomic index and send `(index, report)` pairs
/// back over a channel; the merge is commutative, so completion order does
/// not matter. Each slot is filled exactly once per declared scenario.
fn run_parallel(
    scenarios: &[Scenario],
    registry: &ModuleRegistry,
    config: &RunConfig,
    deadline: Option<Instant>,
) -> Vec<ScenarioReport> {
    let worker_count = config.workers.min(scenarios.len());
    let next = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel::<(usize, ScenarioReport)>();

    thread::scope(|scope| {
        for _ in 0..worker_count {
            let tx = tx.clone();
            let next = &next;
            scope.spawn(move || loop {
                let index = next.fetch_add(1, Ordering::SeqCst);
                if index >= scenarios.len() {
                    break;
                }
                let scenario = &scenarios[index];
                let report = if timed_out(deadline) {
                    timeout_report(scenario)
                } else {
                    run_scenario(scenario, registry, config)
                };
                if tx.send((index, report)).is_err() {
                    break;
                }
            });
        }
    });
    drop(tx);

    let mut slots: Vec<Option<ScenarioReport>> = scenarios.iter().map(|_| None).collect();
    for (index, report) in rx.try_iter() {
        slots[index] = Some(report);
    }
    slots
        .into_iter()
        .zip(scenarios)
        .map(|(slot, scenario)| {
            slot.unwrap_or_else(|| ScenarioReport {
                name: scenario.name.clone(),
                outcome: ScenarioOutcome::Errored(HarnessError::internal(
                    "worker terminated before reporting",
                )),
                warning: None,
            })
        })
        .collect()
}
