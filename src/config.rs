//! Configuration Model - typed fixture data for the harness.
//!
//! These types are the pure data contract: a module configuration, a scenario
//! pairing that configuration with its expected output-file set, and a suite
//! grouping scenarios. All of them are constructed once per declared fixture
//! and consumed read-only for the lifetime of a run; nothing in this module
//! performs I/O or holds mutable state.
//!
//! Field names follow the authored suite format (`moduleId`, `fieldValues`,
//! `expectedFiles`, ...), so fixtures deserialize without a translation step.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::HarnessError;
use crate::reconcile::normalize_path;

/// A single configuration field value.
///
/// Unknown keys pass through untouched; cross-type validation of keys is the
/// generator's responsibility, not the harness's.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl FieldValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(n) => write!(f, "{}", n),
            Self::Float(x) => write!(f, "{}", x),
            Self::Str(s) => write!(f, "{}", s),
        }
    }
}

/// The kind of module a configuration describes.
///
/// Suites authored for kinds this harness does not know yet still deserialize;
/// they land in [`ModuleKind::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleKind {
    Extension,
    #[serde(other)]
    Other,
}

/// Declarative input describing what an infrastructure module generator
/// should produce.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleConfig {
    pub module_id: String,
    pub kind: ModuleKind,
    #[serde(rename = "type")]
    pub module_type: String,
    #[serde(default)]
    pub layers: Vec<String>,
    pub enabled: bool,
    #[serde(default)]
    pub field_values: BTreeMap<String, FieldValue>,
}

impl ModuleConfig {
    /// Reads a boolean feature flag from `field_values`.
    ///
    /// A missing key is `false` (absent means disabled); a key present with a
    /// non-boolean value is a configuration error, since the fixture is then
    /// ambiguous about whether the feature is on.
    pub fn flag(&self, key: &str) -> Result<bool, HarnessError> {
        match self.field_values.get(key) {
            None => Ok(false),
            Some(FieldValue::Bool(b)) => Ok(*b),
            Some(other) => Err(HarnessError::configuration(format!(
                "flag '{}' must be a boolean, got '{}'",
                key, other
            ))),
        }
    }

    /// Reads a string-valued field, if present and string-typed.
    pub fn string_field(&self, key: &str) -> Option<&str> {
        self.field_values.get(key).and_then(FieldValue::as_str)
    }

    /// Checks the configuration's structural invariants.
    pub fn validate(&self) -> Result<(), HarnessError> {
        if self.module_id.is_empty() {
            return Err(HarnessError::invalid("moduleId must be non-empty"));
        }
        if self.enabled && self.layers.is_empty() {
            return Err(HarnessError::invalid(format!(
                "enabled module '{}' must target at least one layer",
                self.module_id
            )));
        }
        Ok(())
    }
}

/// One named test case: a module configuration paired with the exact set of
/// files the generator must produce for it.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub config: ModuleConfig,
    #[serde(default)]
    pub expected_files: Vec<String>,
}

impl Scenario {
    /// The declared expectation as a normalized path set.
    pub fn expected_set(&self) -> BTreeSet<String> {
        self.expected_files
            .iter()
            .map(|p| normalize_path(p))
            .collect()
    }

    /// Checks scenario invariants: a valid config and no duplicate paths
    /// (after normalization) in `expected_files`.
    pub fn validate(&self) -> Result<(), HarnessError> {
        if self.name.is_empty() {
            return Err(HarnessError::invalid("scenario name must be non-empty"));
        }
        self.config.validate()?;
        let mut seen = BTreeSet::new();
        for path in &self.expected_files {
            if !seen.insert(normalize_path(path)) {
                return Err(HarnessError::invalid(format!(
                    "scenario '{}' declares duplicate expected path '{}'",
                    self.name, path
                )));
            }
        }
        Ok(())
    }
}

/// An ordered collection of scenarios, loaded once at startup and never
/// mutated.
///
/// The suite-level `module_id` groups scenarios conceptually; each scenario's
/// own `config.module_id` may differ (one suite may cover several sibling
/// modules), so nothing in the harness assumes the two are equal.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSuite {
    pub module_id: String,
    pub module_name: String,
    #[serde(default)]
    pub scenarios: Vec<Scenario>,
}

impl TestSuite {
    /// Checks suite invariants: every scenario valid, names unique.
    pub fn validate(&self) -> Result<(), HarnessError> {
        let mut names = BTreeSet::new();
        for scenario in &self.scenarios {
            scenario.validate()?;
            if !names.insert(scenario.name.as_str()) {
                return Err(HarnessError::invalid(format!(
                    "duplicate scenario name '{}' in suite '{}'",
                    scenario.name, self.module_id
                )));
            }
        }
        Ok(())
    }
}
