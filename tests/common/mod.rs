//! Shared fixtures and helpers for the integration tests.
#![allow(dead_code)] // not every test binary uses every helper

use std::collections::BTreeSet;
use std::path::Path;

use modcheck::discovery::load_suite;
use modcheck::{FieldValue, ModuleConfig, ModuleKind, Scenario, TestSuite};

pub const FIXTURE_SUITE: &str = "tests/fixtures/rdbms-suite.yaml";

pub fn load_rdbms_suite() -> TestSuite {
    load_suite(Path::new(FIXTURE_SUITE)).expect("fixture suite must load")
}

pub fn scenario_named(suite: &TestSuite, name: &str) -> Scenario {
    suite
        .scenarios
        .iter()
        .find(|s| s.name == name)
        .unwrap_or_else(|| panic!("no scenario named '{}' in fixture", name))
        .clone()
}

pub fn paths(entries: &[&str]) -> BTreeSet<String> {
    entries.iter().map(|p| p.to_string()).collect()
}

pub fn database_config(module_id: &str, fields: &[(&str, FieldValue)]) -> ModuleConfig {
    ModuleConfig {
        module_id: module_id.into(),
        kind: ModuleKind::Extension,
        module_type: "database".into(),
        layers: vec!["ops".into()],
        enabled: true,
        field_values: fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect(),
    }
}
