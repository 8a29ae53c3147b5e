//! Scenario-runner integration tests: verdict classification, error
//! containment, concurrency, and timeout behavior.

mod common;

use std::collections::BTreeSet;
use std::time::Duration;

use common::{database_config, load_rdbms_suite, paths, scenario_named};
use modcheck::runner::{run_scenario, run_suite, RunConfig};
use modcheck::{HarnessError, ModuleRegistry, Scenario, TestSuite};

/// Registers a generator that reports a fixed path set for a module id.
fn register_fixed(registry: &mut ModuleRegistry, module_id: &str, output: &[&str]) {
    let output = paths(output);
    registry.register_fn(module_id, move |_config| Ok(output.clone()));
}

fn single_scenario_suite(scenario: Scenario) -> TestSuite {
    TestSuite {
        module_id: "extension-rdbms".into(),
        module_name: "RDBMS Database Configuration".into(),
        scenarios: vec![scenario],
    }
}

#[cfg(test)]
mod verdicts {
    use super::*;

    #[test]
    fn postgresql_basic_passes_on_exact_output() {
        let suite = load_rdbms_suite();
        let scenario = scenario_named(&suite, "postgresql-basic");
        let mut registry = ModuleRegistry::new();
        register_fixed(
            &mut registry,
            "db-postgres",
            &[
                "ops/database/postgresql-config.yaml",
                "ops/database/backup-policy.yaml",
            ],
        );

        let report = run_scenario(&scenario, &registry, &RunConfig::default());
        assert!(report.outcome.is_pass(), "outcome: {:?}", report.outcome);
    }

    #[test]
    fn mysql_missing_replication_file_fails() {
        let suite = load_rdbms_suite();
        let scenario = scenario_named(&suite, "mysql-with-replication");
        let mut registry = ModuleRegistry::new();
        register_fixed(
            &mut registry,
            "db-mysql",
            &[
                "ops/database/mysql-config.yaml",
                "ops/database/backup-policy.yaml",
            ],
        );

        let report = run_scenario(&scenario, &registry, &RunConfig::default());
        let result = report.outcome.reconciliation().expect("reconciled");
        assert!(!result.passed);
        assert_eq!(
            result.missing,
            paths(&["ops/database/replication-config.yaml"])
        );
        assert!(result.unexpected.is_empty());
    }

    #[test]
    fn mongodb_extra_legacy_file_is_unexpected() {
        let suite = load_rdbms_suite();
        let scenario = scenario_named(&suite, "mongodb-cluster");
        let mut registry = ModuleRegistry::new();
        register_fixed(
            &mut registry,
            "db-mongo",
            &[
                "ops/database/mongodb-config.yaml",
                "ops/database/sharding-config.yaml",
                "ops/database/legacy.yaml",
            ],
        );

        let report = run_scenario(&scenario, &registry, &RunConfig::default());
        let result = report.outcome.reconciliation().expect("reconciled");
        assert!(!result.passed);
        assert_eq!(result.unexpected, paths(&["ops/database/legacy.yaml"]));
        assert_eq!(
            result.matched,
            paths(&[
                "ops/database/mongodb-config.yaml",
                "ops/database/sharding-config.yaml"
            ])
        );
    }

    #[test]
    fn generator_output_is_normalized_before_comparison() {
        let suite = load_rdbms_suite();
        let scenario = scenario_named(&suite, "postgresql-basic");
        let mut registry = ModuleRegistry::new();
        register_fixed(
            &mut registry,
            "db-postgres",
            &[
                ".\\ops\\database\\postgresql-config.yaml",
                "./ops//database/backup-policy.yaml",
            ],
        );

        let report = run_scenario(&scenario, &registry, &RunConfig::default());
        assert!(report.outcome.is_pass());
    }
}

#[cfg(test)]
mod disabled_modules {
    use super::*;
    use modcheck::FieldValue;

    fn disabled_scenario() -> Scenario {
        let mut config = database_config(
            "db-postgres",
            &[("databaseType", FieldValue::Str("postgresql".into()))],
        );
        config.enabled = false;
        Scenario {
            name: "postgresql-disabled".into(),
            description: "disabled module must produce nothing".into(),
            config,
            // Deliberately non-empty: the empty oracle must win.
            expected_files: vec!["ops/database/postgresql-config.yaml".into()],
        }
    }

    #[test]
    fn disabled_module_with_no_output_passes() {
        let mut registry = ModuleRegistry::new();
        register_fixed(&mut registry, "db-postgres", &[]);
        let report = run_scenario(&disabled_scenario(), &registry, &RunConfig::default());
        assert!(report.outcome.is_pass());
    }

    #[test]
    fn disabled_module_producing_files_fails() {
        let mut registry = ModuleRegistry::new();
        register_fixed(
            &mut registry,
            "db-postgres",
            &["ops/database/postgresql-config.yaml"],
        );
        let report = run_scenario(&disabled_scenario(), &registry, &RunConfig::default());
        let result = report.outcome.reconciliation().expect("reconciled");
        assert!(!result.passed);
        assert_eq!(
            result.unexpected,
            paths(&["ops/database/postgresql-config.yaml"])
        );
    }
}

#[cfg(test)]
mod error_containment {
    use super::*;

    #[test]
    fn unresolved_module_errors_without_aborting_siblings() {
        let suite = load_rdbms_suite();
        let mut registry = ModuleRegistry::new();
        // db-postgres missing on purpose; the other two behave.
        register_fixed(
            &mut registry,
            "db-mysql",
            &[
                "ops/database/mysql-config.yaml",
                "ops/database/backup-policy.yaml",
                "ops/database/replication-config.yaml",
            ],
        );
        register_fixed(
            &mut registry,
            "db-mongo",
            &[
                "ops/database/mongodb-config.yaml",
                "ops/database/sharding-config.yaml",
            ],
        );

        let report = run_suite(&suite, &registry, &RunConfig::default());
        assert_eq!(report.scenarios.len(), 3);
        assert_eq!(report.scenarios[0].outcome.status(), "errored");
        assert_eq!(
            report.scenarios[0].outcome.error().map(|e| e.category()),
            Some("registry")
        );
        assert_eq!(report.scenarios[1].outcome.status(), "passed");
        assert_eq!(report.scenarios[2].outcome.status(), "passed");
        assert!(!report.success());
    }

    #[test]
    fn generator_error_becomes_an_errored_scenario() {
        let suite = load_rdbms_suite();
        let scenario = scenario_named(&suite, "postgresql-basic");
        let mut registry = ModuleRegistry::new();
        registry.register_fn("db-postgres", |config| {
            Err(HarnessError::generator(
                config.module_id.clone(),
                "disk full",
            ))
        });

        let report = run_scenario(&scenario, &registry, &RunConfig::default());
        let error = report.outcome.error().expect("errored");
        assert_eq!(error.category(), "generator");
        assert!(error.to_string().contains("disk full"));
    }

    #[test]
    fn generator_panic_is_caught_at_the_invocation_boundary() {
        let suite = load_rdbms_suite();
        let scenario = scenario_named(&suite, "postgresql-basic");
        let mut registry = ModuleRegistry::new();
        registry.register_fn(
            "db-postgres",
            |_config| -> Result<BTreeSet<String>, HarnessError> {
                panic!("generator bug");
            },
        );

        let report = run_scenario(&scenario, &registry, &RunConfig::default());
        let error = report.outcome.error().expect("errored");
        assert_eq!(error.category(), "generator");
        assert!(error.to_string().contains("generator bug"));
    }
}

#[cfg(test)]
mod scheduling {
    use super::*;

    fn full_registry() -> ModuleRegistry {
        let mut registry = ModuleRegistry::new();
        register_fixed(
            &mut registry,
            "db-postgres",
            &[
                "ops/database/postgresql-config.yaml",
                "ops/database/backup-policy.yaml",
            ],
        );
        register_fixed(
            &mut registry,
            "db-mysql",
            &["ops/database/mysql-config.yaml"],
        );
        register_fixed(
            &mut registry,
            "db-mongo",
            &[
                "ops/database/mongodb-config.yaml",
                "ops/database/sharding-config.yaml",
            ],
        );
        registry
    }

    #[test]
    fn parallel_run_matches_sequential_in_declared_order() {
        let suite = load_rdbms_suite();
        let registry = full_registry();

        let sequential = run_suite(&suite, &registry, &RunConfig::default());
        let parallel = run_suite(
            &suite,
            &registry,
            &RunConfig {
                workers: 4,
                ..RunConfig::default()
            },
        );

        assert_eq!(sequential.scenarios.len(), parallel.scenarios.len());
        for (a, b) in sequential.scenarios.iter().zip(&parallel.scenarios) {
            assert_eq!(a.name, b.name);
            assert_eq!(a.outcome.status(), b.outcome.status());
        }
    }

    #[test]
    fn expired_deadline_reports_every_unstarted_scenario_as_timeout() {
        let suite = load_rdbms_suite();
        let registry = full_registry();
        let config = RunConfig {
            timeout: Some(Duration::ZERO),
            ..RunConfig::default()
        };

        let report = run_suite(&suite, &registry, &config);
        assert_eq!(report.scenarios.len(), suite.scenarios.len());
        for scenario in &report.scenarios {
            assert_eq!(
                scenario.outcome.error().map(|e| e.category()),
                Some("timeout"),
                "scenario '{}' must be reported, not dropped",
                scenario.name
            );
        }
    }
}

#[cfg(test)]
mod diagnostics {
    use super::*;

    #[test]
    fn stale_fixture_gets_a_warning_not_a_failure() {
        // The mongodb fixture enables backups but does not declare the
        // backup-policy artifact, so the rule-derived set disagrees.
        let suite = load_rdbms_suite();
        let scenario = scenario_named(&suite, "mongodb-cluster");
        let mut registry = ModuleRegistry::new();
        register_fixed(
            &mut registry,
            "db-mongo",
            &[
                "ops/database/mongodb-config.yaml",
                "ops/database/sharding-config.yaml",
            ],
        );

        let config = RunConfig {
            check_rules: true,
            ..RunConfig::default()
        };
        let report = run_scenario(&scenario, &registry, &config);
        assert!(report.outcome.is_pass(), "drift is never a failure");
        let warning = report.warning.expect("drift warning");
        assert!(warning.contains("ops/database/backup-policy.yaml"));
    }

    #[test]
    fn consistent_fixture_gets_no_warning() {
        let suite = load_rdbms_suite();
        let scenario = scenario_named(&suite, "postgresql-basic");
        let mut registry = ModuleRegistry::new();
        register_fixed(
            &mut registry,
            "db-postgres",
            &[
                "ops/database/postgresql-config.yaml",
                "ops/database/backup-policy.yaml",
            ],
        );

        let config = RunConfig {
            check_rules: true,
            ..RunConfig::default()
        };
        let report = run_scenario(&scenario, &registry, &config);
        assert!(report.outcome.is_pass());
        assert_eq!(report.warning, None);
    }
}

// One scenario suite helper is exercised here to keep suite-level plumbing
// covered without duplicating the fixture.
#[test]
fn suite_success_requires_every_scenario_to_pass() {
    let suite = load_rdbms_suite();
    let scenario = scenario_named(&suite, "postgresql-basic");
    let mut registry = ModuleRegistry::new();
    register_fixed(&mut registry, "db-postgres", &[]);

    let report = run_suite(
        &single_scenario_suite(scenario),
        &registry,
        &RunConfig::default(),
    );
    assert_eq!(report.failed_count(), 1);
    assert!(!report.success());
}
