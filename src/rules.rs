//! Conditional Rule Evaluator - maps configurations to expected artifacts.
//!
//! A rule set for a module type is an ordered list of independent, pure
//! derivations: each rule looks at `field_values` and either contributes one
//! artifact path or stays silent. Because results collect into a set, rule
//! order never affects the derived expectation; scenario authors and the
//! generator may enumerate flags in any order.
//!
//! Rule Registry Invariant: rule sets are registered once in
//! [`build_default_rule_registry`] and are immutable afterwards. Never
//! construct a local/hidden registry inside evaluation code.

use std::collections::{BTreeSet, HashMap};

use once_cell::sync::Lazy;

use crate::config::ModuleConfig;
use crate::error::HarnessError;
use crate::reconcile::normalize_path;

/// A single artifact derivation: `Ok(Some(path))` when the artifact is
/// expected, `Ok(None)` when the rule does not apply, `Err` when the
/// configuration cannot be classified at all.
pub type DeriveFn = fn(&ModuleConfig) -> Result<Option<String>, HarnessError>;

/// One named conditional-artifact rule.
pub struct ArtifactRule {
    pub name: &'static str,
    pub derive: DeriveFn,
}

/// The ordered rule list for one module type.
pub struct RuleSet {
    module_type: String,
    rules: Vec<ArtifactRule>,
}

impl RuleSet {
    pub fn new(module_type: impl Into<String>) -> Self {
        Self {
            module_type: module_type.into(),
            rules: Vec::new(),
        }
    }

    pub fn module_type(&self) -> &str {
        &self.module_type
    }

    pub fn rule(mut self, name: &'static str, derive: DeriveFn) -> Self {
        self.rules.push(ArtifactRule { name, derive });
        self
    }

    /// Derives the expected artifact set for a configuration.
    ///
    /// Pure function of `module_type` and `field_values`; no I/O. A disabled
    /// module derives the empty set - disabled modules must produce nothing.
    pub fn derive_expected(&self, config: &ModuleConfig) -> Result<BTreeSet<String>, HarnessError> {
        if !config.enabled {
            return Ok(BTreeSet::new());
        }
        let mut artifacts = BTreeSet::new();
        for rule in &self.rules {
            if let Some(path) = (rule.derive)(config)? {
                artifacts.insert(normalize_path(&path));
            }
        }
        Ok(artifacts)
    }

    /// Names of the registered rules, in declaration order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name).collect()
    }
}

/// Maps a module `type` to its rule set.
pub struct RuleRegistry {
    sets: HashMap<String, RuleSet>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self {
            sets: HashMap::new(),
        }
    }

    pub fn register(&mut self, set: RuleSet) {
        self.sets.insert(set.module_type.clone(), set);
    }

    pub fn get(&self, module_type: &str) -> Option<&RuleSet> {
        self.sets.get(module_type)
    }

    /// Derives the expected artifact set via the module type's rule set.
    ///
    /// An unknown module type is a configuration error, never a silent empty
    /// set: returning nothing here would turn every divergence into a false
    /// negative.
    pub fn derive_expected(&self, config: &ModuleConfig) -> Result<BTreeSet<String>, HarnessError> {
        match self.sets.get(&config.module_type) {
            Some(set) => set.derive_expected(config),
            None => Err(HarnessError::configuration(format!(
                "no rule set registered for module type '{}'",
                config.module_type
            ))),
        }
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// BUILT-IN RULE SETS
// =============================================================================

/// Database types with a known base configuration artifact.
const DATABASE_TYPES: &[&str] = &["postgresql", "mysql", "mongodb"];

const DATABASE_DIR: &str = "ops/database";

fn database_base_config(config: &ModuleConfig) -> Result<Option<String>, HarnessError> {
    let db_type = match config.string_field("databaseType") {
        Some(s) => s,
        None => {
            return Err(HarnessError::configuration(format!(
                "module '{}' has no string 'databaseType' field",
                config.module_id
            )))
        }
    };
    if !DATABASE_TYPES.contains(&db_type) {
        return Err(HarnessError::configuration(format!(
            "unrecognized databaseType '{}' (known: {})",
            db_type,
            DATABASE_TYPES.join(", ")
        )));
    }
    Ok(Some(format!("{}/{}-config.yaml", DATABASE_DIR, db_type)))
}

fn database_backup_policy(config: &ModuleConfig) -> Result<Option<String>, HarnessError> {
    Ok(config
        .flag("enableBackups")?
        .then(|| format!("{}/backup-policy.yaml", DATABASE_DIR)))
}

// Independent of replicaCount: a replica count of 0 with the flag set is a
// generator concern, not a harness concern.
fn database_replication_config(config: &ModuleConfig) -> Result<Option<String>, HarnessError> {
    Ok(config
        .flag("enableReplication")?
        .then(|| format!("{}/replication-config.yaml", DATABASE_DIR)))
}

fn database_sharding_config(config: &ModuleConfig) -> Result<Option<String>, HarnessError> {
    Ok(config
        .flag("enableSharding")?
        .then(|| format!("{}/sharding-config.yaml", DATABASE_DIR)))
}

/// The rule set for `type: database` modules.
pub fn database_rule_set() -> RuleSet {
    RuleSet::new("database")
        .rule("base-config", database_base_config)
        .rule("backup-policy", database_backup_policy)
        .rule("replication-config", database_replication_config)
        .rule("sharding-config", database_sharding_config)
}

/// Builds the registry with all built-in rule sets registered.
pub fn build_default_rule_registry() -> RuleRegistry {
    let mut registry = RuleRegistry::new();
    registry.register(database_rule_set());
    registry
}

/// Shared, immutable default registry, built on first use.
pub fn default_rules() -> &'static RuleRegistry {
    static RULES: Lazy<RuleRegistry> = Lazy::new(build_default_rule_registry);
    &RULES
}
