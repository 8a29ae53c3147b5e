//! Module Registry - resolves module ids to generator implementations.
//!
//! The generation engine is an external collaborator. The harness depends
//! only on the [`ModuleGenerator`] contract: a configuration in, the set of
//! produced relative paths out. Resolution is a plain id-to-capability
//! lookup, performed once per scenario.
//!
//! Registry Invariant: the registry is populated at startup and read-only
//! for the duration of a run, which is what makes concurrent scenario
//! execution lock-free.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::config::ModuleConfig;
use crate::error::HarnessError;

/// The consumed generator contract.
///
/// `generate` reports the set of relative paths the generator produced for
/// the given configuration. The harness observes output only; it never
/// inspects how the files were written.
pub trait ModuleGenerator: Send + Sync {
    fn generate(&self, config: &ModuleConfig) -> Result<BTreeSet<String>, HarnessError>;
}

impl std::fmt::Debug for dyn ModuleGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn ModuleGenerator")
    }
}

impl<F> ModuleGenerator for F
where
    F: Fn(&ModuleConfig) -> Result<BTreeSet<String>, HarnessError> + Send + Sync,
{
    fn generate(&self, config: &ModuleConfig) -> Result<BTreeSet<String>, HarnessError> {
        self(config)
    }
}

/// Maps module ids to generators.
#[derive(Clone, Default)]
pub struct ModuleRegistry {
    generators: HashMap<String, Arc<dyn ModuleGenerator>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, module_id: impl Into<String>, generator: Arc<dyn ModuleGenerator>) {
        self.generators.insert(module_id.into(), generator);
    }

    /// Convenience for registering a closure-backed generator.
    pub fn register_fn<F>(&mut self, module_id: impl Into<String>, generator: F)
    where
        F: Fn(&ModuleConfig) -> Result<BTreeSet<String>, HarnessError> + Send + Sync + 'static,
    {
        self.register(module_id, Arc::new(generator));
    }

    /// Resolves the generator for a module id.
    pub fn resolve(&self, module_id: &str) -> Result<Arc<dyn ModuleGenerator>, HarnessError> {
        self.generators
            .get(module_id)
            .cloned()
            .ok_or_else(|| HarnessError::registry(module_id))
    }

    pub fn contains(&self, module_id: &str) -> bool {
        self.generators.contains_key(module_id)
    }

    /// Registered module ids, sorted for stable listing.
    pub fn module_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.generators.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}
