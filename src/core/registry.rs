//! ProjectRegistry - the modules of the current build.
//!
//! The registry maps `g:a:v` to the module producing it. It is populated
//! at session start (possibly from several threads) and read concurrently
//! for the rest of the build.

use std::sync::Arc;

use dashmap::DashMap;

use crate::core::coordinate::{Coordinate, Metadata};
use crate::core::module::Module;

/// Thread-safe set of workspace modules.
#[derive(Debug, Default)]
pub struct ProjectRegistry {
    modules: DashMap<String, Arc<Module>>,
}

impl ProjectRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        ProjectRegistry {
            modules: DashMap::new(),
        }
    }

    /// Register a module. A later registration of the same identity wins.
    pub fn register(&self, module: Arc<Module>) {
        let id = module.id();
        if self.modules.insert(id.clone(), module).is_some() {
            tracing::debug!("Replaced registered module {}", id);
        }
    }

    /// Register a module and every module collected below it.
    pub fn register_all_descendants(&self, root: &Arc<Module>) {
        self.register(Arc::clone(root));
        for module in root.descendants() {
            self.register(module);
        }
    }

    /// Look up a module by `g:a:v`.
    pub fn get(&self, project_key: &str) -> Option<Arc<Module>> {
        self.modules.get(project_key).map(|m| Arc::clone(m.value()))
    }

    /// The module owning a coordinate.
    pub fn module_for(&self, coord: &Coordinate) -> Option<Arc<Module>> {
        self.get(&coord.project_key())
    }

    /// Whether a coordinate is produced by a workspace module.
    pub fn is_workspace_artifact(&self, coord: &Coordinate) -> bool {
        self.modules.contains_key(&coord.project_key())
    }

    /// Whether metadata describes a workspace module.
    pub fn is_workspace_metadata(&self, metadata: &Metadata) -> bool {
        self.modules.contains_key(&metadata.project_key())
    }

    /// Number of registered modules.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// All registered modules, sorted by identity.
    pub fn modules(&self) -> Vec<Arc<Module>> {
        let mut modules: Vec<Arc<Module>> =
            self.modules.iter().map(|e| Arc::clone(e.value())).collect();
        modules.sort_by_key(|m| m.id());
        modules
    }
}
