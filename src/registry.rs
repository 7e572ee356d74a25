//! The process-wide runner registry (spec §4.1).
//!
//! A write-once mapping from [`Category`] to [`Runner`], populated during
//! module initialization in production use. Tests construct their own
//! [`Registry`] instance and substitute it rather than relying on process
//! global state, so the registry here is an ordinary value, not a
//! `once_cell`-backed singleton — the "process-wide" requirement is
//! satisfied by the caller holding a single shared `Arc<Registry>` for the
//! lifetime of the process, not by this type enforcing it.

use crate::core::traits::Runner;
use crate::core::types::Category;
use std::collections::HashMap;
use std::sync::Arc;

/// Registration and lookup of category runners.
#[derive(Clone, Default)]
pub struct Registry {
    runners: HashMap<Category, Arc<dyn Runner>>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            runners: HashMap::new(),
        }
    }

    /// Register a runner for its category. Registering a second runner for
    /// the same category replaces the first — callers that want write-once
    /// semantics should build the registry once at startup and never call
    /// this again afterwards.
    pub fn register(&mut self, runner: Arc<dyn Runner>) {
        self.runners.insert(runner.category(), runner);
    }

    pub fn get(&self, category: Category) -> Option<Arc<dyn Runner>> {
        self.runners.get(&category).cloned()
    }

    /// Categories with a registered, currently-available runner, in the
    /// registry's natural (insertion-independent) order. Availability is
    /// evaluated against `target` because a runner's prerequisites (config
    /// files, in particular) may be target-specific.
    pub fn available(&self, target: &std::path::Path) -> Vec<Category> {
        let mut categories: Vec<Category> = self
            .runners
            .iter()
            .filter(|(_, runner)| runner.is_available(target))
            .map(|(category, _)| *category)
            .collect();
        categories.sort_by_key(|c| c.as_str());
        categories
    }

    pub fn len(&self) -> usize {
        self.runners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runners.is_empty()
    }
}
