//! Registry of solver back-ends.
//!
//! Holds back-end factories keyed by id so callers can select a solver by
//! name (the `PreferredSolver` setting) without compile-time coupling to a
//! concrete implementation.

use std::collections::BTreeMap;

use crate::backend::LpBackend;
use crate::clarabel::ClarabelBackend;
use crate::simplex::SimplexBackend;

type BackendFactory = fn() -> Box<dyn LpBackend>;

/// Holds registered back-end factories.
///
/// Create with `SolverRegistry::new()` for empty or
/// `SolverRegistry::with_defaults()` for the built-in solvers.
#[derive(Default)]
pub struct SolverRegistry {
    factories: BTreeMap<String, BackendFactory>,
}

impl SolverRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in back-ends: `simplex` and `clarabel`.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("simplex", || Box::new(SimplexBackend::new()));
        registry.register("clarabel", || Box::new(ClarabelBackend::new()));
        registry
    }

    /// Register a back-end factory under an id.
    pub fn register(&mut self, id: &str, factory: BackendFactory) {
        self.factories.insert(id.to_string(), factory);
    }

    /// Instantiate a back-end by id.
    pub fn create(&self, id: &str) -> Option<Box<dyn LpBackend>> {
        self.factories.get(id).map(|f| f())
    }

    /// All registered ids, sorted.
    pub fn available(&self) -> Vec<&str> {
        self.factories.keys().map(|s| s.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_registered() {
        let registry = SolverRegistry::with_defaults();
        assert_eq!(registry.available(), vec!["clarabel", "simplex"]);
    }

    #[test]
    fn test_create_by_id() {
        let registry = SolverRegistry::with_defaults();
        let backend = registry.create("simplex").unwrap();
        assert_eq!(backend.id(), "simplex");
        assert!(registry.create("cplex").is_none());
    }
}
