//! The six optimization algorithms behind one trait.
//!
//! Each objective (maximize throughput, minimize cost, balance utilization)
//! ships in two renditions: an LP/MIP formulation over the solver
//! abstraction (`*-lp`) and a pure graph-algorithmic variant (`*-graph`).
//! The graph variants double as reference oracles and as fallbacks when no
//! mathematical-programming back-end is wanted.

mod balance;
mod cost;
mod throughput;

use std::collections::BTreeMap;

use gasnet_core::Network;

use crate::result::OptimizationResult;
use crate::settings::OptimizationSettings;
use crate::OptimizeError;

pub use balance::{BalanceGraph, BalanceLp};
pub use cost::{CostGraph, CostLp};
pub use throughput::{ThroughputGraph, ThroughputLp};

/// Common contract of every optimization algorithm.
pub trait OptimizationAlgorithm: Send + Sync {
    /// Registry key, e.g. "cost-lp"
    fn name(&self) -> &'static str;

    /// One-line description for listings
    fn description(&self) -> &'static str;

    /// Recognized `AlgorithmParameters` entries with descriptions
    fn parameters(&self) -> BTreeMap<&'static str, &'static str>;

    /// Whether this algorithm can run on the given inputs
    fn can_handle(&self, network: &Network, settings: &OptimizationSettings) -> bool;

    /// Run the optimization. Infeasibility is a result status, not an error;
    /// errors are reserved for failures of the machinery itself.
    fn optimize(
        &self,
        network: &Network,
        settings: &OptimizationSettings,
    ) -> Result<OptimizationResult, OptimizeError>;
}

/// The built-in algorithm set, in registry order.
pub fn default_algorithms() -> Vec<Box<dyn OptimizationAlgorithm>> {
    vec![
        Box::new(ThroughputLp),
        Box::new(ThroughputGraph),
        Box::new(CostLp),
        Box::new(CostGraph),
        Box::new(BalanceLp),
        Box::new(BalanceGraph),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_set_names_are_unique() {
        let algorithms = default_algorithms();
        let mut names: Vec<&str> = algorithms.iter().map(|a| a.name()).collect();
        assert_eq!(names.len(), 6);
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 6);
    }

    #[test]
    fn test_trait_is_object_safe() {
        fn _accepts(_a: &dyn OptimizationAlgorithm) {}
    }
}
