//! Engine facade: registry, input validation, dispatch, post-solution
//! validation, batch entry points, and the comparison report.

use std::collections::BTreeMap;

use gasnet_core::{Diagnostics, Network};
use tracing::{info, warn};

use crate::algorithms::{default_algorithms, OptimizationAlgorithm};
use crate::result::{OptimizationResult, SolveStatus};
use crate::settings::OptimizationSettings;
use crate::validation::validate_result;

/// Holds registered algorithms and runs them with uniform guard rails.
///
/// Every failure mode is funneled into an `Error`-status result: invalid
/// settings, failed network validation, unknown or inapplicable algorithms,
/// and internal algorithm errors. Batch entry points isolate per-item
/// failures so one bad run never aborts the batch.
#[derive(Default)]
pub struct OptimizationEngine {
    algorithms: BTreeMap<String, Box<dyn OptimizationAlgorithm>>,
}

impl OptimizationEngine {
    /// Empty engine; register algorithms explicitly.
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine with the six built-in algorithms registered.
    pub fn with_defaults() -> Self {
        let mut engine = Self::new();
        for algorithm in default_algorithms() {
            engine.register(algorithm);
        }
        engine
    }

    /// Register an algorithm under its own name.
    pub fn register(&mut self, algorithm: Box<dyn OptimizationAlgorithm>) {
        self.algorithms
            .insert(algorithm.name().to_string(), algorithm);
    }

    /// Registered names, sorted.
    pub fn algorithm_names(&self) -> Vec<&str> {
        self.algorithms.keys().map(|s| s.as_str()).collect()
    }

    /// Look up a registered algorithm.
    pub fn algorithm(&self, name: &str) -> Option<&dyn OptimizationAlgorithm> {
        self.algorithms.get(name).map(|a| a.as_ref())
    }

    /// Run one optimization with full validation around it.
    pub fn optimize(
        &self,
        network: &Network,
        algorithm: &str,
        settings: &OptimizationSettings,
    ) -> OptimizationResult {
        let problems = settings.validate();
        if !problems.is_empty() {
            let mut result = OptimizationResult::error(algorithm, "settings validation failed");
            result.messages.extend(problems);
            return result;
        }

        if settings.validate_network_before_optimization {
            let mut diag = Diagnostics::new();
            network.validate_into(&mut diag);
            if diag.has_errors() {
                let mut result =
                    OptimizationResult::error(algorithm, "network validation failed");
                result.messages.extend(diag.error_messages());
                return result;
            }
        }

        let Some(algo) = self.algorithms.get(algorithm) else {
            return OptimizationResult::error(
                algorithm,
                format!(
                    "unknown algorithm '{}'; registered: {}",
                    algorithm,
                    self.algorithm_names().join(", ")
                ),
            );
        };

        if !algo.can_handle(network, settings) {
            return OptimizationResult::error(
                algorithm,
                format!("algorithm '{}' cannot handle this network", algorithm),
            );
        }

        info!(algorithm, network = %network.name, "optimization starting");
        let mut result = match algo.optimize(network, settings) {
            Ok(result) => result,
            Err(err) => {
                warn!(algorithm, %err, "algorithm failed");
                return OptimizationResult::error(algorithm, err.to_string());
            }
        };

        if result.status.has_solution() {
            let violations = validate_result(network, &result, settings);
            if !violations.is_empty() {
                warn!(
                    algorithm,
                    violations = violations.len(),
                    "post-solution validation failed"
                );
                result.add_message(format!(
                    "post-solution validation found {} violations; treat as untrustworthy",
                    violations.len()
                ));
                result.validation_errors = violations;
            }
        }
        info!(algorithm, status = %result.status, elapsed_ms = result.elapsed_ms, "optimization finished");
        result
    }

    /// Run several algorithms on the same network; failures stay isolated.
    pub fn compare(
        &self,
        network: &Network,
        algorithms: &[String],
        settings: &OptimizationSettings,
    ) -> Vec<OptimizationResult> {
        algorithms
            .iter()
            .map(|name| self.optimize(network, name, settings))
            .collect()
    }

    /// Run one algorithm across labeled network variants (sensitivity runs);
    /// failures stay isolated per variant.
    pub fn run_scenarios(
        &self,
        scenarios: &[(String, Network)],
        algorithm: &str,
        settings: &OptimizationSettings,
    ) -> Vec<(String, OptimizationResult)> {
        scenarios
            .iter()
            .map(|(label, network)| {
                (label.clone(), self.optimize(network, algorithm, settings))
            })
            .collect()
    }

    /// Fixed-width comparison table over results.
    pub fn report(results: &[OptimizationResult]) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "{:<18} {:<11} {:>12} {:>12} {:>12} {:>10} {:>8}\n",
            "algorithm", "status", "objective", "throughput", "cost", "avg util", "ms"
        ));
        out.push_str(&"-".repeat(88));
        out.push('\n');
        for result in results {
            out.push_str(&format!(
                "{:<18} {:<11} {:>12.2} {:>12.2} {:>12.2} {:>9.1}% {:>8}\n",
                result.algorithm,
                result.status.to_string(),
                result.objective_value,
                result.metrics.total_throughput,
                result.cost_breakdown.total(),
                result.metrics.avg_utilization_pct,
                result.elapsed_ms
            ));
        }
        out
    }
}
