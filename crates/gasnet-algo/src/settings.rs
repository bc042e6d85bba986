//! Run configuration recognized by every algorithm.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

fn default_time_limit() -> u64 {
    300
}

fn default_tolerance() -> f64 {
    1e-6
}

fn default_segments() -> usize {
    10
}

fn default_solver() -> String {
    "simplex".to_string()
}

fn default_flow_threshold() -> f64 {
    0.01
}

/// Options controlling one optimization run.
///
/// Serde defaults match the documented defaults, so a partially specified
/// JSON settings object fills in the rest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OptimizationSettings {
    /// Include the pressure-squared constraint system
    pub enable_pressure_constraints: bool,
    /// Include compressor activation/boost/fuel constraints
    pub enable_compressor_stations: bool,
    /// Wall-clock cap for the solver back-end (seconds)
    pub max_solution_time_seconds: u64,
    /// Back-end convergence tolerance
    pub optimality_tolerance: f64,
    /// ε for post-solution validation
    pub feasibility_tolerance: f64,
    /// Force the piecewise-linear pressure form even on a quadratic-capable
    /// back-end
    pub use_linear_pressure_approximation: bool,
    /// Interval count S of the piecewise-linear approximation (1..=100)
    pub linear_approximation_segments: usize,
    /// Back-end identifier ("simplex", "clarabel")
    pub preferred_solver: String,
    /// Flows below this magnitude are reported as zero (MMscfd)
    pub minimum_flow_threshold: f64,
    /// Free-form numeric knobs forwarded to algorithms
    pub algorithm_parameters: BTreeMap<String, f64>,
    /// Validate the network before dispatching to an algorithm
    pub validate_network_before_optimization: bool,
}

impl Default for OptimizationSettings {
    fn default() -> Self {
        Self {
            enable_pressure_constraints: false,
            enable_compressor_stations: false,
            max_solution_time_seconds: default_time_limit(),
            optimality_tolerance: default_tolerance(),
            feasibility_tolerance: default_tolerance(),
            use_linear_pressure_approximation: default_true(),
            linear_approximation_segments: default_segments(),
            preferred_solver: default_solver(),
            minimum_flow_threshold: default_flow_threshold(),
            algorithm_parameters: BTreeMap::new(),
            validate_network_before_optimization: default_true(),
        }
    }
}

impl OptimizationSettings {
    /// Aggregate list of configuration problems; empty means valid.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.max_solution_time_seconds == 0 {
            problems.push("maxSolutionTimeSeconds must be > 0".to_string());
        }
        if !(self.optimality_tolerance > 0.0) {
            problems.push("optimalityTolerance must be > 0".to_string());
        }
        if !(self.feasibility_tolerance > 0.0) {
            problems.push("feasibilityTolerance must be > 0".to_string());
        }
        if self.linear_approximation_segments == 0 || self.linear_approximation_segments > 100 {
            problems.push("linearApproximationSegments must be within 1..=100".to_string());
        }
        if self.preferred_solver.trim().is_empty() {
            problems.push("preferredSolver must not be empty".to_string());
        }
        if self.minimum_flow_threshold < 0.0 {
            problems.push("minimumFlowThreshold must be >= 0".to_string());
        }
        problems
    }

    /// Numeric algorithm parameter with fallback.
    pub fn param(&self, name: &str, default: f64) -> f64 {
        self.algorithm_parameters
            .get(name)
            .copied()
            .unwrap_or(default)
    }

    /// Time limit in milliseconds, for the back-end interface.
    pub fn time_limit_ms(&self) -> u64 {
        self.max_solution_time_seconds.saturating_mul(1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = OptimizationSettings::default();
        assert!(!settings.enable_pressure_constraints);
        assert_eq!(settings.max_solution_time_seconds, 300);
        assert_eq!(settings.linear_approximation_segments, 10);
        assert_eq!(settings.preferred_solver, "simplex");
        assert!(settings.validate().is_empty());
    }

    #[test]
    fn test_validation_catches_bad_ranges() {
        let mut settings = OptimizationSettings::default();
        settings.linear_approximation_segments = 101;
        settings.minimum_flow_threshold = -1.0;
        let problems = settings.validate();
        assert_eq!(problems.len(), 2);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: OptimizationSettings =
            serde_json::from_str(r#"{"enablePressureConstraints": true}"#).unwrap();
        assert!(settings.enable_pressure_constraints);
        assert_eq!(settings.preferred_solver, "simplex");
        assert_eq!(settings.minimum_flow_threshold, 0.01);
    }

    #[test]
    fn test_param_lookup() {
        let mut settings = OptimizationSettings::default();
        settings
            .algorithm_parameters
            .insert("fuel_price".to_string(), 4.5);
        assert_eq!(settings.param("fuel_price", 3.0), 4.5);
        assert_eq!(settings.param("unset", 3.0), 3.0);
    }
}
