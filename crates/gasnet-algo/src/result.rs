//! The result object all algorithms produce.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Solve outcome for a whole optimization run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SolveStatus {
    /// No solve attempted yet
    #[default]
    NotSolved,
    /// Proven optimal under the chosen back-end's guarantee
    Optimal,
    /// Feasible but without an optimality certificate (heuristics, limits)
    Feasible,
    /// No feasible assignment exists
    Infeasible,
    /// The objective is unbounded
    Unbounded,
    /// Validation failure, inapplicable algorithm, or internal error
    Error,
}

impl SolveStatus {
    /// True for statuses that carry a usable flow assignment.
    pub fn has_solution(&self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::Feasible)
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SolveStatus::NotSolved => "not-solved",
            SolveStatus::Optimal => "optimal",
            SolveStatus::Feasible => "feasible",
            SolveStatus::Infeasible => "infeasible",
            SolveStatus::Unbounded => "unbounded",
            SolveStatus::Error => "error",
        };
        write!(f, "{}", s)
    }
}

/// Per-segment outcome.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SegmentFlowRecord {
    /// Assigned flow (MMscfd); signed on bidirectional segments
    pub flow: f64,
    /// Segment capacity (MMscfd)
    pub capacity: f64,
    /// Tariff ($/MMscf)
    pub transportation_cost: f64,
    /// `|flow| / capacity · 100`
    pub utilization_pct: f64,
}

/// Per-point outcome.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PointPressureRecord {
    /// Pressure (psia); √P² clamped at zero
    pub pressure: f64,
    /// Squared pressure (psia²)
    pub pressure_sq: f64,
    /// Whether the pressure sits inside the point's window (± ε)
    pub within_constraints: bool,
    /// Compressor boost (psi); zero for non-compressors
    pub boost: f64,
    /// Compressor fuel draw (MMscfd); zero for non-compressors
    pub fuel_consumption: f64,
}

/// Cost components; the total is always their sum.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub transportation: f64,
    pub fuel: f64,
    pub compressor: f64,
    pub other: f64,
}

impl CostBreakdown {
    pub fn total(&self) -> f64 {
        self.transportation + self.fuel + self.compressor + self.other
    }
}

/// Aggregate solution metrics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkMetrics {
    /// Sum of positive segment flows leaving receipt points (MMscfd)
    pub total_throughput: f64,
    /// Net injection summed over receipts (MMscfd)
    pub supply_used: f64,
    /// Net absorption summed over deliveries (MMscfd)
    pub demand_satisfied: f64,
    /// Total contracted demand (MMscfd)
    pub demand_required: f64,
    /// Mean utilization over operational segments (%)
    pub avg_utilization_pct: f64,
    /// Largest segment utilization (%)
    pub peak_utilization_pct: f64,
    /// Utilization variance over segments carrying flow (%²)
    pub utilization_variance: f64,
    /// Operational segments carrying flow above the reporting threshold
    pub active_segment_count: usize,
    /// Compressor stations with nonzero boost or throughput
    pub active_compressor_count: usize,
}

/// Everything a run produces, serializable as the result JSON surface.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationResult {
    pub status: SolveStatus,
    pub objective_value: f64,
    /// Name of the algorithm that produced this result
    pub algorithm: String,
    /// Back-end identifier, or "graph" for the algorithmic variants
    pub solver: String,
    pub elapsed_ms: u64,
    /// Keyed by segment id; BTreeMap for stable serialization order
    pub segment_flows: BTreeMap<String, SegmentFlowRecord>,
    /// Keyed by point id
    pub point_pressures: BTreeMap<String, PointPressureRecord>,
    pub cost_breakdown: CostBreakdown,
    pub metrics: NetworkMetrics,
    /// Human-readable run log
    pub messages: Vec<String>,
    /// Post-solution violations; non-empty means the solution is untrustworthy
    pub validation_errors: Vec<String>,
}

impl OptimizationResult {
    pub fn new(algorithm: &str, solver: &str) -> Self {
        Self {
            algorithm: algorithm.to_string(),
            solver: solver.to_string(),
            ..Default::default()
        }
    }

    /// Shorthand for an `Error`-status result with one message.
    pub fn error(algorithm: &str, message: impl Into<String>) -> Self {
        let mut result = Self::new(algorithm, "");
        result.status = SolveStatus::Error;
        result.messages.push(message.into());
        result
    }

    pub fn add_message(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    /// Flow for a segment id, zero when absent.
    pub fn flow(&self, segment_id: &str) -> f64 {
        self.segment_flows
            .get(segment_id)
            .map(|r| r.flow)
            .unwrap_or(0.0)
    }

    /// Whether post-solution validation passed (vacuously true before it ran).
    pub fn is_validated(&self) -> bool {
        self.validation_errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_has_solution() {
        assert!(SolveStatus::Optimal.has_solution());
        assert!(SolveStatus::Feasible.has_solution());
        assert!(!SolveStatus::Infeasible.has_solution());
        assert!(!SolveStatus::NotSolved.has_solution());
    }

    #[test]
    fn test_cost_breakdown_total() {
        let breakdown = CostBreakdown {
            transportation: 232.0,
            fuel: 10.0,
            compressor: 5.0,
            other: 0.0,
        };
        assert!((breakdown.total() - 247.0).abs() < 1e-12);
    }

    #[test]
    fn test_result_roundtrips_through_json() {
        let mut result = OptimizationResult::new("cost-lp", "simplex");
        result.status = SolveStatus::Optimal;
        result.objective_value = 232.0;
        result.segment_flows.insert(
            "S1".to_string(),
            SegmentFlowRecord {
                flow: 1000.0,
                capacity: 1200.0,
                transportation_cost: 0.10,
                utilization_pct: 83.33,
            },
        );

        let json = serde_json::to_string(&result).unwrap();
        let back: OptimizationResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.status, SolveStatus::Optimal);
        assert!((back.flow("S1") - 1000.0).abs() < 1e-12);
        assert_eq!(back.flow("S404"), 0.0);
    }

    #[test]
    fn test_error_shorthand() {
        let result = OptimizationResult::error("cost-lp", "no active deliveries");
        assert_eq!(result.status, SolveStatus::Error);
        assert_eq!(result.messages.len(), 1);
    }
}
