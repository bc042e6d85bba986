//! Shared network-to-solver extraction and LP scaffolding.
//!
//! Every algorithm starts from the same view of the network: active points
//! and operational segments flattened into index-mapped plain data, in
//! id-sorted order. The LP variants then share flow-variable creation and
//! conservation rows; the graph variants build their residual structure from
//! the same view. Keeping one extraction point is what makes run-to-run
//! construction order deterministic.

use std::collections::BTreeMap;
use std::time::Instant;

use gasnet_core::{Network, PointId, SegmentId};
use gasnet_solver::{LpBackend, LpStatus, SolverRegistry, VarId};

use crate::result::{
    CostBreakdown, NetworkMetrics, OptimizationResult, PointPressureRecord, SegmentFlowRecord,
    SolveStatus,
};
use crate::settings::OptimizationSettings;
use crate::OptimizeError;

/// Role-specific data of an extracted point.
#[derive(Debug, Clone, PartialEq)]
pub enum PointRole {
    Receipt { supply: f64, unit_cost: f64 },
    Delivery { demand: f64 },
    Compressor { max_boost: f64, fuel_rate: f64 },
}

/// Plain-data view of an active point.
#[derive(Debug, Clone)]
pub struct PointData {
    pub id: PointId,
    pub role: PointRole,
    pub pmin: f64,
    pub pmax: f64,
    pub current_pressure: f64,
}

impl PointData {
    pub fn is_receipt(&self) -> bool {
        matches!(self.role, PointRole::Receipt { .. })
    }

    pub fn is_delivery(&self) -> bool {
        matches!(self.role, PointRole::Delivery { .. })
    }

    pub fn is_compressor(&self) -> bool {
        matches!(self.role, PointRole::Compressor { .. })
    }

    pub fn demand(&self) -> f64 {
        match self.role {
            PointRole::Delivery { demand } => demand,
            _ => 0.0,
        }
    }

    pub fn supply(&self) -> f64 {
        match self.role {
            PointRole::Receipt { supply, .. } => supply,
            _ => 0.0,
        }
    }

    /// Midpoint of the pressure window, the boost linearization anchor.
    pub fn nominal_pressure(&self) -> f64 {
        0.5 * (self.pmin + self.pmax)
    }
}

/// Plain-data view of an operational segment.
#[derive(Debug, Clone)]
pub struct SegmentData {
    pub id: SegmentId,
    pub from: usize,
    pub to: usize,
    pub capacity: f64,
    pub min_flow: f64,
    pub cost: f64,
    pub k: f64,
    pub bidirectional: bool,
}

/// The extracted network: everything the algorithms need, nothing they don't.
#[derive(Debug, Clone)]
pub struct FlowNetwork {
    pub points: Vec<PointData>,
    pub segments: Vec<SegmentData>,
    /// Segment indices delivering into each point
    pub incoming: Vec<Vec<usize>>,
    /// Segment indices leaving each point
    pub outgoing: Vec<Vec<usize>>,
}

impl FlowNetwork {
    /// Flatten active points and operational segments, id-sorted.
    pub fn extract(network: &Network) -> Result<Self, OptimizeError> {
        let mut points = Vec::new();
        let mut index_of: BTreeMap<&PointId, usize> = BTreeMap::new();

        for point in network.active_points() {
            let role = match &point.kind {
                gasnet_core::PointKind::Receipt {
                    supply_capacity,
                    unit_cost,
                } => PointRole::Receipt {
                    supply: supply_capacity.value(),
                    unit_cost: unit_cost.value(),
                },
                gasnet_core::PointKind::Delivery {
                    demand_requirement,
                } => PointRole::Delivery {
                    demand: demand_requirement.value(),
                },
                gasnet_core::PointKind::Compressor {
                    max_pressure_boost,
                    fuel_consumption_rate,
                } => PointRole::Compressor {
                    max_boost: max_pressure_boost.value(),
                    fuel_rate: *fuel_consumption_rate,
                },
            };
            index_of.insert(&point.id, points.len());
            points.push(PointData {
                id: point.id.clone(),
                role,
                pmin: point.min_pressure.value(),
                pmax: point.max_pressure.value(),
                current_pressure: point.current_pressure.value(),
            });
        }

        if points.is_empty() {
            return Err(OptimizeError::DataValidation(
                "network has no active points".to_string(),
            ));
        }

        let mut segments = Vec::new();
        let mut incoming = vec![Vec::new(); points.len()];
        let mut outgoing = vec![Vec::new(); points.len()];
        for segment in network.operational_segments() {
            let from = *index_of
                .get(&segment.from_point)
                .ok_or_else(|| missing_endpoint(&segment.id, &segment.from_point))?;
            let to = *index_of
                .get(&segment.to_point)
                .ok_or_else(|| missing_endpoint(&segment.id, &segment.to_point))?;
            let idx = segments.len();
            segments.push(SegmentData {
                id: segment.id.clone(),
                from,
                to,
                capacity: segment.capacity.value(),
                min_flow: segment.effective_min_flow().value(),
                cost: segment.transportation_cost.value(),
                k: segment.pressure_drop_constant,
                bidirectional: segment.is_bidirectional,
            });
            outgoing[from].push(idx);
            incoming[to].push(idx);
        }

        Ok(Self {
            points,
            segments,
            incoming,
            outgoing,
        })
    }

    pub fn receipts(&self) -> impl Iterator<Item = (usize, &PointData)> {
        self.points
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_receipt())
    }

    pub fn deliveries(&self) -> impl Iterator<Item = (usize, &PointData)> {
        self.points
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_delivery())
    }

    pub fn compressors(&self) -> impl Iterator<Item = (usize, &PointData)> {
        self.points
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_compressor())
    }

    pub fn total_demand(&self) -> f64 {
        self.points.iter().map(|p| p.demand()).sum()
    }
}

fn missing_endpoint(segment: &SegmentId, point: &PointId) -> OptimizeError {
    OptimizeError::DataValidation(format!(
        "segment {} references missing or inactive point {}",
        segment, point
    ))
}

/// How delivery conservation is bounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemandMode {
    /// Inflow within `[0, demand]` (maximize-throughput convention)
    CapAtDemand,
    /// Inflow exactly `demand` (cost and balance conventions)
    ExactDemand,
}

/// Instantiate the preferred back-end with the run's time limit applied.
pub fn create_backend(
    settings: &OptimizationSettings,
) -> Result<Box<dyn LpBackend>, OptimizeError> {
    let registry = SolverRegistry::with_defaults();
    let mut backend = registry
        .create(&settings.preferred_solver)
        .ok_or_else(|| OptimizeError::UnknownSolver(settings.preferred_solver.clone()))?;
    backend.set_time_limit(settings.time_limit_ms());
    Ok(backend)
}

/// One flow variable per segment, bounded `[min_flow, capacity]`.
pub fn add_flow_variables(backend: &mut dyn LpBackend, net: &FlowNetwork) -> Vec<VarId> {
    net.segments
        .iter()
        .map(|s| backend.make_num_var(s.min_flow, s.capacity, &format!("flow[{}]", s.id)))
        .collect()
}

/// Conservation rows per point.
///
/// Net inflow = Σ incoming − Σ outgoing is bounded by role: receipts inject
/// up to their supply, deliveries absorb per the demand mode, compressors
/// pass through exactly.
pub fn add_conservation_constraints(
    backend: &mut dyn LpBackend,
    net: &FlowNetwork,
    flow_vars: &[VarId],
    mode: DemandMode,
) {
    for (p, point) in net.points.iter().enumerate() {
        let (lo, hi) = match &point.role {
            PointRole::Receipt { supply, .. } => (-supply, 0.0),
            PointRole::Delivery { demand } => match mode {
                DemandMode::CapAtDemand => (0.0, *demand),
                DemandMode::ExactDemand => (*demand, *demand),
            },
            PointRole::Compressor { .. } => (0.0, 0.0),
        };
        let row = backend.make_constraint(lo, hi, &format!("balance[{}]", point.id));
        for &e in &net.incoming[p] {
            backend.set_coefficient(row, flow_vars[e], 1.0);
        }
        for &e in &net.outgoing[p] {
            backend.set_coefficient(row, flow_vars[e], -1.0);
        }
    }
}

/// Map a back-end verdict onto the run-level status.
pub fn map_status(status: LpStatus) -> SolveStatus {
    match status {
        LpStatus::Optimal => SolveStatus::Optimal,
        LpStatus::Feasible => SolveStatus::Feasible,
        LpStatus::Infeasible => SolveStatus::Infeasible,
        LpStatus::Unbounded => SolveStatus::Unbounded,
        LpStatus::Error => SolveStatus::Error,
    }
}

/// Variable values pulled out of a solved model (or produced by a graph run).
#[derive(Debug, Clone, Default)]
pub struct SolutionData {
    /// Per-segment flow, indexed like `FlowNetwork::segments`
    pub flows: Vec<f64>,
    /// Per-point squared pressure, when the pressure system was active
    pub psq: Option<Vec<f64>>,
    /// Boost per compressor point index
    pub boost: BTreeMap<usize, f64>,
    /// Fuel per compressor point index
    pub fuel: BTreeMap<usize, f64>,
}

/// Assemble the result object from a solution.
///
/// Flows below the reporting threshold are zeroed; metrics and the cost
/// breakdown are recomputed here so LP and graph variants report through the
/// same code path.
#[allow(clippy::too_many_arguments)]
pub fn build_result(
    algorithm: &str,
    solver: &str,
    status: SolveStatus,
    net: &FlowNetwork,
    solution: &SolutionData,
    settings: &OptimizationSettings,
    objective_value: f64,
    started: Instant,
) -> OptimizationResult {
    let mut result = OptimizationResult::new(algorithm, solver);
    result.status = status;
    result.objective_value = objective_value;
    result.elapsed_ms = started.elapsed().as_millis() as u64;

    if !status.has_solution() {
        return result;
    }

    let threshold = settings.minimum_flow_threshold;
    let eps = settings.feasibility_tolerance;
    let fuel_price = settings.param("fuel_price", 3.0);
    let boost_cost_rate = settings.param("boost_cost_rate", 0.001);

    let mut reported = vec![0.0; net.segments.len()];
    for (e, segment) in net.segments.iter().enumerate() {
        let raw = solution.flows.get(e).copied().unwrap_or(0.0);
        let flow = if raw.abs() < threshold { 0.0 } else { raw };
        reported[e] = flow;
        result.segment_flows.insert(
            segment.id.as_str().to_string(),
            SegmentFlowRecord {
                flow,
                capacity: segment.capacity,
                transportation_cost: segment.cost,
                utilization_pct: flow.abs() / segment.capacity * 100.0,
            },
        );
    }

    // Without a pressure system in the model, fall back to the independent
    // upstream estimate over the reported flows
    let estimated = match solution.psq {
        Some(_) => None,
        None => Some(crate::pressure::estimate_pressures(net, &reported)),
    };
    for (p, point) in net.points.iter().enumerate() {
        let pressure_sq = match (&solution.psq, &estimated) {
            (Some(values), _) => values.get(p).copied().unwrap_or(0.0),
            (None, Some(est)) => est[p] * est[p],
            (None, None) => point.current_pressure * point.current_pressure,
        };
        let pressure = pressure_sq.max(0.0).sqrt();
        result.point_pressures.insert(
            point.id.as_str().to_string(),
            PointPressureRecord {
                pressure,
                pressure_sq,
                within_constraints: pressure >= point.pmin - eps && pressure <= point.pmax + eps,
                boost: solution.boost.get(&p).copied().unwrap_or(0.0),
                fuel_consumption: solution.fuel.get(&p).copied().unwrap_or(0.0),
            },
        );
    }

    let transportation: f64 = net
        .segments
        .iter()
        .enumerate()
        .map(|(e, s)| reported[e].abs() * s.cost)
        .sum();
    let fuel_total: f64 = solution.fuel.values().sum();
    let boost_total: f64 = solution.boost.values().sum();
    result.cost_breakdown = CostBreakdown {
        transportation,
        fuel: fuel_total * fuel_price,
        compressor: boost_total * boost_cost_rate,
        other: 0.0,
    };

    result.metrics = compute_metrics(net, &reported, &solution.boost, threshold);
    result
}

fn compute_metrics(
    net: &FlowNetwork,
    flows: &[f64],
    boost: &BTreeMap<usize, f64>,
    threshold: f64,
) -> NetworkMetrics {
    let mut metrics = NetworkMetrics {
        demand_required: net.total_demand(),
        ..Default::default()
    };

    for (p, point) in net.points.iter().enumerate() {
        let inflow: f64 = net.incoming[p].iter().map(|&e| flows[e]).sum();
        let outflow: f64 = net.outgoing[p].iter().map(|&e| flows[e]).sum();
        match &point.role {
            PointRole::Receipt { .. } => {
                metrics.supply_used += outflow - inflow;
                metrics.total_throughput +=
                    net.outgoing[p].iter().map(|&e| flows[e].max(0.0)).sum::<f64>();
            }
            PointRole::Delivery { .. } => {
                metrics.demand_satisfied += inflow - outflow;
            }
            PointRole::Compressor { .. } => {
                let boosting = boost.get(&p).copied().unwrap_or(0.0) > 1e-9;
                if boosting || inflow > threshold {
                    metrics.active_compressor_count += 1;
                }
            }
        }
    }

    let utilizations: Vec<f64> = net
        .segments
        .iter()
        .enumerate()
        .map(|(e, s)| flows[e].abs() / s.capacity * 100.0)
        .collect();
    if !utilizations.is_empty() {
        metrics.avg_utilization_pct =
            utilizations.iter().sum::<f64>() / utilizations.len() as f64;
        metrics.peak_utilization_pct = utilizations.iter().cloned().fold(0.0, f64::max);
    }

    let populated: Vec<f64> = net
        .segments
        .iter()
        .enumerate()
        .filter(|(e, _)| flows[*e].abs() > threshold)
        .map(|(e, s)| flows[e].abs() / s.capacity * 100.0)
        .collect();
    metrics.active_segment_count = populated.len();
    if !populated.is_empty() {
        let mean = populated.iter().sum::<f64>() / populated.len() as f64;
        metrics.utilization_variance = populated
            .iter()
            .map(|u| (u - mean) * (u - mean))
            .sum::<f64>()
            / populated.len() as f64;
    }

    metrics
}
