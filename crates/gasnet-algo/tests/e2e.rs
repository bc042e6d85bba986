//! End-to-end runs over the fixture networks: every objective in both
//! renditions, plus the boundary behaviors a capacity planner leans on.

use gasnet_algo::test_utils::{compressor_star_network, single_chain_network};
use gasnet_algo::{
    trace_required_flows, OptimizationEngine, OptimizationSettings, SolveStatus,
};
use gasnet_core::{Mmscfd, Network, PointId, PointKind, SegmentId};

fn engine() -> OptimizationEngine {
    OptimizationEngine::with_defaults()
}

fn scale_demand(network: &mut Network, factor: f64) {
    for point in network.points.values_mut() {
        if let PointKind::Delivery { demand_requirement } = &mut point.kind {
            *demand_requirement = Mmscfd(demand_requirement.value() * factor);
        }
    }
}

#[test]
fn min_cost_star_flows_and_cost() {
    let engine = engine();
    let settings = OptimizationSettings::default();
    for algorithm in ["cost-lp", "cost-graph"] {
        let result = engine.optimize(&compressor_star_network(), algorithm, &settings);
        assert!(result.status.has_solution(), "{}: {:?}", algorithm, result.messages);
        assert!((result.flow("S1") - 1000.0).abs() < 1e-4, "{}", algorithm);
        assert!((result.flow("S2") - 600.0).abs() < 1e-4, "{}", algorithm);
        assert!((result.flow("S3") - 400.0).abs() < 1e-4, "{}", algorithm);
        assert!(
            (result.cost_breakdown.transportation - 232.0).abs() < 1e-3,
            "{}: {}",
            algorithm,
            result.cost_breakdown.transportation
        );
        assert!(result.is_validated(), "{}: {:?}", algorithm, result.validation_errors);
    }
}

#[test]
fn max_throughput_star_is_demand_bounded() {
    let engine = engine();
    let settings = OptimizationSettings::default();
    for algorithm in ["throughput-lp", "throughput-graph"] {
        let result = engine.optimize(&compressor_star_network(), algorithm, &settings);
        assert!(result.status.has_solution(), "{}", algorithm);
        assert!(
            (result.metrics.total_throughput - 1000.0).abs() < 1e-4,
            "{}: throughput {}",
            algorithm,
            result.metrics.total_throughput
        );
        assert!(result.is_validated(), "{}: {:?}", algorithm, result.validation_errors);
    }
}

#[test]
fn high_demand_scenario_is_infeasible() {
    // Demand 1.5x with supply raised to match: the 600 MMscfd leg into D1
    // becomes the binding cut (requires 900)
    let mut network = compressor_star_network();
    scale_demand(&mut network, 1.5);
    if let Some(point) = network.points.get_mut(&PointId::new("R1")) {
        if let PointKind::Receipt { supply_capacity, .. } = &mut point.kind {
            *supply_capacity = Mmscfd(1600.0);
        }
    }

    let engine = engine();
    let settings = OptimizationSettings::default();
    for algorithm in ["cost-lp", "cost-graph"] {
        let result = engine.optimize(&network, algorithm, &settings);
        assert_eq!(result.status, SolveStatus::Infeasible, "{}", algorithm);
    }
}

#[test]
fn demand_exceeding_supply_fails_network_validation() {
    let mut network = compressor_star_network();
    scale_demand(&mut network, 1.5);
    let result = engine().optimize(&network, "cost-lp", &OptimizationSettings::default());
    assert_eq!(result.status, SolveStatus::Error);
    assert!(result
        .messages
        .iter()
        .any(|m| m.contains("network validation failed")));
}

#[test]
fn severed_trunk_is_infeasible_for_cost() {
    // Deactivating the trunk segment leaves the delivery legs operational
    // but unreachable from the receipt
    let mut network = compressor_star_network();
    network
        .segments
        .get_mut(&SegmentId::new("S1"))
        .unwrap()
        .is_active = false;

    let engine = engine();
    let settings = OptimizationSettings::default();
    for algorithm in ["cost-lp", "cost-graph"] {
        let result = engine.optimize(&network, algorithm, &settings);
        assert_eq!(result.status, SolveStatus::Infeasible, "{}", algorithm);
    }
}

#[test]
fn deactivated_compressor_point_yields_error_for_cost() {
    // With the only junction inactive no segment stays operational, so
    // can_handle rejects the run outright
    let mut network = compressor_star_network();
    network
        .points
        .get_mut(&PointId::new("C1"))
        .unwrap()
        .is_active = false;

    let result = engine().optimize(&network, "cost-lp", &OptimizationSettings::default());
    assert_eq!(result.status, SolveStatus::Error);
    assert!(result.messages.iter().any(|m| m.contains("cannot handle")));
}

#[test]
fn balance_graph_beats_min_cost_on_variance() {
    let engine = engine();
    let mut settings = OptimizationSettings::default();
    settings
        .algorithm_parameters
        .insert("target_utilization".to_string(), 70.0);

    let network = compressor_star_network();
    let cost = engine.optimize(&network, "cost-lp", &settings);
    let balance = engine.optimize(&network, "balance-graph", &settings);

    assert!(cost.status.has_solution());
    assert!(balance.status.has_solution());
    assert!(
        balance.metrics.utilization_variance < cost.metrics.utilization_variance,
        "balance {} !< cost {}",
        balance.metrics.utilization_variance,
        cost.metrics.utilization_variance
    );
}

#[test]
fn balance_lp_serves_all_demand() {
    let result = engine().optimize(
        &compressor_star_network(),
        "balance-lp",
        &OptimizationSettings::default(),
    );
    assert!(result.status.has_solution(), "{:?}", result.messages);
    assert!((result.metrics.demand_satisfied - 1000.0).abs() < 1e-4);
    assert!(result.is_validated(), "{:?}", result.validation_errors);
}

#[test]
fn upstream_trace_matches_expected_requirements() {
    let report = trace_required_flows(&compressor_star_network());
    assert!((report.required("S1") - 1000.0).abs() < 1e-9);
    assert!((report.required("S2") - 600.0).abs() < 1e-9);
    assert!((report.required("S3") - 400.0).abs() < 1e-9);
    assert!(report.is_network_feasible);
    assert!(report.violations.is_empty());
}

#[test]
fn single_chain_throughput_is_min_of_supply_demand_capacity() {
    let result = engine().optimize(
        &single_chain_network(),
        "throughput-lp",
        &OptimizationSettings::default(),
    );
    assert!(result.status.has_solution());
    // min(supply 1000, demand 600, capacity 800)
    assert!((result.flow("S1") - 600.0).abs() < 1e-4);
}

#[test]
fn repeated_runs_are_identical_modulo_timing() {
    let engine = engine();
    let network = compressor_star_network();
    let settings = OptimizationSettings::default();
    for algorithm in ["cost-lp", "throughput-graph", "balance-graph"] {
        let mut a = engine.optimize(&network, algorithm, &settings);
        let mut b = engine.optimize(&network, algorithm, &settings);
        a.elapsed_ms = 0;
        b.elapsed_ms = 0;
        let ja = serde_json::to_string(&a).unwrap();
        let jb = serde_json::to_string(&b).unwrap();
        assert_eq!(ja, jb, "{} is nondeterministic", algorithm);
    }
}

#[test]
fn lp_and_graph_agree_on_min_cost() {
    let engine = engine();
    let network = compressor_star_network();
    let settings = OptimizationSettings::default();
    let lp = engine.optimize(&network, "cost-lp", &settings);
    let graph = engine.optimize(&network, "cost-graph", &settings);
    assert!(
        (lp.cost_breakdown.transportation - graph.cost_breakdown.transportation).abs() < 1e-3
    );
}

/// Pressure-bound chain that only works when the station may boost.
fn boost_dependent_chain() -> Network {
    use gasnet_core::{Point, Segment};
    let mut network = Network::new("boost-chain", "needs compression");
    network.add_point(
        Point::receipt("R1", "R1", 500.0, 0.05).with_pressure_window(800.0, 1000.0),
    );
    network.add_point(
        Point::compressor("C1", "C1", 400.0, 0.02).with_pressure_window(300.0, 1200.0),
    );
    network.add_point(Point::delivery("D1", "D1", 300.0).with_pressure_window(300.0, 800.0));
    network.add_segment(
        Segment::new("S1", "R1-C1", "R1", "C1", 400.0)
            .with_geometry(50.0, 36.0, 0.015)
            .with_cost(0.10),
    );
    network.add_segment(
        Segment::new("S2", "C1-D1", "C1", "D1", 400.0)
            .with_geometry(30.0, 24.0, 0.018)
            .with_cost(0.12),
    );
    network.recompute_drop_constants();
    // Steep drop on both legs: 600,000 psia² each at the 300 MMscfd demand.
    // Total 1.2M psia² exceeds what the windows allow without boost
    // (1,000² − 300² = 910,000) but fits once C1 adds its linearized gain.
    let k = 600_000.0 / (300.0_f64 * 300.0);
    network.segments.get_mut(&SegmentId::new("S1")).unwrap().pressure_drop_constant = k;
    network.segments.get_mut(&SegmentId::new("S2")).unwrap().pressure_drop_constant = k;
    network
}

#[test]
fn compression_dependent_chain_needs_the_station() {
    let engine = engine();
    let network = boost_dependent_chain();

    // Pressure on, compressors off: nothing can absorb the drop
    let mut strict = OptimizationSettings::default();
    strict.enable_pressure_constraints = true;
    let without = engine.optimize(&network, "cost-lp", &strict);
    assert_eq!(without.status, SolveStatus::Infeasible);

    // Pressure on, compressors on: the boost gain closes the gap
    let mut boosted = strict.clone();
    boosted.enable_compressor_stations = true;
    let with = engine.optimize(&network, "cost-lp", &boosted);
    assert!(with.status.has_solution(), "{:?}", with.messages);
    let c1 = &with.point_pressures["C1"];
    assert!(c1.boost > 1.0, "boost = {}", c1.boost);
    assert!(c1.fuel_consumption > 0.0);
    assert!(with.is_validated(), "{:?}", with.validation_errors);

    // Pressure off: the same chain is trivially feasible
    let relaxed = OptimizationSettings::default();
    let flat = engine.optimize(&network, "cost-lp", &relaxed);
    assert_eq!(flat.status, SolveStatus::Optimal);
}

#[test]
fn pressure_constraints_keep_windows_honest() {
    let engine = engine();
    let mut settings = OptimizationSettings::default();
    settings.enable_pressure_constraints = true;

    let result = engine.optimize(&compressor_star_network(), "cost-lp", &settings);
    assert!(result.status.has_solution(), "{:?}", result.messages);
    for (id, record) in &result.point_pressures {
        assert!(record.within_constraints, "{} at {:.1} psia", id, record.pressure);
    }
    assert!(result.is_validated(), "{:?}", result.validation_errors);
}

#[test]
fn clarabel_backend_agrees_on_continuous_lp() {
    let engine = engine();
    let network = compressor_star_network();
    let mut settings = OptimizationSettings::default();
    settings.preferred_solver = "clarabel".to_string();
    let result = engine.optimize(&network, "cost-lp", &settings);
    assert!(result.status.has_solution(), "{:?}", result.messages);
    assert!(
        (result.cost_breakdown.transportation - 232.0).abs() < 0.5,
        "transportation = {}",
        result.cost_breakdown.transportation
    );
}

#[test]
fn unknown_solver_is_reported_as_error() {
    let mut settings = OptimizationSettings::default();
    settings.preferred_solver = "gurobi".to_string();
    let result = engine().optimize(&compressor_star_network(), "cost-lp", &settings);
    assert_eq!(result.status, SolveStatus::Error);
    assert!(result.messages.iter().any(|m| m.contains("gurobi")));
}
