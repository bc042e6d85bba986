//! Compressor activation, boost, and fuel variables, plus the staging
//! heuristic.
//!
//! Per compressor `c` the model carries `active(c) ∈ {0,1}`,
//! `boost(c) ∈ [0, MaxBoost(c)]`, and `fuel(c) ≥ 0`, linked by
//!
//! - `boost(c) ≤ MaxBoost(c)·active(c)`
//! - `Σ inflow ≥ min_flow·active(c)`
//! - `fuel(c) ≥ base_rate·active(c) + FuelRate(c)·Σ inflow + boost_rate·boost(c)`
//!
//! The tunables are surfaced through `AlgorithmParameters`; see
//! [`CompressorParams::from_settings`].

use std::collections::BTreeMap;

use gasnet_solver::{LpBackend, VarId};

use crate::model::{FlowNetwork, PointRole};
use crate::settings::OptimizationSettings;

/// Tunable coefficients of the compressor model.
#[derive(Debug, Clone)]
pub struct CompressorParams {
    /// Minimum throughput while active (MMscfd)
    pub min_flow: f64,
    /// Standing fuel draw while active (MMscfd)
    pub base_fuel: f64,
    /// Extra fuel per psi of boost (MMscf/psi)
    pub boost_fuel_rate: f64,
}

impl CompressorParams {
    pub fn from_settings(settings: &OptimizationSettings) -> Self {
        Self {
            min_flow: settings.param("compressor_min_flow", 10.0),
            base_fuel: settings.param("compressor_base_fuel", 0.5),
            boost_fuel_rate: settings.param("boost_fuel_rate", 0.001),
        }
    }
}

/// Variables created by [`add_compressor_constraints`], keyed by point index.
#[derive(Debug, Clone, Default)]
pub struct CompressorVars {
    pub active: BTreeMap<usize, VarId>,
    pub boost: BTreeMap<usize, VarId>,
    pub fuel: BTreeMap<usize, VarId>,
}

/// Emit activation/boost/fuel variables and their linking rows for every
/// compressor in the extracted network.
pub fn add_compressor_constraints(
    backend: &mut dyn LpBackend,
    net: &FlowNetwork,
    flow_vars: &[VarId],
    params: &CompressorParams,
) -> CompressorVars {
    let mut vars = CompressorVars::default();

    for (p, point) in net.points.iter().enumerate() {
        let (max_boost, fuel_rate) = match point.role {
            PointRole::Compressor {
                max_boost,
                fuel_rate,
            } => (max_boost, fuel_rate),
            _ => continue,
        };

        let active = backend.make_bool_var(&format!("comp_active[{}]", point.id));
        let boost = backend.make_num_var(0.0, max_boost, &format!("boost[{}]", point.id));
        let fuel = backend.make_num_var(0.0, f64::INFINITY, &format!("fuel[{}]", point.id));

        // boost - max_boost·active <= 0
        let link = backend.make_constraint(
            f64::NEG_INFINITY,
            0.0,
            &format!("boost_link[{}]", point.id),
        );
        backend.set_coefficient(link, boost, 1.0);
        backend.set_coefficient(link, active, -max_boost);

        // Σ inflow - min_flow·active >= 0
        let throughput = backend.make_constraint(
            0.0,
            f64::INFINITY,
            &format!("comp_min_flow[{}]", point.id),
        );
        for &e in &net.incoming[p] {
            backend.set_coefficient(throughput, flow_vars[e], 1.0);
        }
        backend.set_coefficient(throughput, active, -params.min_flow);

        // fuel - base·active - rate·Σ inflow - boost_rate·boost >= 0
        let fuel_row =
            backend.make_constraint(0.0, f64::INFINITY, &format!("fuel_curve[{}]", point.id));
        backend.set_coefficient(fuel_row, fuel, 1.0);
        backend.set_coefficient(fuel_row, active, -params.base_fuel);
        for &e in &net.incoming[p] {
            backend.set_coefficient(fuel_row, flow_vars[e], -fuel_rate);
        }
        backend.set_coefficient(fuel_row, boost, -params.boost_fuel_rate);

        vars.active.insert(p, active);
        vars.boost.insert(p, boost);
        vars.fuel.insert(p, fuel);
    }

    vars
}

/// One stage of a multi-stage compression plan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressionStage {
    /// Discharge-over-suction ratio of this stage
    pub ratio: f64,
    /// Whether the stage discharges through an intercooler
    pub intercooled: bool,
}

/// Split a total pressure ratio into equal stages.
///
/// Stage count is `⌈ln R / ln r_max⌉`, each stage at `R^(1/n)`; every stage
/// but the last is intercooled. Ratios at or below 1 need no compression.
pub fn plan_stages(total_ratio: f64, max_stage_ratio: f64) -> Vec<CompressionStage> {
    if total_ratio <= 1.0 {
        return Vec::new();
    }
    let r_max = max_stage_ratio.max(1.01);
    let n = (total_ratio.ln() / r_max.ln()).ceil().max(1.0) as usize;
    let stage_ratio = total_ratio.powf(1.0 / n as f64);
    (0..n)
        .map(|i| CompressionStage {
            ratio: stage_ratio,
            intercooled: i + 1 < n,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gasnet_core::{Network, Point, Segment};
    use gasnet_solver::{LpStatus, SimplexBackend};

    use crate::model::{
        add_conservation_constraints, add_flow_variables, DemandMode, FlowNetwork,
    };

    fn compressor_chain() -> FlowNetwork {
        let mut network = Network::new("cchain", "");
        network.add_point(
            Point::receipt("R1", "R1", 1000.0, 0.0).with_pressure_window(800.0, 1000.0),
        );
        network.add_point(
            Point::compressor("C1", "C1", 400.0, 0.02).with_pressure_window(300.0, 1200.0),
        );
        network.add_point(Point::delivery("D1", "D1", 600.0).with_pressure_window(300.0, 800.0));
        network.add_segment(Segment::new("S1", "R1-C1", "R1", "C1", 1200.0));
        network.add_segment(Segment::new("S2", "C1-D1", "C1", "D1", 600.0));
        network.recompute_drop_constants();
        FlowNetwork::extract(&network).unwrap()
    }

    #[test]
    fn test_fuel_tracks_throughput() {
        let net = compressor_chain();
        let mut backend = SimplexBackend::new();
        let flow_vars = add_flow_variables(&mut backend, &net);
        add_conservation_constraints(&mut backend, &net, &flow_vars, DemandMode::ExactDemand);
        let params = CompressorParams {
            min_flow: 10.0,
            base_fuel: 0.5,
            boost_fuel_rate: 0.001,
        };
        let vars = add_compressor_constraints(&mut backend, &net, &flow_vars, &params);

        // Minimize fuel so the relation binds from below
        let c1 = net
            .points
            .iter()
            .position(|p| p.id.as_str() == "C1")
            .unwrap();
        backend.objective_set_coefficient(vars.fuel[&c1], 1.0);
        backend.objective_minimize();

        assert_eq!(backend.solve(), LpStatus::Optimal);
        let fuel = backend.value(vars.fuel[&c1]);
        // 600 MMscfd through at 0.02 rate, no boost, inactive: fuel = 12
        assert!((fuel - 12.0).abs() < 1e-4, "fuel = {}", fuel);
        assert!(backend.value(vars.boost[&c1]).abs() < 1e-6);
    }

    #[test]
    fn test_boost_requires_activation() {
        let net = compressor_chain();
        let mut backend = SimplexBackend::new();
        let flow_vars = add_flow_variables(&mut backend, &net);
        add_conservation_constraints(&mut backend, &net, &flow_vars, DemandMode::ExactDemand);
        let params = CompressorParams::from_settings(&Default::default());
        let vars = add_compressor_constraints(&mut backend, &net, &flow_vars, &params);

        let c1 = net
            .points
            .iter()
            .position(|p| p.id.as_str() == "C1")
            .unwrap();
        // Force a boost of at least 100 psi
        let floor = backend.make_constraint(100.0, f64::INFINITY, "force_boost");
        backend.set_coefficient(floor, vars.boost[&c1], 1.0);
        // Penalize activation so it only switches on when required
        backend.objective_set_coefficient(vars.active[&c1], 1.0);
        backend.objective_minimize();

        assert_eq!(backend.solve(), LpStatus::Optimal);
        assert!((backend.value(vars.active[&c1]) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_plan_stages_counts() {
        // Ratio 4 with per-stage cap 2: exactly 2 stages of ratio 2
        let stages = plan_stages(4.0, 2.0);
        assert_eq!(stages.len(), 2);
        assert!((stages[0].ratio - 2.0).abs() < 1e-9);
        assert!(stages[0].intercooled);
        assert!(!stages[1].intercooled);
    }

    #[test]
    fn test_plan_stages_single() {
        let stages = plan_stages(1.5, 2.0);
        assert_eq!(stages.len(), 1);
        assert!(!stages[0].intercooled);
        assert!((stages[0].ratio - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_plan_stages_no_compression_needed() {
        assert!(plan_stages(1.0, 2.0).is_empty());
        assert!(plan_stages(0.8, 2.0).is_empty());
    }

    #[test]
    fn test_stage_ratios_compose() {
        let stages = plan_stages(9.0, 2.5);
        let product: f64 = stages.iter().map(|s| s.ratio).product();
        assert!((product - 9.0).abs() < 1e-9);
        for s in &stages {
            assert!(s.ratio <= 2.5 + 1e-9);
        }
    }
}
