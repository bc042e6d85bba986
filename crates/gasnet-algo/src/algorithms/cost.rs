//! Minimize operating cost, in LP and cheapest-path renditions.

use std::collections::BTreeMap;
use std::time::Instant;

use gasnet_core::Network;
use tracing::debug;

use crate::compressor::{add_compressor_constraints, CompressorParams};
use crate::graph::ResidualNetwork;
use crate::model::{
    add_conservation_constraints, add_flow_variables, build_result, create_backend, map_status,
    DemandMode, FlowNetwork, SolutionData,
};
use crate::pressure::add_pressure_constraints;
use crate::result::{OptimizationResult, SolveStatus};
use crate::settings::OptimizationSettings;
use crate::OptimizeError;

/// LP formulation: explicit transportation, fuel, and compressor cost
/// variables summed into a total that the back-end minimizes; delivery
/// inflow pinned at demand.
pub struct CostLp;

impl super::OptimizationAlgorithm for CostLp {
    fn name(&self) -> &'static str {
        "cost-lp"
    }

    fn description(&self) -> &'static str {
        "Minimize total operating cost via the LP/MIP back-end"
    }

    fn parameters(&self) -> BTreeMap<&'static str, &'static str> {
        BTreeMap::from([
            ("fuel_price", "$/MMscf applied to compressor fuel (default 3.0)"),
            ("boost_cost_rate", "$/psi of compressor boost (default 0.001)"),
            ("compressor_min_flow", "MMscfd a running compressor must move (default 10)"),
            ("compressor_base_fuel", "standing fuel draw in MMscfd (default 0.5)"),
            ("boost_fuel_rate", "extra fuel per psi of boost (default 0.001)"),
        ])
    }

    fn can_handle(&self, network: &Network, _settings: &OptimizationSettings) -> bool {
        network.operational_segments().next().is_some()
            && network.active_deliveries().next().is_some()
            && network
                .segments
                .values()
                .all(|s| s.transportation_cost.value() >= 0.0)
    }

    fn optimize(
        &self,
        network: &Network,
        settings: &OptimizationSettings,
    ) -> Result<OptimizationResult, OptimizeError> {
        let started = Instant::now();
        let net = FlowNetwork::extract(network)?;
        let mut backend = create_backend(settings)?;

        let flow_vars = add_flow_variables(backend.as_mut(), &net);
        add_conservation_constraints(
            backend.as_mut(),
            &net,
            &flow_vars,
            DemandMode::ExactDemand,
        );

        let comp_vars = if settings.enable_compressor_stations {
            let params = CompressorParams::from_settings(settings);
            Some(add_compressor_constraints(
                backend.as_mut(),
                &net,
                &flow_vars,
                &params,
            ))
        } else {
            None
        };
        let pressure_vars = if settings.enable_pressure_constraints {
            Some(add_pressure_constraints(
                backend.as_mut(),
                &net,
                &flow_vars,
                comp_vars.as_ref().map(|c| &c.boost),
                settings,
            )?)
        } else {
            None
        };

        // tc_e = cost_e · f_e, one equality row per segment
        let mut transport_vars = Vec::with_capacity(net.segments.len());
        let mut total_lo = 0.0;
        let mut total_hi = 0.0;
        for (e, segment) in net.segments.iter().enumerate() {
            let lo = (segment.cost * segment.min_flow).min(0.0);
            let hi = segment.cost * segment.capacity;
            total_lo += lo;
            total_hi += hi;
            let tc = backend.make_num_var(lo, hi, &format!("tc[{}]", segment.id));
            let row =
                backend.make_constraint(0.0, 0.0, &format!("tc_link[{}]", segment.id));
            backend.set_coefficient(row, tc, 1.0);
            backend.set_coefficient(row, flow_vars[e], -segment.cost);
            transport_vars.push(tc);
        }

        // fc_c = π_fuel · fuel_c and cc_c = π_boost · boost_c
        let fuel_price = settings.param("fuel_price", 3.0);
        let boost_cost_rate = settings.param("boost_cost_rate", 0.001);
        let mut cost_component_vars = Vec::new();
        if let Some(cv) = &comp_vars {
            for (&p, &fuel) in &cv.fuel {
                let id = &net.points[p].id;
                let fc = backend.make_num_var(0.0, f64::INFINITY, &format!("fc[{}]", id));
                let row = backend.make_constraint(0.0, 0.0, &format!("fc_link[{}]", id));
                backend.set_coefficient(row, fc, 1.0);
                backend.set_coefficient(row, fuel, -fuel_price);
                cost_component_vars.push(fc);
                total_hi += 1.0e9;
            }
            for (&p, &boost) in &cv.boost {
                let id = &net.points[p].id;
                let cc = backend.make_num_var(0.0, f64::INFINITY, &format!("cc[{}]", id));
                let row = backend.make_constraint(0.0, 0.0, &format!("cc_link[{}]", id));
                backend.set_coefficient(row, cc, 1.0);
                backend.set_coefficient(row, boost, -boost_cost_rate);
                cost_component_vars.push(cc);
                total_hi += 1.0e9;
            }
        }

        // total_cost = Σ tc + Σ fc + Σ cc, the single objective variable
        let total = backend.make_num_var(total_lo, total_hi, "total_cost");
        let total_row = backend.make_constraint(0.0, 0.0, "total_cost_link");
        backend.set_coefficient(total_row, total, 1.0);
        for &tc in &transport_vars {
            backend.set_coefficient(total_row, tc, -1.0);
        }
        for &component in &cost_component_vars {
            backend.set_coefficient(total_row, component, -1.0);
        }
        backend.objective_set_coefficient(total, 1.0);
        backend.objective_minimize();

        let status = map_status(backend.solve());
        debug!(%status, "cost-lp solve finished");

        let mut solution = SolutionData {
            flows: flow_vars.iter().map(|&v| backend.value(v)).collect(),
            ..Default::default()
        };
        if let Some(pv) = &pressure_vars {
            solution.psq = Some(pv.psq.iter().map(|&v| backend.value(v)).collect());
        }
        if let Some(cv) = &comp_vars {
            solution.boost = cv.boost.iter().map(|(&p, &v)| (p, backend.value(v))).collect();
            solution.fuel = cv.fuel.iter().map(|(&p, &v)| (p, backend.value(v))).collect();
        }

        let mut result = build_result(
            self.name(),
            backend.id(),
            status,
            &net,
            &solution,
            settings,
            backend.value(total),
            started,
        );
        if status.has_solution() {
            result.add_message(format!(
                "total cost ${:.2} ({:.2} transportation)",
                result.cost_breakdown.total(),
                result.cost_breakdown.transportation
            ));
        } else if status == SolveStatus::Infeasible {
            result.add_message("demand cannot be met within segment capacities".to_string());
        }
        Ok(result)
    }
}

/// Cheapest-path heuristic: deliveries in descending demand order, each
/// served by repeated multi-source Dijkstra over receipts with remaining
/// supply; infeasible when demand is left but no path remains.
pub struct CostGraph;

impl super::OptimizationAlgorithm for CostGraph {
    fn name(&self) -> &'static str {
        "cost-graph"
    }

    fn description(&self) -> &'static str {
        "Minimize cost with successive cheapest residual paths"
    }

    fn parameters(&self) -> BTreeMap<&'static str, &'static str> {
        BTreeMap::new()
    }

    fn can_handle(&self, network: &Network, _settings: &OptimizationSettings) -> bool {
        network.operational_segments().next().is_some()
            && network.active_deliveries().next().is_some()
            && network
                .segments
                .values()
                .all(|s| s.transportation_cost.value() >= 0.0)
    }

    fn optimize(
        &self,
        network: &Network,
        settings: &OptimizationSettings,
    ) -> Result<OptimizationResult, OptimizeError> {
        let started = Instant::now();
        let net = FlowNetwork::extract(network)?;
        let threshold = settings.minimum_flow_threshold;
        let mut residual = ResidualNetwork::build(&net);

        let mut supply_left: BTreeMap<usize, f64> =
            net.receipts().map(|(p, d)| (p, d.supply())).collect();

        let mut deliveries: Vec<(usize, f64)> =
            net.deliveries().map(|(p, d)| (p, d.demand())).collect();
        deliveries.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

        let mut infeasible_at: Option<usize> = None;
        'deliveries: for &(d, demand) in &deliveries {
            let mut remaining = demand;
            while remaining > threshold {
                let sources: Vec<usize> = supply_left
                    .iter()
                    .filter(|(_, &s)| s > threshold)
                    .map(|(&p, _)| p)
                    .collect();
                let Some(path) = residual.cheapest_forward_path(&sources, d, threshold) else {
                    infeasible_at = Some(d);
                    break 'deliveries;
                };
                let amount = path
                    .bottleneck
                    .min(remaining)
                    .min(supply_left[&path.source]);
                if amount <= threshold {
                    infeasible_at = Some(d);
                    break 'deliveries;
                }
                residual.augment_along(&path.edges, amount);
                *supply_left.get_mut(&path.source).unwrap() -= amount;
                remaining -= amount;
            }
        }

        let solution = SolutionData {
            flows: residual.flows.clone(),
            ..Default::default()
        };
        let transport: f64 = net
            .segments
            .iter()
            .enumerate()
            .map(|(e, s)| solution.flows[e].abs() * s.cost)
            .sum();

        let status = if infeasible_at.is_some() {
            SolveStatus::Infeasible
        } else {
            SolveStatus::Feasible
        };
        let mut result = build_result(
            self.name(),
            "graph",
            status,
            &net,
            &solution,
            settings,
            transport,
            started,
        );
        match infeasible_at {
            Some(d) => result.add_message(format!(
                "no residual path can finish serving delivery {}",
                net.points[d].id
            )),
            None => result.add_message(format!("all demand served at ${:.2}", transport)),
        }
        Ok(result)
    }
}
