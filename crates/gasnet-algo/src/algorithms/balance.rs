//! Balance segment utilization, in LP and multi-path renditions.

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

/// Paths per receipt-delivery pair stop being enumerated beyond this depth.
const MAX_PATH_DEPTH: usize = 25;
/// Enumeration cap per receipt-delivery pair.
const MAX_PATHS_PER_PAIR: usize = 200;
/// A path is eligible for more flow while its worst segment stays below this.
const UTILIZATION_CEILING: f64 = 0.95;

/// LP formulation: per-segment utilization, its mean, and absolute
/// deviations, with the deviation sum penalized against throughput and cost
/// rewards; delivery inflow pinned at demand.
pub struct BalanceLp;

impl super::OptimizationAlgorithm for BalanceLp {
    fn name(&self) -> &'static str {
        "balance-lp"
    }

    fn description(&self) -> &'static str {
        "Even out segment utilization via the LP/MIP back-end"
    }

    fn parameters(&self) -> BTreeMap<&'static str, &'static str> {
        BTreeMap::from([
            ("balance_weight", "penalty on utilization deviation (default 1.0)"),
            ("throughput_weight", "reward on receipt outflow (default 0.1)"),
            ("cost_weight", "penalty on transportation cost (default 0.01)"),
        ])
    }

    fn can_handle(&self, network: &Network, _settings: &OptimizationSettings) -> bool {
        network.active_receipts().next().is_some()
            && network.active_deliveries().next().is_some()
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

        // u_e = 100·f_e/cap_e, linearized for directed flow
        let n_segments = net.segments.len();
        let mut util_vars = Vec::with_capacity(n_segments);
        for (e, segment) in net.segments.iter().enumerate() {
            let lo = 100.0 * segment.min_flow / segment.capacity;
            let u = backend.make_num_var(lo.min(0.0), 100.0, &format!("util[{}]", segment.id));
            let row = backend.make_constraint(0.0, 0.0, &format!("util_link[{}]", segment.id));
            backend.set_coefficient(row, u, 1.0);
            backend.set_coefficient(row, flow_vars[e], -100.0 / segment.capacity);
            util_vars.push(u);
        }

        // ū with Σu − n·ū = 0
        let mean = backend.make_num_var(-100.0, 100.0, "util_mean");
        let mean_row = backend.make_constraint(0.0, 0.0, "util_mean_link");
        for &u in &util_vars {
            backend.set_coefficient(mean_row, u, 1.0);
        }
        backend.set_coefficient(mean_row, mean, -(n_segments as f64));

        // d_e ≥ |u_e − ū|
        let mut deviation_vars = Vec::with_capacity(n_segments);
        for (e, segment) in net.segments.iter().enumerate() {
            let d = backend.make_num_var(0.0, 200.0, &format!("dev[{}]", segment.id));
            let above = backend.make_constraint(0.0, f64::INFINITY, &format!("dev_hi[{}]", segment.id));
            backend.set_coefficient(above, d, 1.0);
            backend.set_coefficient(above, util_vars[e], -1.0);
            backend.set_coefficient(above, mean, 1.0);
            let below = backend.make_constraint(0.0, f64::INFINITY, &format!("dev_lo[{}]", segment.id));
            backend.set_coefficient(below, d, 1.0);
            backend.set_coefficient(below, util_vars[e], 1.0);
            backend.set_coefficient(below, mean, -1.0);
            deviation_vars.push(d);
        }

        let w_balance = settings.param("balance_weight", 1.0);
        let w_throughput = settings.param("throughput_weight", 0.1);
        let w_cost = settings.param("cost_weight", 0.01);

        let mut flow_coeffs: BTreeMap<usize, f64> = BTreeMap::new();
        for (p, _) in net.receipts() {
            for &e in &net.outgoing[p] {
                *flow_coeffs.entry(e).or_insert(0.0) += w_throughput;
            }
        }
        for (e, segment) in net.segments.iter().enumerate() {
            *flow_coeffs.entry(e).or_insert(0.0) -= w_cost * segment.cost;
        }
        for (&e, &coeff) in &flow_coeffs {
            backend.objective_set_coefficient(flow_vars[e], coeff);
        }
        for &d in &deviation_vars {
            backend.objective_set_coefficient(d, -w_balance);
        }
        backend.objective_maximize();

        let status = map_status(backend.solve());
        debug!(%status, "balance-lp solve finished");

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

        let deviation_total: f64 = deviation_vars.iter().map(|&v| backend.value(v)).sum();
        let objective_value: f64 = flow_coeffs
            .iter()
            .map(|(&e, &c)| c * solution.flows[e])
            .sum::<f64>()
            - w_balance * deviation_total;

        let mut result = build_result(
            self.name(),
            backend.id(),
            status,
            &net,
            &solution,
            settings,
            objective_value,
            started,
        );
        if status.has_solution() {
            result.add_message(format!(
                "utilization variance {:.2} over {} populated segments",
                result.metrics.utilization_variance, result.metrics.active_segment_count
            ));
        }
        Ok(result)
    }
}

/// Multi-path distribution: enumerate simple paths per receipt-delivery
/// pair (bounded), then round-robin equal shares of remaining demand over
/// paths whose worst segment is still under the utilization ceiling.
pub struct BalanceGraph;

impl super::OptimizationAlgorithm for BalanceGraph {
    fn name(&self) -> &'static str {
        "balance-graph"
    }

    fn description(&self) -> &'static str {
        "Even out utilization with load-balanced multi-path distribution"
    }

    fn parameters(&self) -> BTreeMap<&'static str, &'static str> {
        BTreeMap::from([(
            "target_utilization",
            "preferred utilization percentage used to order paths (default 70)",
        )])
    }

    fn can_handle(&self, network: &Network, _settings: &OptimizationSettings) -> bool {
        network.active_receipts().next().is_some()
            && network.active_deliveries().next().is_some()
    }

    fn optimize(
        &self,
        network: &Network,
        settings: &OptimizationSettings,
    ) -> Result<OptimizationResult, OptimizeError> {
        let started = Instant::now();
        let net = FlowNetwork::extract(network)?;
        let threshold = settings.minimum_flow_threshold;
        let target = settings.param("target_utilization", 70.0) / 100.0;
        let mut residual = ResidualNetwork::build(&net);

        let mut supply_left: BTreeMap<usize, f64> =
            net.receipts().map(|(p, d)| (p, d.supply())).collect();

        let mut deliveries: Vec<(usize, f64)> =
            net.deliveries().map(|(p, d)| (p, d.demand())).collect();
        deliveries.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

        let mut unmet_total = 0.0;
        for &(d, demand) in &deliveries {
            // Each path remembers which receipt feeds it
            let mut paths: Vec<(usize, Vec<petgraph::graph::EdgeIndex>)> = Vec::new();
            for (r, _) in net.receipts() {
                for path in residual.enumerate_forward_paths(
                    r,
                    d,
                    threshold,
                    MAX_PATH_DEPTH,
                    MAX_PATHS_PER_PAIR,
                ) {
                    paths.push((r, path));
                }
            }

            let mut remaining = demand;
            loop {
                if remaining <= threshold {
                    break;
                }
                let mut eligible: Vec<usize> = (0..paths.len())
                    .filter(|&i| {
                        let (r, path) = &paths[i];
                        residual.max_utilization(path) < UTILIZATION_CEILING
                            && residual.path_residual(path) > threshold
                            && supply_left[r] > threshold
                    })
                    .collect();
                if eligible.is_empty() {
                    break;
                }
                // Fill the paths furthest below the target first
                eligible.sort_by(|&a, &b| {
                    let ua = residual.max_utilization(&paths[a].1);
                    let ub = residual.max_utilization(&paths[b].1);
                    (ua - target)
                        .abs()
                        .total_cmp(&(ub - target).abs())
                        .then(a.cmp(&b))
                });

                let share = remaining / eligible.len() as f64;
                let mut pushed_any = false;
                for &i in &eligible {
                    if remaining <= threshold {
                        break;
                    }
                    let (r, path) = &paths[i];
                    // Do not let one push lift the path's worst segment past
                    // the ceiling
                    let headroom = residual.path_ceiling_headroom(path, UTILIZATION_CEILING);
                    let amount = share
                        .min(remaining)
                        .min(residual.path_residual(path))
                        .min(supply_left[r])
                        .min(headroom);
                    if amount <= threshold {
                        continue;
                    }
                    residual.augment_along(path, amount);
                    *supply_left.get_mut(r).unwrap() -= amount;
                    remaining -= amount;
                    pushed_any = true;
                }
                if !pushed_any {
                    break;
                }
            }
            unmet_total += remaining.max(0.0);
        }

        let solution = SolutionData {
            flows: residual.flows.clone(),
            ..Default::default()
        };
        let served = net.total_demand() - unmet_total;

        let mut result = build_result(
            self.name(),
            "graph",
            SolveStatus::Feasible,
            &net,
            &solution,
            settings,
            served,
            started,
        );
        if unmet_total > threshold {
            result.add_message(format!(
                "{:.2} MMscfd left unserved at the {:.0}% utilization ceiling",
                unmet_total,
                UTILIZATION_CEILING * 100.0
            ));
        }
        result.add_message(format!(
            "utilization variance {:.2}",
            result.metrics.utilization_variance
        ));
        Ok(result)
    }
}
