//! Maximize throughput, in LP and greedy augmenting-path renditions.

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

/// LP formulation: maximize weighted receipt outflow plus delivery inflow,
/// delivery absorption capped at demand.
pub struct ThroughputLp;

impl super::OptimizationAlgorithm for ThroughputLp {
    fn name(&self) -> &'static str {
        "throughput-lp"
    }

    fn description(&self) -> &'static str {
        "Maximize network throughput via the LP/MIP back-end"
    }

    fn parameters(&self) -> BTreeMap<&'static str, &'static str> {
        BTreeMap::from([
            ("throughput_weight", "objective weight on receipt outflow (default 1.0)"),
            ("demand_priority", "objective weight on delivery inflow (default 0.5)"),
        ])
    }

    fn can_handle(&self, network: &Network, _settings: &OptimizationSettings) -> bool {
        network.operational_segments().next().is_some()
            && network.active_receipts().next().is_some()
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
            DemandMode::CapAtDemand,
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

        let w_throughput = settings.param("throughput_weight", 1.0);
        let w_demand = settings.param("demand_priority", 0.5);
        let mut objective: BTreeMap<usize, f64> = BTreeMap::new();
        for (p, _) in net.receipts() {
            for &e in &net.outgoing[p] {
                *objective.entry(e).or_insert(0.0) += w_throughput;
            }
        }
        for (p, _) in net.deliveries() {
            for &e in &net.incoming[p] {
                *objective.entry(e).or_insert(0.0) += w_demand;
            }
        }
        for (&e, &coeff) in &objective {
            backend.objective_set_coefficient(flow_vars[e], coeff);
        }
        backend.objective_maximize();

        let status = map_status(backend.solve());
        debug!(%status, "throughput-lp solve finished");

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

        let objective_value: f64 = objective
            .iter()
            .map(|(&e, &c)| c * solution.flows[e])
            .sum();

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
                "throughput {:.2} MMscfd over {} segments",
                result.metrics.total_throughput, result.metrics.active_segment_count
            ));
        }
        Ok(result)
    }
}

/// Greedy augmenting-path max-flow with soft priorities: biggest receipts
/// and biggest deliveries first, depth-first residual paths, repeated until
/// nothing above the flow threshold can move.
pub struct ThroughputGraph;

impl super::OptimizationAlgorithm for ThroughputGraph {
    fn name(&self) -> &'static str {
        "throughput-graph"
    }

    fn description(&self) -> &'static str {
        "Maximize throughput with greedy residual augmenting paths"
    }

    fn parameters(&self) -> BTreeMap<&'static str, &'static str> {
        BTreeMap::new()
    }

    fn can_handle(&self, network: &Network, _settings: &OptimizationSettings) -> bool {
        network.operational_segments().next().is_some()
            && network.active_receipts().next().is_some()
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

        // Largest supply and largest demand first
        let mut receipts: Vec<(usize, f64)> =
            net.receipts().map(|(p, d)| (p, d.supply())).collect();
        receipts.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        let mut deliveries: Vec<(usize, f64)> =
            net.deliveries().map(|(p, d)| (p, d.demand())).collect();
        deliveries.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

        let mut supply_left: BTreeMap<usize, f64> = receipts.iter().cloned().collect();
        let mut demand_left: BTreeMap<usize, f64> = deliveries.iter().cloned().collect();

        for &(r, _) in &receipts {
            for &(d, _) in &deliveries {
                loop {
                    if supply_left[&r] <= threshold || demand_left[&d] <= threshold {
                        break;
                    }
                    let Some((path, bottleneck)) = residual.find_augmenting_path(r, d, threshold)
                    else {
                        break;
                    };
                    let amount = bottleneck.min(supply_left[&r]).min(demand_left[&d]);
                    if amount <= threshold {
                        break;
                    }
                    residual.augment_along(&path, amount);
                    *supply_left.get_mut(&r).unwrap() -= amount;
                    *demand_left.get_mut(&d).unwrap() -= amount;
                }
            }
        }

        let solution = SolutionData {
            flows: residual.flows.clone(),
            ..Default::default()
        };
        let moved: f64 = deliveries
            .iter()
            .map(|(d, want)| want - demand_left[d])
            .sum();

        let mut result = build_result(
            self.name(),
            "graph",
            SolveStatus::Feasible,
            &net,
            &solution,
            settings,
            moved,
            started,
        );
        result.add_message(format!(
            "greedy augmentation delivered {:.2} of {:.2} MMscfd demanded",
            moved,
            net.total_demand()
        ));
        Ok(result)
    }
}
