//! Pressure-squared constraint system and its validation.
//!
//! Per active point `u` the model carries `psq(u) ∈ [Pmin(u)², Pmax(u)²]`.
//! Per operational segment `(u→v)` with drop constant `k`, an auxiliary
//! variable `fsq` approximates `f²` from below through the secants of the
//! parabola over `[0, capacity]`, and the drop constraint reads
//!
//! `psq(u) − psq(v) + 2·P̄(c)·boost(c) ≥ k·fsq`
//!
//! where the boost term exists only when `v` is a compressor `c` with a
//! boost variable, linearized at the midpoint `P̄(c)` of its pressure
//! window. The same gain is applied by the post-solve validator so the two
//! agree on feasibility.

use std::collections::BTreeMap;

use gasnet_core::hydraulics::PiecewiseLinear;
use gasnet_solver::{LpBackend, VarId};
use tracing::debug;

use crate::model::{FlowNetwork, PointRole};
use crate::settings::OptimizationSettings;
use crate::OptimizeError;

/// Variables created by [`add_pressure_constraints`].
#[derive(Debug, Clone)]
pub struct PressureVars {
    /// Squared pressure per point index
    pub psq: Vec<VarId>,
    /// Linearized flow-squared per segment index
    pub fsq: Vec<VarId>,
}

/// Emit the pressure constraint system.
///
/// The quadratic form is used only when the back-end supports it and the
/// settings do not force the linear approximation; neither shipped back-end
/// does, so in practice this always emits the piecewise-linear system, which
/// is the mandated fallback. `boost_vars` maps compressor point indices to
/// their boost variables when the compressor system is active; without it
/// compressors are modeled as plain pass-through points.
pub fn add_pressure_constraints(
    backend: &mut dyn LpBackend,
    net: &FlowNetwork,
    flow_vars: &[VarId],
    boost_vars: Option<&BTreeMap<usize, VarId>>,
    settings: &OptimizationSettings,
) -> Result<PressureVars, OptimizeError> {
    if !settings.use_linear_pressure_approximation && !backend.supports_quadratic() {
        debug!(
            backend = backend.id(),
            "quadratic pressure form requested but unsupported; using piecewise-linear"
        );
    }
    let segments = settings.linear_approximation_segments.clamp(1, 100);

    let psq: Vec<VarId> = net
        .points
        .iter()
        .map(|p| {
            backend.make_num_var(
                p.pmin * p.pmin,
                p.pmax * p.pmax,
                &format!("psq[{}]", p.id),
            )
        })
        .collect();

    let mut fsq = Vec::with_capacity(net.segments.len());
    for (e, segment) in net.segments.iter().enumerate() {
        let cap = segment.capacity;
        let fsq_var = backend.make_num_var(0.0, cap * cap, &format!("fsq[{}]", segment.id));

        let table = PiecewiseLinear::square_over(cap, segments).ok_or_else(|| {
            OptimizeError::DataValidation(format!(
                "segment {} has non-positive capacity {}",
                segment.id, cap
            ))
        })?;
        for (i, secant) in table.secants().iter().enumerate() {
            // fsq >= slope·f + intercept over each interval
            let row = backend.make_constraint(
                secant.intercept,
                f64::INFINITY,
                &format!("fsq_secant[{}][{}]", segment.id, i),
            );
            backend.set_coefficient(row, fsq_var, 1.0);
            backend.set_coefficient(row, flow_vars[e], -secant.slope);
        }

        // psq(u) - psq(v) - k·fsq (+ boost gain at a compressor head) >= 0
        let row = backend.make_constraint(0.0, f64::INFINITY, &format!("drop[{}]", segment.id));
        backend.set_coefficient(row, psq[segment.from], 1.0);
        backend.set_coefficient(row, psq[segment.to], -1.0);
        backend.set_coefficient(row, fsq_var, -segment.k);
        if let Some(boosts) = boost_vars {
            if let Some(&boost) = boosts.get(&segment.to) {
                let anchor = net.points[segment.to].nominal_pressure();
                backend.set_coefficient(row, boost, 2.0 * anchor);
            }
        }

        fsq.push(fsq_var);
    }

    Ok(PressureVars { psq, fsq })
}

/// Post-solve check of the quadratic relations the LP only approximated.
///
/// Returns one violation string per broken window or drop relation.
pub fn validate_pressures(
    net: &FlowNetwork,
    flows: &[f64],
    psq: &[f64],
    boost: &BTreeMap<usize, f64>,
    eps: f64,
) -> Vec<String> {
    let mut violations = Vec::new();

    for (p, point) in net.points.iter().enumerate() {
        let pressure = psq[p].max(0.0).sqrt();
        if pressure < point.pmin - eps || pressure > point.pmax + eps {
            violations.push(format!(
                "point {}: pressure {:.2} psia outside window [{:.2}, {:.2}]",
                point.id, pressure, point.pmin, point.pmax
            ));
        }
    }

    for (e, segment) in net.segments.iter().enumerate() {
        let flow = flows[e];
        let drop_required = segment.k * flow * flow.abs();
        let gain = boost
            .get(&segment.to)
            .map(|b| 2.0 * net.points[segment.to].nominal_pressure() * b)
            .unwrap_or(0.0);
        let available = psq[segment.from] - psq[segment.to] + gain;
        if available < drop_required - eps {
            violations.push(format!(
                "segment {}: pressure drop {:.2} psia² exceeds available {:.2} psia²",
                segment.id, drop_required, available
            ));
        }
    }

    violations
}

/// Optimizer-independent pressure estimate.
///
/// Receipt points anchor at their observed pressure; every other point is
/// the flow-weighted mean over its inflowing segments of
/// `√max(0, P²(u) − k·f²)`, recursed upstream. A path-scoped visited set
/// breaks cycles by falling back to the point's observed pressure.
pub fn estimate_pressures(net: &FlowNetwork, flows: &[f64]) -> Vec<f64> {
    let mut cache: Vec<Option<f64>> = vec![None; net.points.len()];
    let mut path = vec![false; net.points.len()];
    (0..net.points.len())
        .map(|p| pressure_of(net, flows, p, &mut cache, &mut path))
        .collect()
}

fn pressure_of(
    net: &FlowNetwork,
    flows: &[f64],
    p: usize,
    cache: &mut Vec<Option<f64>>,
    path: &mut Vec<bool>,
) -> f64 {
    if let Some(v) = cache[p] {
        return v;
    }
    let point = &net.points[p];
    if matches!(point.role, PointRole::Receipt { .. }) || path[p] {
        return point.current_pressure;
    }

    path[p] = true;
    let mut weighted = 0.0;
    let mut total_flow = 0.0;
    for &e in &net.incoming[p] {
        let flow = flows[e];
        if flow <= 1e-9 {
            continue;
        }
        let segment = &net.segments[e];
        let upstream = pressure_of(net, flows, segment.from, cache, path);
        let downstream_sq = (upstream * upstream - segment.k * flow * flow).max(0.0);
        weighted += flow * downstream_sq.sqrt();
        total_flow += flow;
    }
    path[p] = false;

    let pressure = if total_flow > 0.0 {
        weighted / total_flow
    } else {
        point.current_pressure
    };
    cache[p] = Some(pressure);
    pressure
}

#[cfg(test)]
mod tests {
    use super::*;
    use gasnet_core::{Network, Point, PointId, Segment};
    use gasnet_solver::{LpStatus, SimplexBackend};

    use crate::model::{
        add_conservation_constraints, add_flow_variables, DemandMode, FlowNetwork,
    };

    fn chain() -> FlowNetwork {
        let mut network = Network::new("chain", "");
        network.add_point(
            Point::receipt("R1", "R1", 1000.0, 0.0).with_pressure_window(800.0, 1000.0),
        );
        network.add_point(Point::delivery("D1", "D1", 600.0).with_pressure_window(300.0, 800.0));
        network.add_segment(
            Segment::new("S1", "R1-D1", "R1", "D1", 800.0).with_geometry(50.0, 36.0, 0.015),
        );
        network.recompute_drop_constants();
        // Anchor the receipt at the top of its window
        network
            .points
            .get_mut(&PointId::new("R1"))
            .unwrap()
            .current_pressure = gasnet_core::Psia(950.0);
        FlowNetwork::extract(&network).unwrap()
    }

    #[test]
    fn test_lp_with_pressure_is_feasible_on_easy_chain() {
        let net = chain();
        let mut backend = SimplexBackend::new();
        let flow_vars = add_flow_variables(&mut backend, &net);
        add_conservation_constraints(&mut backend, &net, &flow_vars, DemandMode::ExactDemand);
        add_pressure_constraints(&mut backend, &net, &flow_vars, None, &Default::default()).unwrap();
        backend.objective_minimize();
        // The chain's k is tiny, so the window difference absorbs the drop
        assert_eq!(backend.solve(), LpStatus::Optimal);
    }

    #[test]
    fn test_validate_pressures_flags_excess_drop() {
        let net = chain();
        let k = net.segments[0].k;
        let flow = 600.0;
        // Downstream pressure chosen so the available drop is half of required
        let psq_up = 900.0_f64 * 900.0;
        let required = k * flow * flow;
        let psq_down = psq_up - required / 2.0;
        let violations = validate_pressures(
            &net,
            &[flow],
            &[psq_down, psq_up], // id order: D1, R1
            &BTreeMap::new(),
            1e-6,
        );
        assert_eq!(violations.len(), 1);
        assert!(violations[0].contains("segment S1"));
    }

    #[test]
    fn test_validate_pressures_window() {
        let net = chain();
        // D1 below its 300 psia floor
        let violations = validate_pressures(
            &net,
            &[0.0],
            &[200.0 * 200.0, 900.0 * 900.0],
            &BTreeMap::new(),
            1e-6,
        );
        assert!(violations.iter().any(|v| v.contains("point D1")));
    }

    #[test]
    fn test_estimate_pressures_chain() {
        let net = chain();
        let pressures = estimate_pressures(&net, &[600.0]);
        // id order: D1 then R1
        let (d1, r1) = (pressures[0], pressures[1]);
        assert!((r1 - 950.0).abs() < 1e-9);
        let k = net.segments[0].k;
        let expected = (950.0_f64 * 950.0 - k * 600.0 * 600.0).sqrt();
        assert!((d1 - expected).abs() < 1e-6);
        assert!(d1 < r1);
    }

    #[test]
    fn test_estimate_pressures_no_flow_falls_back() {
        let net = chain();
        let pressures = estimate_pressures(&net, &[0.0]);
        // Without inflow the delivery reports its observed pressure
        assert!((pressures[0] - net.points[0].current_pressure).abs() < 1e-9);
    }
}
