//! Post-solution validation: cross-check solver output against the physics
//! the formulation was supposed to encode.
//!
//! A back-end claiming `Optimal` can still hand back a solution that breaks
//! conservation, capacity, or pressure when the formulation was wrong or the
//! back-end's tolerances leaked. These checks are deliberately independent
//! of the formulation code: they recompute every balance from the result's
//! flow records and the network itself.

use gasnet_core::{Network, PointKind};

use crate::result::OptimizationResult;
use crate::settings::OptimizationSettings;

/// Run every applicable check; one string per violation found.
pub fn validate_result(
    network: &Network,
    result: &OptimizationResult,
    settings: &OptimizationSettings,
) -> Vec<String> {
    let eps = settings.feasibility_tolerance;
    let mut violations = Vec::new();
    check_flow_conservation(network, result, eps, &mut violations);
    check_capacity_limits(network, result, eps, &mut violations);
    if settings.enable_pressure_constraints {
        check_pressure_windows(network, result, eps, &mut violations);
        check_pressure_drops(network, result, eps, &mut violations);
    }
    violations
}

fn check_flow_conservation(
    network: &Network,
    result: &OptimizationResult,
    eps: f64,
    violations: &mut Vec<String>,
) {
    for point in network.active_points() {
        let inflow: f64 = network
            .incoming(&point.id)
            .iter()
            .map(|s| result.flow(s.id.as_str()))
            .sum();
        let outflow: f64 = network
            .outgoing(&point.id)
            .iter()
            .map(|s| result.flow(s.id.as_str()))
            .sum();
        let net_inflow = inflow - outflow;

        match &point.kind {
            PointKind::Receipt {
                supply_capacity, ..
            } => {
                let injected = -net_inflow;
                if injected < -eps || injected > supply_capacity.value() + eps {
                    violations.push(format!(
                        "receipt {}: injection {:.4} MMscfd outside [0, {:.4}]",
                        point.id,
                        injected,
                        supply_capacity.value()
                    ));
                }
            }
            PointKind::Delivery {
                demand_requirement,
            } => {
                if net_inflow < -eps || net_inflow > demand_requirement.value() + eps {
                    violations.push(format!(
                        "delivery {}: absorption {:.4} MMscfd outside [0, {:.4}]",
                        point.id,
                        net_inflow,
                        demand_requirement.value()
                    ));
                }
            }
            PointKind::Compressor { .. } => {
                if net_inflow.abs() > eps {
                    violations.push(format!(
                        "compressor {}: imbalance {:.6} MMscfd",
                        point.id, net_inflow
                    ));
                }
            }
        }
    }
}

fn check_capacity_limits(
    network: &Network,
    result: &OptimizationResult,
    eps: f64,
    violations: &mut Vec<String>,
) {
    for segment in network.operational_segments() {
        let flow = result.flow(segment.id.as_str());
        if flow > segment.capacity.value() + eps {
            violations.push(format!(
                "segment {}: flow {:.4} exceeds capacity {:.4}",
                segment.id,
                flow,
                segment.capacity.value()
            ));
        }
        if flow < segment.effective_min_flow().value() - eps {
            violations.push(format!(
                "segment {}: flow {:.4} below minimum {:.4}",
                segment.id,
                flow,
                segment.effective_min_flow().value()
            ));
        }
    }
}

fn check_pressure_windows(
    network: &Network,
    result: &OptimizationResult,
    eps: f64,
    violations: &mut Vec<String>,
) {
    for point in network.active_points() {
        let Some(record) = result.point_pressures.get(point.id.as_str()) else {
            continue;
        };
        if record.pressure < point.min_pressure.value() - eps
            || record.pressure > point.max_pressure.value() + eps
        {
            violations.push(format!(
                "point {}: pressure {:.2} psia outside [{:.2}, {:.2}]",
                point.id,
                record.pressure,
                point.min_pressure.value(),
                point.max_pressure.value()
            ));
        }
    }
}

fn check_pressure_drops(
    network: &Network,
    result: &OptimizationResult,
    eps: f64,
    violations: &mut Vec<String>,
) {
    for segment in network.operational_segments() {
        let (Some(up), Some(down)) = (
            result.point_pressures.get(segment.from_point.as_str()),
            result.point_pressures.get(segment.to_point.as_str()),
        ) else {
            continue;
        };
        let flow = result.flow(segment.id.as_str());
        let required = segment.pressure_drop_constant * flow * flow.abs();
        // A boosting compressor at the head relaxes the drop, linearized at
        // the window midpoint exactly as the formulation does
        let gain = network
            .point(&segment.to_point)
            .filter(|p| p.is_compressor())
            .map(|p| 2.0 * p.nominal_pressure().value() * down.boost)
            .unwrap_or(0.0);
        let available = up.pressure_sq - down.pressure_sq + gain;
        if available < required - eps {
            violations.push(format!(
                "segment {}: available drop {:.2} psia² below required {:.2} psia²",
                segment.id, available, required
            ));
        }
    }
}
