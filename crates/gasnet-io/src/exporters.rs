//! Write networks and optimization results back out as JSON.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use gasnet_algo::OptimizationResult;
use gasnet_core::{Network, PointKind};
use tracing::info;

use crate::schema::{NetworkJson, PointJson, SegmentJson};

/// Project a network onto the wire schema.
pub fn network_to_json(network: &Network) -> NetworkJson {
    let points = network
        .points
        .values()
        .map(|point| {
            let mut json = PointJson {
                id: point.id.as_str().to_string(),
                name: point.name.clone(),
                point_type: point.kind.tag().to_string(),
                x: point.x,
                y: point.y,
                is_active: point.is_active,
                min_pressure: point.min_pressure.value(),
                max_pressure: point.max_pressure.value(),
                current_pressure: point.current_pressure.value(),
                supply_capacity: None,
                demand_requirement: None,
                max_pressure_boost: None,
                fuel_consumption_rate: None,
                unit_cost: None,
            };
            match &point.kind {
                PointKind::Receipt {
                    supply_capacity,
                    unit_cost,
                } => {
                    json.supply_capacity = Some(supply_capacity.value());
                    json.unit_cost = Some(unit_cost.value());
                }
                PointKind::Delivery {
                    demand_requirement,
                } => {
                    json.demand_requirement = Some(demand_requirement.value());
                }
                PointKind::Compressor {
                    max_pressure_boost,
                    fuel_consumption_rate,
                } => {
                    json.max_pressure_boost = Some(max_pressure_boost.value());
                    json.fuel_consumption_rate = Some(*fuel_consumption_rate);
                }
            }
            (json.id.clone(), json)
        })
        .collect();

    let segments = network
        .segments
        .values()
        .map(|segment| {
            let json = SegmentJson {
                id: segment.id.as_str().to_string(),
                name: segment.name.clone(),
                from_point_id: segment.from_point.as_str().to_string(),
                to_point_id: segment.to_point.as_str().to_string(),
                capacity: segment.capacity.value(),
                length: segment.length.value(),
                diameter: segment.diameter.value(),
                friction_factor: segment.friction_factor,
                transportation_cost: segment.transportation_cost.value(),
                current_flow: segment.current_flow.value(),
                is_active: segment.is_active,
                is_bidirectional: segment.is_bidirectional,
                min_flow: segment.min_flow.value(),
            };
            (json.id.clone(), json)
        })
        .collect();

    NetworkJson {
        name: network.name.clone(),
        description: network.description.clone(),
        points,
        segments,
    }
}

/// Serialize a network to a pretty JSON string.
pub fn network_to_string(network: &Network) -> Result<String> {
    serde_json::to_string_pretty(&network_to_json(network))
        .context("serializing network configuration")
}

/// Write a network configuration file.
pub fn save_network_to_path(network: &Network, path: &Path) -> Result<()> {
    let data = network_to_string(network)?;
    fs::write(path, data)
        .with_context(|| format!("writing network configuration '{}'", path.display()))?;
    info!(path = %path.display(), "network configuration written");
    Ok(())
}

/// Write an optimization result as JSON.
pub fn write_result_json(result: &OptimizationResult, path: &Path) -> Result<()> {
    let data = serde_json::to_string_pretty(result).context("serializing optimization result")?;
    fs::write(path, data)
        .with_context(|| format!("writing result '{}'", path.display()))?;
    info!(path = %path.display(), status = %result.status, "result written");
    Ok(())
}

/// Read a previously written optimization result.
pub fn read_result_json(path: &Path) -> Result<OptimizationResult> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading result '{}'", path.display()))?;
    serde_json::from_str(&data).context("parsing optimization result json")
}
