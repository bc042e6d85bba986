//! Build a validated `Network` from configuration JSON.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use gasnet_core::{
    Diagnostics, DollarsPerMmscf, Inches, Miles, Mmscfd, Network, Point, PointId, PointKind, Psi,
    Psia, Segment, SegmentId,
};
use tracing::info;

use crate::schema::{NetworkJson, PointJson, SegmentJson};

/// A loaded network together with everything the loader had to say about it.
#[derive(Debug)]
pub struct ImportResult {
    pub network: Network,
    pub diagnostics: Diagnostics,
}

impl ImportResult {
    /// True when the network can be used for optimization.
    pub fn is_usable(&self) -> bool {
        !self.diagnostics.has_errors()
    }
}

/// Load a network configuration from a JSON file.
pub fn load_network_from_path(path: &Path) -> Result<ImportResult> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading network configuration '{}'", path.display()))?;
    let result = load_network_from_str(&data)?;
    info!(
        path = %path.display(),
        points = result.network.points.len(),
        segments = result.network.segments.len(),
        "network configuration loaded"
    );
    Ok(result)
}

/// Load a network configuration from a JSON string.
///
/// Structural problems inside a parseable document (unknown point types,
/// missing role fields, key/id mismatches) are collected as diagnostics,
/// all of them, never just the first, and the full network validation runs
/// on the assembled model.
pub fn load_network_from_str(data: &str) -> Result<ImportResult> {
    let doc: NetworkJson =
        serde_json::from_str(data).context("parsing network configuration json")?;

    let mut diagnostics = Diagnostics::new();
    let mut network = Network::new(doc.name, doc.description);

    for (key, point_json) in &doc.points {
        if key != &point_json.id {
            diagnostics.add_warning_with_entity(
                "parse",
                &format!("map key '{}' differs from point id '{}'", key, point_json.id),
                &format!("Point {}", point_json.id),
            );
        }
        match build_point(point_json, &mut diagnostics) {
            Some(point) => network.add_point(point),
            None => continue,
        }
    }

    for (key, segment_json) in &doc.segments {
        if key != &segment_json.id {
            diagnostics.add_warning_with_entity(
                "parse",
                &format!(
                    "map key '{}' differs from segment id '{}'",
                    key, segment_json.id
                ),
                &format!("Segment {}", segment_json.id),
            );
        }
        network.add_segment(build_segment(segment_json));
    }

    network.recompute_drop_constants();
    network.validate_into(&mut diagnostics);

    Ok(ImportResult {
        network,
        diagnostics,
    })
}

fn build_point(json: &PointJson, diagnostics: &mut Diagnostics) -> Option<Point> {
    let entity = format!("Point {}", json.id);
    let kind = match json.point_type.as_str() {
        "Receipt" => {
            if json.supply_capacity.is_none() {
                diagnostics.add_error_with_entity(
                    "parse",
                    "receipt point is missing supplyCapacity",
                    &entity,
                );
            }
            PointKind::Receipt {
                supply_capacity: Mmscfd(json.supply_capacity.unwrap_or(0.0)),
                unit_cost: DollarsPerMmscf(json.unit_cost.unwrap_or(0.0)),
            }
        }
        "Delivery" => {
            if json.demand_requirement.is_none() {
                diagnostics.add_error_with_entity(
                    "parse",
                    "delivery point is missing demandRequirement",
                    &entity,
                );
            }
            PointKind::Delivery {
                demand_requirement: Mmscfd(json.demand_requirement.unwrap_or(0.0)),
            }
        }
        "Compressor" => {
            if json.max_pressure_boost.is_none() {
                diagnostics.add_error_with_entity(
                    "parse",
                    "compressor point is missing maxPressureBoost",
                    &entity,
                );
            }
            PointKind::Compressor {
                max_pressure_boost: Psi(json.max_pressure_boost.unwrap_or(0.0)),
                fuel_consumption_rate: json.fuel_consumption_rate.unwrap_or(0.0),
            }
        }
        other => {
            diagnostics.add_error_with_entity(
                "parse",
                &format!("unknown point type '{}'", other),
                &entity,
            );
            return None;
        }
    };

    Some(Point {
        id: PointId::new(&json.id),
        name: json.name.clone(),
        kind,
        x: json.x,
        y: json.y,
        is_active: json.is_active,
        min_pressure: Psia(json.min_pressure),
        max_pressure: Psia(json.max_pressure),
        current_pressure: Psia(json.current_pressure),
    })
}

fn build_segment(json: &SegmentJson) -> Segment {
    Segment {
        id: SegmentId::new(&json.id),
        name: json.name.clone(),
        from_point: PointId::new(&json.from_point_id),
        to_point: PointId::new(&json.to_point_id),
        capacity: Mmscfd(json.capacity),
        min_flow: Mmscfd(json.min_flow),
        is_bidirectional: json.is_bidirectional,
        is_active: json.is_active,
        length: Miles(json.length),
        diameter: Inches(json.diameter),
        friction_factor: json.friction_factor,
        transportation_cost: DollarsPerMmscf(json.transportation_cost),
        current_flow: Mmscfd(json.current_flow),
        pressure_drop_constant: 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "name": "mini",
        "description": "one chain",
        "points": {
            "R1": {"id": "R1", "name": "R1", "type": "Receipt",
                   "minPressure": 800, "maxPressure": 1000, "currentPressure": 900,
                   "supplyCapacity": 1000, "unitCost": 0.05},
            "D1": {"id": "D1", "name": "D1", "type": "Delivery",
                   "minPressure": 300, "maxPressure": 800, "currentPressure": 500,
                   "demandRequirement": 600}
        },
        "segments": {
            "S1": {"id": "S1", "name": "R1-D1", "fromPointId": "R1", "toPointId": "D1",
                   "capacity": 800, "length": 50, "diameter": 36,
                   "frictionFactor": 0.015, "transportationCost": 0.10}
        }
    }"#;

    #[test]
    fn test_minimal_network_loads_cleanly() {
        let result = load_network_from_str(MINIMAL).unwrap();
        assert!(result.is_usable(), "{}", result.diagnostics);
        assert_eq!(result.network.points.len(), 2);
        assert_eq!(result.network.segments.len(), 1);
        let segment = result
            .network
            .segment(&SegmentId::new("S1"))
            .unwrap();
        assert!(segment.pressure_drop_constant > 0.0);
    }

    #[test]
    fn test_unknown_point_type_is_collected() {
        let bad = MINIMAL.replace("\"Receipt\"", "\"Wellhead\"");
        let result = load_network_from_str(&bad).unwrap();
        assert!(!result.is_usable());
        assert!(result
            .diagnostics
            .errors()
            .any(|e| e.message.contains("Wellhead")));
    }

    #[test]
    fn test_missing_role_field_is_collected() {
        let bad = MINIMAL.replace("\"supplyCapacity\": 1000,", "");
        let result = load_network_from_str(&bad).unwrap();
        assert!(!result.is_usable());
        // The parse error and the physical validation error both show up
        assert!(result.diagnostics.error_count() >= 2);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(load_network_from_str("{not json").is_err());
    }

    #[test]
    fn test_key_id_mismatch_is_a_warning() {
        let shifted = MINIMAL.replace("\"S1\": {\"id\": \"S1\"", "\"S1\": {\"id\": \"S9\"");
        let result = load_network_from_str(&shifted).unwrap();
        assert!(result
            .diagnostics
            .warnings()
            .any(|w| w.message.contains("differs from segment id")));
    }
}
