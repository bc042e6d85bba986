//! Serde schema of the network configuration JSON.
//!
//! The wire format keeps points and segments in id-keyed dictionaries with
//! flat, role-agnostic records; role-specific fields are optional and only
//! consulted for the matching point type. All numeric fields are double
//! precision.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// Top-level configuration document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkJson {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub points: BTreeMap<String, PointJson>,
    #[serde(default)]
    pub segments: BTreeMap<String, SegmentJson>,
}

/// One point record; role-specific fields are optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointJson {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// One of "Receipt", "Delivery", "Compressor"
    #[serde(rename = "type")]
    pub point_type: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub min_pressure: f64,
    #[serde(default)]
    pub max_pressure: f64,
    #[serde(default)]
    pub current_pressure: f64,
    /// Receipt only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supply_capacity: Option<f64>,
    /// Delivery only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demand_requirement: Option<f64>,
    /// Compressor only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_pressure_boost: Option<f64>,
    /// Compressor only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuel_consumption_rate: Option<f64>,
    /// Receipt only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_cost: Option<f64>,
}

/// One segment record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentJson {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub from_point_id: String,
    pub to_point_id: String,
    pub capacity: f64,
    pub length: f64,
    pub diameter: f64,
    pub friction_factor: f64,
    #[serde(default)]
    pub transportation_cost: f64,
    #[serde(default)]
    pub current_flow: f64,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_bidirectional: bool,
    #[serde(default)]
    pub min_flow: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_point_parses_with_defaults() {
        let json = r#"{"id": "R1", "type": "Receipt", "supplyCapacity": 100.0}"#;
        let point: PointJson = serde_json::from_str(json).unwrap();
        assert!(point.is_active);
        assert_eq!(point.supply_capacity, Some(100.0));
        assert_eq!(point.min_pressure, 0.0);
        assert!(point.demand_requirement.is_none());
    }

    #[test]
    fn test_camel_case_keys() {
        let json = r#"{
            "id": "S1", "fromPointId": "A", "toPointId": "B",
            "capacity": 500.0, "length": 10.0, "diameter": 24.0,
            "frictionFactor": 0.015, "transportationCost": 0.1,
            "isBidirectional": true, "minFlow": -500.0
        }"#;
        let segment: SegmentJson = serde_json::from_str(json).unwrap();
        assert_eq!(segment.from_point_id, "A");
        assert!(segment.is_bidirectional);
        assert_eq!(segment.min_flow, -500.0);
    }

    #[test]
    fn test_role_fields_skipped_when_absent() {
        let point = PointJson {
            id: "D1".to_string(),
            name: "D1".to_string(),
            point_type: "Delivery".to_string(),
            x: 0.0,
            y: 0.0,
            is_active: true,
            min_pressure: 300.0,
            max_pressure: 800.0,
            current_pressure: 500.0,
            supply_capacity: None,
            demand_requirement: Some(600.0),
            max_pressure_boost: None,
            fuel_consumption_rate: None,
            unit_cost: None,
        };
        let json = serde_json::to_string(&point).unwrap();
        assert!(!json.contains("supplyCapacity"));
        assert!(json.contains("demandRequirement"));
    }
}
