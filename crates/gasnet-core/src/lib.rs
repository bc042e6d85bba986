//! # gasnet-core: Pipeline Network Modeling Core
//!
//! Provides the fundamental data structures for gas pipeline capacity
//! planning and flow optimization.
//!
//! ## Design Philosophy
//!
//! Networks are modeled as **id-keyed collections** where:
//! - **Points**: receipt points (supply), delivery points (demand),
//!   compressor stations
//! - **Segments**: directed pipes with a physical and commercial
//!   characterization
//!
//! The network owns points and segments by id; everything else refers to
//! them through non-owning id lookups, which keeps ownership acyclic even
//! when the pipeline topology contains cycles. Collections are `BTreeMap`s,
//! so iteration is id-sorted: two runs over the same network construct
//! variables, constraints, and reports in exactly the same order.
//!
//! ## Quick Start
//!
//! ```rust
//! use gasnet_core::*;
//!
//! let mut network = Network::new("demo", "");
//!
//! network.add_point(Point::receipt("R1", "Field R1", 1000.0, 0.05)
//!     .with_pressure_window(800.0, 1000.0));
//! network.add_point(Point::delivery("D1", "City Gate D1", 600.0)
//!     .with_pressure_window(300.0, 800.0));
//! network.add_segment(Segment::new("S1", "R1-D1", "R1", "D1", 800.0)
//!     .with_geometry(50.0, 36.0, 0.015)
//!     .with_cost(0.10));
//! network.recompute_drop_constants();
//!
//! let mut diag = diagnostics::Diagnostics::new();
//! network.validate_into(&mut diag);
//! assert!(!diag.has_errors());
//! ```
//!
//! ## Modules
//!
//! - [`diagnostics`] - Validation and diagnostic reporting
//! - [`graph_utils`] - Topological analysis (connectivity, trunk lines)
//! - [`hydraulics`] - Weymouth/Panhandle relations, friction, piecewise tables
//! - [`units`] - Unit newtypes (MMscfd, psia, ...)

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub mod diagnostics;
pub mod error;
pub mod graph_utils;
pub mod hydraulics;
pub mod units;

pub use diagnostics::{DiagnosticIssue, Diagnostics, Severity};
pub use error::{GasnetError, GasnetResult};
pub use graph_utils::*;
pub use units::{DollarsPerMmscf, Inches, Miles, Mmscfd, Psi, Psia, PsiaSq};

// Newtype wrappers for IDs for type safety
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointId(String);

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SegmentId(String);

impl PointId {
    pub fn new(value: impl Into<String>) -> Self {
        PointId(value.into())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl SegmentId {
    pub fn new(value: impl Into<String>) -> Self {
        SegmentId(value.into())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for SegmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PointId {
    fn from(s: &str) -> Self {
        PointId(s.to_string())
    }
}

impl From<&str> for SegmentId {
    fn from(s: &str) -> Self {
        SegmentId(s.to_string())
    }
}

/// The role a point plays in the network, with role-specific attributes.
///
/// A tagged variant rather than a class hierarchy: code that cares about a
/// role branches on the tag and gets exactly the attribute subset that role
/// carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PointKind {
    /// Supply source injecting gas into the network
    Receipt {
        /// Maximum injection (MMscfd), > 0
        supply_capacity: Mmscfd,
        /// Commodity cost of supplied gas ($/MMscf)
        unit_cost: DollarsPerMmscf,
    },
    /// Demand sink absorbing gas from the network
    Delivery {
        /// Contracted offtake (MMscfd), > 0
        demand_requirement: Mmscfd,
    },
    /// Station that may boost downstream pressure, burning fuel to do so
    Compressor {
        /// Maximum discharge-over-suction boost (psi), > 0
        max_pressure_boost: Psi,
        /// Fuel burned per unit throughput (MMscf per MMscfd)
        fuel_consumption_rate: f64,
    },
}

impl PointKind {
    /// Short tag for display and serialization ("Receipt" etc.)
    pub fn tag(&self) -> &'static str {
        match self {
            PointKind::Receipt { .. } => "Receipt",
            PointKind::Delivery { .. } => "Delivery",
            PointKind::Compressor { .. } => "Compressor",
        }
    }
}

/// A node in the pipeline network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub id: PointId,
    pub name: String,
    pub kind: PointKind,
    /// Map coordinate, informational only
    pub x: f64,
    /// Map coordinate, informational only
    pub y: f64,
    /// Inactive points take no part in optimization
    pub is_active: bool,
    /// Lower bound of the operating pressure window (psia)
    pub min_pressure: Psia,
    /// Upper bound of the operating pressure window (psia)
    pub max_pressure: Psia,
    /// Observed or initial pressure (psia)
    pub current_pressure: Psia,
}

impl Point {
    /// Create a receipt point with the given supply capacity and unit cost.
    pub fn receipt(
        id: impl Into<String>,
        name: impl Into<String>,
        supply_mmscfd: f64,
        unit_cost: f64,
    ) -> Self {
        Self::with_kind(
            id,
            name,
            PointKind::Receipt {
                supply_capacity: Mmscfd(supply_mmscfd),
                unit_cost: DollarsPerMmscf(unit_cost),
            },
        )
    }

    /// Create a delivery point with the given demand requirement.
    pub fn delivery(id: impl Into<String>, name: impl Into<String>, demand_mmscfd: f64) -> Self {
        Self::with_kind(
            id,
            name,
            PointKind::Delivery {
                demand_requirement: Mmscfd(demand_mmscfd),
            },
        )
    }

    /// Create a compressor station with the given boost limit and fuel rate.
    pub fn compressor(
        id: impl Into<String>,
        name: impl Into<String>,
        max_boost_psi: f64,
        fuel_rate: f64,
    ) -> Self {
        Self::with_kind(
            id,
            name,
            PointKind::Compressor {
                max_pressure_boost: Psi(max_boost_psi),
                fuel_consumption_rate: fuel_rate,
            },
        )
    }

    fn with_kind(id: impl Into<String>, name: impl Into<String>, kind: PointKind) -> Self {
        Self {
            id: PointId::new(id),
            name: name.into(),
            kind,
            x: 0.0,
            y: 0.0,
            is_active: true,
            min_pressure: Psia(0.0),
            max_pressure: Psia(1500.0),
            current_pressure: Psia(0.0),
        }
    }

    /// Set the operating pressure window (psia).
    pub fn with_pressure_window(mut self, min_psia: f64, max_psia: f64) -> Self {
        self.min_pressure = Psia(min_psia);
        self.max_pressure = Psia(max_psia);
        // A fresh point starts at the middle of its window until told otherwise
        if self.current_pressure.value() == 0.0 {
            self.current_pressure = Psia(0.5 * (min_psia + max_psia));
        }
        self
    }

    /// Set map coordinates.
    pub fn with_location(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Mark the point inactive.
    pub fn deactivated(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub fn is_receipt(&self) -> bool {
        matches!(self.kind, PointKind::Receipt { .. })
    }

    pub fn is_delivery(&self) -> bool {
        matches!(self.kind, PointKind::Delivery { .. })
    }

    pub fn is_compressor(&self) -> bool {
        matches!(self.kind, PointKind::Compressor { .. })
    }

    /// Supply capacity for receipts, `None` otherwise.
    pub fn supply_capacity(&self) -> Option<Mmscfd> {
        match self.kind {
            PointKind::Receipt {
                supply_capacity, ..
            } => Some(supply_capacity),
            _ => None,
        }
    }

    /// Demand requirement for deliveries, `None` otherwise.
    pub fn demand_requirement(&self) -> Option<Mmscfd> {
        match self.kind {
            PointKind::Delivery {
                demand_requirement,
            } => Some(demand_requirement),
            _ => None,
        }
    }

    /// Boost limit for compressors, `None` otherwise.
    pub fn max_pressure_boost(&self) -> Option<Psi> {
        match self.kind {
            PointKind::Compressor {
                max_pressure_boost, ..
            } => Some(max_pressure_boost),
            _ => None,
        }
    }

    /// Fuel rate for compressors, `None` otherwise.
    pub fn fuel_consumption_rate(&self) -> Option<f64> {
        match self.kind {
            PointKind::Compressor {
                fuel_consumption_rate,
                ..
            } => Some(fuel_consumption_rate),
            _ => None,
        }
    }

    /// Supply unit cost for receipts, `None` otherwise.
    pub fn unit_cost(&self) -> Option<DollarsPerMmscf> {
        match self.kind {
            PointKind::Receipt { unit_cost, .. } => Some(unit_cost),
            _ => None,
        }
    }

    /// Midpoint of the pressure window, the linearization anchor for boost.
    pub fn nominal_pressure(&self) -> Psia {
        Psia(0.5 * (self.min_pressure.value() + self.max_pressure.value()))
    }
}

/// A directed pipe edge with a physical and commercial characterization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: SegmentId,
    pub name: String,
    pub from_point: PointId,
    pub to_point: PointId,
    /// Maximum flow (MMscfd), > 0
    pub capacity: Mmscfd,
    /// Lower flow bound; `-capacity` for bidirectional segments
    pub min_flow: Mmscfd,
    /// Whether flow may reverse
    pub is_bidirectional: bool,
    /// Inactive segments take no part in optimization
    pub is_active: bool,
    /// Length in statute miles, > 0
    pub length: Miles,
    /// Inner diameter in inches, > 0
    pub diameter: Inches,
    /// Darcy friction factor, > 0
    pub friction_factor: f64,
    /// Tariff per unit moved ($/MMscf)
    pub transportation_cost: DollarsPerMmscf,
    /// Last observed flow (MMscfd), informational
    pub current_flow: Mmscfd,
    /// Derived Weymouth drop constant, recomputed after loading
    pub pressure_drop_constant: f64,
}

impl Segment {
    /// Create a segment between two points with the given capacity.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
        capacity_mmscfd: f64,
    ) -> Self {
        Self {
            id: SegmentId::new(id),
            name: name.into(),
            from_point: PointId::new(from),
            to_point: PointId::new(to),
            capacity: Mmscfd(capacity_mmscfd),
            min_flow: Mmscfd(0.0),
            is_bidirectional: false,
            is_active: true,
            length: Miles(1.0),
            diameter: Inches(24.0),
            friction_factor: 0.015,
            transportation_cost: DollarsPerMmscf(0.0),
            current_flow: Mmscfd(0.0),
            pressure_drop_constant: 0.0,
        }
    }

    /// Set length (miles), diameter (inches), and friction factor.
    pub fn with_geometry(mut self, length_miles: f64, diameter_inches: f64, friction: f64) -> Self {
        self.length = Miles(length_miles);
        self.diameter = Inches(diameter_inches);
        self.friction_factor = friction;
        self
    }

    /// Set the transportation tariff ($/MMscf).
    pub fn with_cost(mut self, cost: f64) -> Self {
        self.transportation_cost = DollarsPerMmscf(cost);
        self
    }

    /// Allow reverse flow; the lower flow bound becomes `-capacity`.
    pub fn bidirectional(mut self) -> Self {
        self.is_bidirectional = true;
        self.min_flow = -self.capacity;
        self
    }

    /// Mark the segment inactive.
    pub fn deactivated(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Recompute the Weymouth drop constant from geometry.
    pub fn recompute_drop_constant(&mut self) {
        self.pressure_drop_constant = hydraulics::pressure_drop_constant(
            self.friction_factor,
            self.length.value(),
            self.diameter.value(),
        );
    }

    /// Effective lower flow bound: `-capacity` when bidirectional.
    pub fn effective_min_flow(&self) -> Mmscfd {
        if self.is_bidirectional {
            -self.capacity
        } else {
            self.min_flow
        }
    }

    /// Flow-fraction of capacity as a percentage.
    pub fn utilization_pct(&self, flow: f64) -> f64 {
        if self.capacity.value() <= 0.0 {
            0.0
        } else {
            flow.abs() / self.capacity.value() * 100.0
        }
    }
}

/// The pipeline network: points and segments owned by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Network {
    pub name: String,
    pub description: String,
    pub points: BTreeMap<PointId, Point>,
    pub segments: BTreeMap<SegmentId, Segment>,
}

impl Network {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            points: BTreeMap::new(),
            segments: BTreeMap::new(),
        }
    }

    /// Insert a point, replacing any previous point with the same id.
    pub fn add_point(&mut self, point: Point) {
        self.points.insert(point.id.clone(), point);
    }

    /// Insert a segment, replacing any previous segment with the same id.
    ///
    /// Endpoint existence is not checked here; `validate_into` reports every
    /// dangling reference at once.
    pub fn add_segment(&mut self, segment: Segment) {
        self.segments.insert(segment.id.clone(), segment);
    }

    pub fn point(&self, id: &PointId) -> Option<&Point> {
        self.points.get(id)
    }

    pub fn segment(&self, id: &SegmentId) -> Option<&Segment> {
        self.segments.get(id)
    }

    /// Recompute every segment's pressure drop constant; call after loading.
    pub fn recompute_drop_constants(&mut self) {
        for segment in self.segments.values_mut() {
            segment.recompute_drop_constant();
        }
    }

    /// A segment is operational when it and both endpoints are active.
    pub fn is_segment_operational(&self, segment: &Segment) -> bool {
        segment.is_active
            && self
                .points
                .get(&segment.from_point)
                .map(|p| p.is_active)
                .unwrap_or(false)
            && self
                .points
                .get(&segment.to_point)
                .map(|p| p.is_active)
                .unwrap_or(false)
    }

    /// Operational segments in id order.
    pub fn operational_segments(&self) -> impl Iterator<Item = &Segment> {
        self.segments
            .values()
            .filter(|s| self.is_segment_operational(s))
    }

    /// Active points in id order.
    pub fn active_points(&self) -> impl Iterator<Item = &Point> {
        self.points.values().filter(|p| p.is_active)
    }

    /// Active receipt points in id order.
    pub fn active_receipts(&self) -> impl Iterator<Item = &Point> {
        self.active_points().filter(|p| p.is_receipt())
    }

    /// Active delivery points in id order.
    pub fn active_deliveries(&self) -> impl Iterator<Item = &Point> {
        self.active_points().filter(|p| p.is_delivery())
    }

    /// Active compressor stations in id order.
    pub fn active_compressors(&self) -> impl Iterator<Item = &Point> {
        self.active_points().filter(|p| p.is_compressor())
    }

    /// Operational segments delivering into `point`, id order.
    pub fn incoming(&self, point: &PointId) -> Vec<&Segment> {
        self.operational_segments()
            .filter(|s| &s.to_point == point)
            .collect()
    }

    /// Operational segments leaving `point`, id order.
    pub fn outgoing(&self, point: &PointId) -> Vec<&Segment> {
        self.operational_segments()
            .filter(|s| &s.from_point == point)
            .collect()
    }

    /// Sum of active receipt capacities.
    pub fn total_supply_capacity(&self) -> Mmscfd {
        Mmscfd(
            self.active_receipts()
                .filter_map(|p| p.supply_capacity())
                .map(|s| s.value())
                .sum(),
        )
    }

    /// Sum of active delivery requirements.
    pub fn total_demand_requirement(&self) -> Mmscfd {
        Mmscfd(
            self.active_deliveries()
                .filter_map(|p| p.demand_requirement())
                .map(|d| d.value())
                .sum(),
        )
    }

    /// Compute basic statistics about the network.
    pub fn stats(&self) -> NetworkStats {
        let mut stats = NetworkStats::default();
        for point in self.points.values() {
            stats.num_points += 1;
            if !point.is_active {
                continue;
            }
            match &point.kind {
                PointKind::Receipt {
                    supply_capacity, ..
                } => {
                    stats.num_receipts += 1;
                    stats.total_supply_mmscfd += supply_capacity.value();
                }
                PointKind::Delivery {
                    demand_requirement,
                } => {
                    stats.num_deliveries += 1;
                    stats.total_demand_mmscfd += demand_requirement.value();
                }
                PointKind::Compressor { .. } => stats.num_compressors += 1,
            }
        }
        for segment in self.segments.values() {
            stats.num_segments += 1;
            if self.is_segment_operational(segment) {
                stats.num_operational_segments += 1;
                stats.total_capacity_mmscfd += segment.capacity.value();
            }
        }
        stats
    }

    /// Validate network data for issues that break optimization runs.
    ///
    /// Populates the provided `Diagnostics` with everything found; the
    /// caller decides whether errors are fatal.
    pub fn validate_into(&self, diag: &mut Diagnostics) {
        if self.points.is_empty() {
            diag.add_error("structure", "Network has no points");
            return; // Can't check further
        }

        // Reference integrity first: dangling endpoints poison everything else
        for segment in self.segments.values() {
            let entity = format!("Segment {}", segment.id);
            if !self.points.contains_key(&segment.from_point) {
                diag.add_error_with_entity(
                    "reference",
                    &format!("from-point '{}' does not exist", segment.from_point),
                    &entity,
                );
            }
            if !self.points.contains_key(&segment.to_point) {
                diag.add_error_with_entity(
                    "reference",
                    &format!("to-point '{}' does not exist", segment.to_point),
                    &entity,
                );
            }
            if segment.from_point == segment.to_point {
                diag.add_error_with_entity("reference", "endpoints must be distinct", &entity);
            }
        }

        let stats = self.stats();
        if stats.num_receipts == 0 {
            diag.add_error("structure", "Network has no active receipt points");
        }
        if stats.num_deliveries == 0 {
            diag.add_error("structure", "Network has no active delivery points");
        }
        if stats.num_segments == 0 && self.points.len() > 1 {
            diag.add_error("structure", "Network has multiple points but no segments");
        }

        if stats.total_supply_mmscfd + 1e-9 < stats.total_demand_mmscfd {
            diag.add_error(
                "capacity",
                &format!(
                    "Total supply capacity ({:.1} MMscfd) is less than total demand ({:.1} MMscfd)",
                    stats.total_supply_mmscfd, stats.total_demand_mmscfd
                ),
            );
        }

        for point in self.points.values() {
            let entity = format!("Point {}", point.id);
            if point.min_pressure.value() < 0.0 {
                diag.add_error_with_entity("physical", "minimum pressure below zero", &entity);
            }
            if point.max_pressure <= point.min_pressure {
                diag.add_error_with_entity("physical", "pressure window is empty", &entity);
            }
            match &point.kind {
                PointKind::Receipt {
                    supply_capacity, ..
                } if supply_capacity.value() <= 0.0 => {
                    diag.add_error_with_entity("physical", "supply capacity must be > 0", &entity);
                }
                PointKind::Delivery {
                    demand_requirement,
                } if demand_requirement.value() <= 0.0 => {
                    diag.add_error_with_entity(
                        "physical",
                        "demand requirement must be > 0",
                        &entity,
                    );
                }
                PointKind::Compressor {
                    max_pressure_boost, ..
                } if max_pressure_boost.value() <= 0.0 => {
                    diag.add_error_with_entity("physical", "max boost must be > 0", &entity);
                }
                _ => {}
            }
        }

        for segment in self.segments.values() {
            let entity = format!("Segment {}", segment.id);
            if segment.capacity.value() <= 0.0 {
                diag.add_error_with_entity("physical", "capacity must be > 0", &entity);
            }
            if segment.length.value() <= 0.0 {
                diag.add_error_with_entity("physical", "length must be > 0", &entity);
            }
            if segment.diameter.value() <= 0.0 {
                diag.add_error_with_entity("physical", "diameter must be > 0", &entity);
            }
            if segment.friction_factor <= 0.0 {
                diag.add_error_with_entity("physical", "friction factor must be > 0", &entity);
            }
            if segment.transportation_cost.value() < 0.0 {
                diag.add_error_with_entity(
                    "physical",
                    "transportation cost must be >= 0",
                    &entity,
                );
            }
            if segment.is_bidirectional {
                if (segment.min_flow.value() + segment.capacity.value()).abs() > 1e-9 {
                    diag.add_warning_with_entity(
                        "physical",
                        "bidirectional segment min flow differs from -capacity",
                        &entity,
                    );
                }
            } else if segment.min_flow.value() < 0.0 {
                diag.add_error_with_entity(
                    "physical",
                    "min flow must be >= 0 on a one-way segment",
                    &entity,
                );
            }
        }
    }
}

/// Statistics about a network's size and capacity
#[derive(Debug, Clone, Default, Serialize)]
pub struct NetworkStats {
    pub num_points: usize,
    pub num_receipts: usize,
    pub num_deliveries: usize,
    pub num_compressors: usize,
    pub num_segments: usize,
    pub num_operational_segments: usize,
    pub total_supply_mmscfd: f64,
    pub total_demand_mmscfd: f64,
    pub total_capacity_mmscfd: f64,
}

impl std::fmt::Display for NetworkStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} points ({} receipts {:.0} MMscfd, {} deliveries {:.0} MMscfd, {} compressors), {} segments",
            self.num_points,
            self.num_receipts,
            self.total_supply_mmscfd,
            self.num_deliveries,
            self.total_demand_mmscfd,
            self.num_compressors,
            self.num_segments
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain_network() -> Network {
        let mut network = Network::new("chain", "single chain");
        network.add_point(Point::receipt("R1", "R1", 1000.0, 0.05).with_pressure_window(800.0, 1000.0));
        network.add_point(Point::delivery("D1", "D1", 600.0).with_pressure_window(300.0, 800.0));
        network.add_segment(
            Segment::new("S1", "R1-D1", "R1", "D1", 800.0)
                .with_geometry(50.0, 36.0, 0.015)
                .with_cost(0.10),
        );
        network.recompute_drop_constants();
        network
    }

    #[test]
    fn test_network_creation() {
        let network = chain_network();
        assert_eq!(network.points.len(), 2);
        assert_eq!(network.segments.len(), 1);
        let seg = network.segment(&SegmentId::new("S1")).unwrap();
        assert!(seg.pressure_drop_constant > 0.0);
        assert_eq!(seg.from_point, PointId::new("R1"));
    }

    #[test]
    fn test_validation_clean_network() {
        let network = chain_network();
        let mut diag = Diagnostics::new();
        network.validate_into(&mut diag);
        assert!(!diag.has_errors(), "{}", diag);
    }

    #[test]
    fn test_validation_empty() {
        let network = Network::new("empty", "");
        let mut diag = Diagnostics::new();
        network.validate_into(&mut diag);
        assert!(diag.has_errors());
        assert!(diag.errors().any(|i| i.message.contains("no points")));
    }

    #[test]
    fn test_validation_dangling_endpoint() {
        let mut network = chain_network();
        network.add_segment(Segment::new("S9", "bad", "R1", "NOPE", 100.0));
        let mut diag = Diagnostics::new();
        network.validate_into(&mut diag);
        assert!(diag
            .errors()
            .any(|i| i.category == "reference" && i.message.contains("NOPE")));
    }

    #[test]
    fn test_validation_supply_shortfall() {
        let mut network = chain_network();
        network.add_point(Point::delivery("D2", "D2", 900.0).with_pressure_window(300.0, 800.0));
        let mut diag = Diagnostics::new();
        network.validate_into(&mut diag);
        assert!(diag.errors().any(|i| i.category == "capacity"));
    }

    #[test]
    fn test_validation_empty_pressure_window() {
        let mut network = chain_network();
        network.add_point(Point::delivery("D3", "D3", 1.0).with_pressure_window(500.0, 400.0));
        let mut diag = Diagnostics::new();
        network.validate_into(&mut diag);
        assert!(diag.errors().any(|i| i.message.contains("window is empty")));
    }

    #[test]
    fn test_adjacency_queries() {
        let mut network = chain_network();
        network.add_point(Point::compressor("C1", "C1", 400.0, 0.02).with_pressure_window(300.0, 1200.0));
        network.add_segment(Segment::new("S2", "R1-C1", "R1", "C1", 500.0));
        network.recompute_drop_constants();

        let out = network.outgoing(&PointId::new("R1"));
        assert_eq!(out.len(), 2);
        // id order: S1 before S2
        assert_eq!(out[0].id, SegmentId::new("S1"));
        assert_eq!(network.incoming(&PointId::new("C1")).len(), 1);
        assert!(network.incoming(&PointId::new("R1")).is_empty());
    }

    #[test]
    fn test_inactive_point_disables_segments() {
        let mut network = chain_network();
        network.points.get_mut(&PointId::new("D1")).unwrap().is_active = false;
        assert_eq!(network.operational_segments().count(), 0);
        assert!(network.incoming(&PointId::new("D1")).is_empty());
    }

    #[test]
    fn test_stats_totals() {
        let network = chain_network();
        let stats = network.stats();
        assert_eq!(stats.num_receipts, 1);
        assert_eq!(stats.num_deliveries, 1);
        assert!((stats.total_supply_mmscfd - 1000.0).abs() < 1e-9);
        assert!((stats.total_demand_mmscfd - 600.0).abs() < 1e-9);
    }

    #[test]
    fn test_bidirectional_min_flow() {
        let seg = Segment::new("S1", "s", "A", "B", 400.0).bidirectional();
        assert_eq!(seg.effective_min_flow().value(), -400.0);
        assert!(seg.is_bidirectional);
    }

    #[test]
    fn test_utilization() {
        let seg = Segment::new("S1", "s", "A", "B", 500.0);
        assert!((seg.utilization_pct(250.0) - 50.0).abs() < 1e-12);
        assert!((seg.utilization_pct(-250.0) - 50.0).abs() < 1e-12);
    }

    #[test]
    fn test_kind_accessors() {
        let r = Point::receipt("R", "R", 100.0, 1.5);
        assert_eq!(r.supply_capacity().unwrap().value(), 100.0);
        assert_eq!(r.unit_cost().unwrap().value(), 1.5);
        assert!(r.demand_requirement().is_none());

        let c = Point::compressor("C", "C", 300.0, 0.01);
        assert_eq!(c.max_pressure_boost().unwrap().value(), 300.0);
        assert_eq!(c.fuel_consumption_rate().unwrap(), 0.01);
        assert_eq!(c.kind.tag(), "Compressor");
    }

    #[test]
    fn test_deep_copy_for_scenarios() {
        let base = chain_network();
        let mut variant = base.clone();
        if let Some(p) = variant.points.get_mut(&PointId::new("D1")) {
            if let PointKind::Delivery {
                demand_requirement,
            } = &mut p.kind
            {
                *demand_requirement = Mmscfd(900.0);
            }
        }
        // The base network must be untouched
        assert_eq!(
            base.point(&PointId::new("D1")).unwrap().demand_requirement().unwrap(),
            Mmscfd(600.0)
        );
        assert_eq!(
            variant.point(&PointId::new("D1")).unwrap().demand_requirement().unwrap(),
            Mmscfd(900.0)
        );
    }
}
