//! Topological analysis over the pipeline network.
//!
//! These helpers walk the id-keyed point/segment maps directly; they are
//! used by the flow tracer and the engine's pre-flight diagnosis.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::{Network, PointId, SegmentId};

/// Graph-level statistics (density, degree distribution, components).
#[derive(Debug, Clone)]
pub struct GraphStats {
    pub point_count: usize,
    pub segment_count: usize,
    pub connected_components: usize,
    pub min_degree: usize,
    pub avg_degree: f64,
    pub max_degree: usize,
    pub density: f64,
}

/// Calculates graph statistics over active points and operational segments.
pub fn graph_stats(network: &Network) -> GraphStats {
    let points: Vec<&PointId> = network.active_points().map(|p| &p.id).collect();
    let point_count = points.len();
    let segment_count = network.operational_segments().count();

    let mut degrees: BTreeMap<&PointId, usize> = points.iter().map(|id| (*id, 0)).collect();
    for segment in network.operational_segments() {
        if let Some(d) = degrees.get_mut(&segment.from_point) {
            *d += 1;
        }
        if let Some(d) = degrees.get_mut(&segment.to_point) {
            *d += 1;
        }
    }

    let min_degree = degrees.values().copied().min().unwrap_or(0);
    let max_degree = degrees.values().copied().max().unwrap_or(0);
    let avg_degree = if point_count == 0 {
        0.0
    } else {
        degrees.values().sum::<usize>() as f64 / point_count as f64
    };
    let density = if point_count < 2 {
        0.0
    } else {
        segment_count as f64 / (point_count as f64 * (point_count as f64 - 1.0))
    };

    GraphStats {
        point_count,
        segment_count,
        connected_components: connected_components(network).len(),
        min_degree,
        avg_degree,
        max_degree,
        density,
    }
}

/// Weakly connected components over active points, each sorted by id.
pub fn connected_components(network: &Network) -> Vec<Vec<PointId>> {
    let mut adjacency: BTreeMap<&PointId, Vec<&PointId>> = BTreeMap::new();
    for point in network.active_points() {
        adjacency.entry(&point.id).or_default();
    }
    for segment in network.operational_segments() {
        adjacency
            .entry(&segment.from_point)
            .or_default()
            .push(&segment.to_point);
        adjacency
            .entry(&segment.to_point)
            .or_default()
            .push(&segment.from_point);
    }

    let mut seen: BTreeSet<&PointId> = BTreeSet::new();
    let mut components = Vec::new();
    for start in adjacency.keys().copied().collect::<Vec<_>>() {
        if seen.contains(start) {
            continue;
        }
        let mut component = Vec::new();
        let mut queue = VecDeque::from([start]);
        seen.insert(start);
        while let Some(id) = queue.pop_front() {
            component.push(id.clone());
            for &next in adjacency.get(id).into_iter().flatten() {
                if seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        component.sort();
        components.push(component);
    }
    components
}

/// Whether `to` is reachable from `from` along operational segment directions.
pub fn is_reachable(network: &Network, from: &PointId, to: &PointId) -> bool {
    if from == to {
        return true;
    }
    let mut seen: BTreeSet<&PointId> = BTreeSet::new();
    let mut queue = VecDeque::from([from]);
    seen.insert(from);
    while let Some(id) = queue.pop_front() {
        for segment in network.outgoing(id) {
            let next = &segment.to_point;
            if next == to {
                return true;
            }
            if seen.insert(next) {
                queue.push_back(next);
            }
        }
    }
    false
}

/// For each active delivery: whether any active receipt can reach it.
pub fn delivery_reachability(network: &Network) -> BTreeMap<PointId, bool> {
    let receipts: Vec<PointId> = network.active_receipts().map(|p| p.id.clone()).collect();
    network
        .active_deliveries()
        .map(|d| {
            let reachable = receipts.iter().any(|r| is_reachable(network, r, &d.id));
            (d.id.clone(), reachable)
        })
        .collect()
}

/// Trunk segments: receipt-adjacent, or capacity at or above the 75th
/// percentile of operational capacities. Used as roots for upstream flow
/// distribution.
pub fn trunk_segments(network: &Network) -> Vec<SegmentId> {
    let mut capacities: Vec<f64> = network
        .operational_segments()
        .map(|s| s.capacity.value())
        .collect();
    if capacities.is_empty() {
        return Vec::new();
    }
    capacities.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let idx = (capacities.len() as f64 * 0.75).floor() as usize;
    let threshold = capacities[idx.min(capacities.len() - 1)];

    network
        .operational_segments()
        .filter(|s| {
            let supply_adjacent = network
                .point(&s.from_point)
                .map(|p| p.is_receipt())
                .unwrap_or(false);
            supply_adjacent || s.capacity.value() >= threshold
        })
        .map(|s| s.id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Point, Segment};

    fn star_network() -> Network {
        let mut network = Network::new("star", "");
        network.add_point(Point::receipt("R1", "R1", 1000.0, 0.0).with_pressure_window(800.0, 1000.0));
        network.add_point(Point::compressor("C1", "C1", 400.0, 0.02).with_pressure_window(300.0, 1200.0));
        network.add_point(Point::delivery("D1", "D1", 600.0).with_pressure_window(300.0, 800.0));
        network.add_point(Point::delivery("D2", "D2", 400.0).with_pressure_window(300.0, 800.0));
        network.add_segment(Segment::new("S1", "R1-C1", "R1", "C1", 1200.0));
        network.add_segment(Segment::new("S2", "C1-D1", "C1", "D1", 600.0));
        network.add_segment(Segment::new("S3", "C1-D2", "C1", "D2", 500.0));
        network.recompute_drop_constants();
        network
    }

    #[test]
    fn test_graph_stats() {
        let stats = graph_stats(&star_network());
        assert_eq!(stats.point_count, 4);
        assert_eq!(stats.segment_count, 3);
        assert_eq!(stats.connected_components, 1);
        assert_eq!(stats.max_degree, 3); // C1
        assert_eq!(stats.min_degree, 1);
    }

    #[test]
    fn test_reachability() {
        let network = star_network();
        assert!(is_reachable(&network, &PointId::new("R1"), &PointId::new("D2")));
        // Directed: delivery cannot reach the receipt
        assert!(!is_reachable(&network, &PointId::new("D1"), &PointId::new("R1")));
    }

    #[test]
    fn test_delivery_reachability_with_outage() {
        let mut network = star_network();
        network.points.get_mut(&PointId::new("C1")).unwrap().is_active = false;
        let reach = delivery_reachability(&network);
        assert_eq!(reach[&PointId::new("D1")], false);
        assert_eq!(reach[&PointId::new("D2")], false);
    }

    #[test]
    fn test_components_split() {
        let mut network = star_network();
        network.add_point(Point::delivery("Z1", "islanded", 1.0).with_pressure_window(1.0, 2.0));
        let components = connected_components(&network);
        assert_eq!(components.len(), 2);
    }

    #[test]
    fn test_trunk_classification() {
        let network = star_network();
        let trunks = trunk_segments(&network);
        // S1 is both receipt-adjacent and the largest capacity
        assert!(trunks.contains(&SegmentId::new("S1")));
        // S3 is neither receipt-adjacent nor top-quartile
        assert!(!trunks.contains(&SegmentId::new("S3")));
    }
}
