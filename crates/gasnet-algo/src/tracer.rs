//! Upstream flow tracer: optimizer-independent feasibility diagnosis.
//!
//! Walks backwards from every active delivery, accumulating the flow each
//! segment would have to carry for all demand to be met. Where a point has
//! several inflowing segments the requirement splits proportionally to their
//! capacities. The result is a per-segment requirement map and a verdict:
//! the network is trace-feasible when no segment requirement exceeds its
//! capacity.
//!
//! This is a fast pre-flight check; it ignores pressure and shared-capacity
//! interactions between deliveries beyond simple accumulation.

use std::collections::{BTreeMap, BTreeSet};

use gasnet_core::{Network, PointId, SegmentId};
use tracing::debug;

/// Per-segment required flows and the feasibility verdict.
#[derive(Debug, Clone, Default)]
pub struct TraceReport {
    /// Required flow per segment (MMscfd), accumulated over all deliveries
    pub segment_required: BTreeMap<SegmentId, f64>,
    /// One message per segment whose requirement exceeds capacity
    pub violations: Vec<String>,
    /// True when no segment requirement exceeds its capacity
    pub is_network_feasible: bool,
}

impl TraceReport {
    /// Required flow for a segment id, zero when the trace never reached it.
    pub fn required(&self, segment_id: &str) -> f64 {
        self.segment_required
            .get(&SegmentId::new(segment_id))
            .copied()
            .unwrap_or(0.0)
    }
}

/// Propagate every active delivery's demand upstream.
pub fn trace_required_flows(network: &Network) -> TraceReport {
    let mut report = TraceReport {
        is_network_feasible: true,
        ..Default::default()
    };

    for delivery in network.active_deliveries() {
        let demand = delivery
            .demand_requirement()
            .map(|d| d.value())
            .unwrap_or(0.0);
        if demand <= 0.0 {
            continue;
        }
        let mut path = BTreeSet::new();
        distribute(network, &delivery.id, demand, &mut report.segment_required, &mut path);
    }

    for (segment_id, &required) in &report.segment_required {
        if let Some(segment) = network.segment(segment_id) {
            if required > segment.capacity.value() + 1e-6 {
                report.violations.push(format!(
                    "segment {}: required {:.2} MMscfd exceeds capacity {:.2} MMscfd",
                    segment_id,
                    required,
                    segment.capacity.value()
                ));
            }
        }
    }
    report.is_network_feasible = report.violations.is_empty();
    debug!(
        segments = report.segment_required.len(),
        violations = report.violations.len(),
        "upstream trace complete"
    );
    report
}

/// Split `required` across the inflowing segments of `point` proportionally
/// to capacity, then recurse into each upstream point. The `path` set is
/// scoped to the current recursion branch so cycles terminate without
/// suppressing legitimate re-visits on parallel branches.
fn distribute(
    network: &Network,
    point: &PointId,
    required: f64,
    accumulated: &mut BTreeMap<SegmentId, f64>,
    path: &mut BTreeSet<PointId>,
) {
    let inflows = network.incoming(point);
    if inflows.is_empty() {
        return;
    }
    let total_capacity: f64 = inflows.iter().map(|s| s.capacity.value()).sum();
    if total_capacity <= 0.0 {
        return;
    }

    path.insert(point.clone());
    for segment in inflows {
        let share = required * segment.capacity.value() / total_capacity;
        *accumulated.entry(segment.id.clone()).or_insert(0.0) += share;

        let upstream = &segment.from_point;
        let is_receipt = network
            .point(upstream)
            .map(|p| p.is_receipt())
            .unwrap_or(false);
        if !is_receipt && !path.contains(upstream) {
            distribute(network, upstream, share, accumulated, path);
        }
    }
    path.remove(point);
}
