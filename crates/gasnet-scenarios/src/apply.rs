//! Apply a resolved scenario to a deep-copied network snapshot.

use anyhow::{anyhow, Result};
use gasnet_core::{Mmscfd, Network, PointId, PointKind, SegmentId};

use crate::spec::{OutageSpec, ResolvedScenario};

/// Produce the scenario's network variant.
///
/// **Algorithm:**
/// 1. Deep-copy the base network (the base is never mutated).
/// 2. Apply outages: referenced points/segments become inactive.
/// 3. Scale delivery demand and receipt supply by the scenario factors.
/// 4. Apply per-segment capacity overrides (bidirectional minimum flow
///    follows the new capacity).
///
/// Unknown outage or override ids are errors: a scenario silently applying
/// to nothing would poison every downstream comparison.
pub fn apply_scenario(base: &Network, scenario: &ResolvedScenario) -> Result<Network> {
    let mut network = base.clone();
    network.name = format!("{}@{}", base.name, scenario.scenario_id);

    for outage in &scenario.outages {
        match outage {
            OutageSpec::Point { id } => {
                let point_id = PointId::new(id.as_str());
                let point = network.points.get_mut(&point_id).ok_or_else(|| {
                    anyhow!(
                        "scenario '{}' references unknown point '{}'",
                        scenario.scenario_id,
                        id
                    )
                })?;
                point.is_active = false;
            }
            OutageSpec::Segment { id } => {
                let segment_id = SegmentId::new(id.as_str());
                let segment = network.segments.get_mut(&segment_id).ok_or_else(|| {
                    anyhow!(
                        "scenario '{}' references unknown segment '{}'",
                        scenario.scenario_id,
                        id
                    )
                })?;
                segment.is_active = false;
            }
        }
    }

    for point in network.points.values_mut() {
        match &mut point.kind {
            PointKind::Delivery { demand_requirement } => {
                *demand_requirement = Mmscfd(demand_requirement.value() * scenario.demand_scale);
            }
            PointKind::Receipt {
                supply_capacity, ..
            } => {
                *supply_capacity = Mmscfd(supply_capacity.value() * scenario.supply_scale);
            }
            PointKind::Compressor { .. } => {}
        }
    }

    for (id, &capacity) in &scenario.capacity_overrides {
        let segment_id = SegmentId::new(id.as_str());
        let segment = network.segments.get_mut(&segment_id).ok_or_else(|| {
            anyhow!(
                "scenario '{}' overrides unknown segment '{}'",
                scenario.scenario_id,
                id
            )
        })?;
        segment.capacity = Mmscfd(capacity);
        if segment.is_bidirectional {
            segment.min_flow = Mmscfd(-capacity);
        }
    }

    Ok(network)
}
