//! # gasnet-batch: Parallel Batch Runs
//!
//! Fans optimization runs out over scenarios × algorithms on a rayon thread
//! pool. Every job owns an immutable network snapshot; failures are recorded
//! per job and never abort the batch. A JSON manifest summarizes the run for
//! downstream tooling.

pub mod job;
pub mod manifest;
pub mod runner;

use anyhow::Result;
use gasnet_core::Network;
use gasnet_scenarios::{apply_scenario, ResolvedScenario};

pub use job::{BatchJob, BatchJobRecord};
pub use manifest::{read_batch_manifest, write_batch_manifest, BatchManifest};
pub use runner::{run_batch, BatchRunnerConfig, BatchSummary};

/// Expand scenarios × algorithms into concrete jobs.
///
/// The base network itself runs under the reserved scenario id "base" when
/// `include_base` is set.
pub fn expand_jobs(
    base: &Network,
    scenarios: &[ResolvedScenario],
    algorithms: &[String],
    include_base: bool,
) -> Result<Vec<BatchJob>> {
    let mut jobs = Vec::new();
    if include_base {
        for algorithm in algorithms {
            jobs.push(BatchJob::new("base", algorithm, base.clone()));
        }
    }
    for scenario in scenarios {
        let variant = apply_scenario(base, scenario)?;
        for algorithm in algorithms {
            jobs.push(BatchJob::new(&scenario.scenario_id, algorithm, variant.clone()));
        }
    }
    Ok(jobs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gasnet_algo::test_utils::compressor_star_network;
    use std::collections::BTreeMap;

    #[test]
    fn test_expand_jobs_cartesian() {
        let base = compressor_star_network();
        let scenarios = vec![ResolvedScenario {
            scenario_id: "half-demand".to_string(),
            description: None,
            tags: Vec::new(),
            outages: Vec::new(),
            demand_scale: 0.5,
            supply_scale: 1.0,
            capacity_overrides: BTreeMap::new(),
        }];
        let algorithms = vec!["cost-lp".to_string(), "cost-graph".to_string()];
        let jobs = expand_jobs(&base, &scenarios, &algorithms, true).unwrap();
        assert_eq!(jobs.len(), 4);
        assert_eq!(jobs[0].job_id, "base/cost-lp");
        assert_eq!(jobs[3].job_id, "half-demand/cost-graph");
        // Scenario snapshots carry the scaled demand
        assert_eq!(jobs[2].network.total_demand_requirement().value(), 500.0);
    }
}
