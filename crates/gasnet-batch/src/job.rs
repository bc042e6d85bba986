//! Batch job descriptions and per-job records.

use gasnet_core::Network;
use serde::{Deserialize, Serialize};

/// One unit of batch work: a network variant run under one algorithm.
#[derive(Debug, Clone)]
pub struct BatchJob {
    /// Deterministic id, `scenario/algorithm`
    pub job_id: String,
    pub scenario_id: String,
    pub algorithm: String,
    /// The scenario's private network snapshot
    pub network: Network,
}

impl BatchJob {
    pub fn new(scenario_id: &str, algorithm: &str, network: Network) -> Self {
        Self {
            job_id: format!("{}/{}", scenario_id, algorithm),
            scenario_id: scenario_id.to_string(),
            algorithm: algorithm.to_string(),
            network,
        }
    }
}

/// Outcome of one batch job, as recorded in the manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchJobRecord {
    pub job_id: String,
    pub scenario_id: String,
    pub algorithm: String,
    /// "ok" or "error"
    pub status: String,
    /// Solve status string for successful runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solve_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub objective_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Where the result JSON was written
    pub output: String,
    pub duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_id_is_deterministic() {
        let job = BatchJob::new("peak-winter", "cost-lp", Network::new("n", ""));
        assert_eq!(job.job_id, "peak-winter/cost-lp");
    }
}
