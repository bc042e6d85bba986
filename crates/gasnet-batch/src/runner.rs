//! Parallel batch execution over rayon.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Utc;
use gasnet_algo::{OptimizationEngine, OptimizationSettings};
use gasnet_io::write_result_json;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use tracing::{info, warn};

use crate::job::{BatchJob, BatchJobRecord};
use crate::manifest::{write_batch_manifest, BatchManifest};

/// Configuration of one batch run.
pub struct BatchRunnerConfig {
    pub jobs: Vec<BatchJob>,
    pub output_root: PathBuf,
    pub settings: OptimizationSettings,
    /// 0 = auto-detect CPU count
    pub threads: usize,
}

/// Summary returned after the run so clients can log success/failure counts
/// and the manifest location.
pub struct BatchSummary {
    pub success: usize,
    pub failure: usize,
    pub manifest_path: PathBuf,
    pub jobs: Vec<BatchJobRecord>,
}

/// Execute every job in parallel and write the manifest.
///
/// Jobs are independent by construction (each owns its network snapshot and
/// settings are shared immutably), so a failed job records an error without
/// touching the rest of the batch.
pub fn run_batch(config: &BatchRunnerConfig) -> Result<BatchSummary> {
    fs::create_dir_all(&config.output_root).with_context(|| {
        format!(
            "creating batch output root '{}'",
            config.output_root.display()
        )
    })?;

    let thread_count = if config.threads == 0 {
        num_cpus::get()
    } else {
        config.threads
    };
    let pool = ThreadPoolBuilder::new()
        .num_threads(thread_count)
        .build()
        .context("building rayon thread pool for batch runs")?;

    let engine = OptimizationEngine::with_defaults();
    let job_records: Vec<BatchJobRecord> = pool.install(|| {
        config
            .jobs
            .par_iter()
            .map(|job| run_job(job, &engine, config))
            .collect()
    });

    let success = job_records
        .iter()
        .filter(|record| record.status == "ok")
        .count();
    let failure = job_records.len() - success;
    info!(success, failure, "batch finished");

    let manifest = BatchManifest {
        created_at: Utc::now(),
        num_jobs: job_records.len(),
        success,
        failure,
        jobs: job_records.clone(),
    };
    let manifest_path = config.output_root.join("batch_manifest.json");
    write_batch_manifest(&manifest_path, &manifest)?;
    Ok(BatchSummary {
        success,
        failure,
        manifest_path,
        jobs: job_records,
    })
}

/// Execute a single job: optimize the snapshot and write its result JSON.
fn run_job(
    job: &BatchJob,
    engine: &OptimizationEngine,
    config: &BatchRunnerConfig,
) -> BatchJobRecord {
    let started = Instant::now();
    let output_file = config.output_root.join(&job.job_id).join("result.json");

    let runner = || -> Result<(String, f64)> {
        let result = engine.optimize(&job.network, &job.algorithm, &config.settings);
        if let Some(parent) = output_file.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating '{}'", parent.display()))?;
        }
        write_result_json(&result, &output_file)?;
        Ok((result.status.to_string(), result.objective_value))
    };

    let (status, solve_status, objective_value, error) = match runner() {
        Ok((solve_status, objective)) => ("ok".to_string(), Some(solve_status), Some(objective), None),
        Err(err) => {
            warn!(job = %job.job_id, %err, "batch job failed");
            ("error".to_string(), None, None, Some(err.to_string()))
        }
    };

    BatchJobRecord {
        job_id: job.job_id.clone(),
        scenario_id: job.scenario_id.clone(),
        algorithm: job.algorithm.clone(),
        status,
        solve_status,
        objective_value,
        error,
        output: output_file.display().to_string(),
        duration_ms: started.elapsed().as_millis() as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gasnet_algo::test_utils::compressor_star_network;
    use tempfile::tempdir;

    #[test]
    fn test_batch_runs_jobs_and_writes_manifest() {
        let dir = tempdir().unwrap();
        let network = compressor_star_network();
        let config = BatchRunnerConfig {
            jobs: vec![
                BatchJob::new("base", "cost-lp", network.clone()),
                BatchJob::new("base", "throughput-graph", network.clone()),
            ],
            output_root: dir.path().to_path_buf(),
            settings: OptimizationSettings::default(),
            threads: 2,
        };

        let summary = run_batch(&config).unwrap();
        assert_eq!(summary.success, 2);
        assert_eq!(summary.failure, 0);
        assert!(summary.manifest_path.exists());
        assert!(dir.path().join("base/cost-lp/result.json").exists());
    }

    #[test]
    fn test_failed_job_does_not_abort_batch() {
        let dir = tempdir().unwrap();
        let network = compressor_star_network();
        let config = BatchRunnerConfig {
            jobs: vec![
                BatchJob::new("base", "cost-lp", network.clone()),
                BatchJob::new("base", "no-such-algorithm", network.clone()),
            ],
            output_root: dir.path().to_path_buf(),
            settings: OptimizationSettings::default(),
            threads: 1,
        };

        let summary = run_batch(&config).unwrap();
        // The unknown algorithm still produces a written Error-status result,
        // so the job itself is "ok"; genuine failures are I/O level
        assert_eq!(summary.success + summary.failure, 2);
        let record = summary
            .jobs
            .iter()
            .find(|j| j.algorithm == "no-such-algorithm")
            .unwrap();
        assert_eq!(record.solve_status.as_deref(), Some("error"));
    }
}
