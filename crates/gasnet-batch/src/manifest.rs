//! Batch manifest: the JSON summary downstream tooling reads.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::job::BatchJobRecord;

/// Summary of a whole batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchManifest {
    pub created_at: DateTime<Utc>,
    pub num_jobs: usize,
    pub success: usize,
    pub failure: usize,
    pub jobs: Vec<BatchJobRecord>,
}

/// Write the manifest next to the per-job outputs.
pub fn write_batch_manifest(path: &Path, manifest: &BatchManifest) -> Result<()> {
    let data = serde_json::to_string_pretty(manifest).context("serializing batch manifest")?;
    fs::write(path, data)
        .with_context(|| format!("writing batch manifest '{}'", path.display()))?;
    Ok(())
}

/// Read a previously written manifest.
pub fn read_batch_manifest(path: &Path) -> Result<BatchManifest> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading batch manifest '{}'", path.display()))?;
    serde_json::from_str(&data).context("parsing batch manifest")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_manifest_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("batch_manifest.json");
        let manifest = BatchManifest {
            created_at: Utc::now(),
            num_jobs: 2,
            success: 1,
            failure: 1,
            jobs: vec![BatchJobRecord {
                job_id: "base/cost-lp".to_string(),
                scenario_id: "base".to_string(),
                algorithm: "cost-lp".to_string(),
                status: "ok".to_string(),
                solve_status: Some("optimal".to_string()),
                objective_value: Some(232.0),
                error: None,
                output: "base/cost-lp/result.json".to_string(),
                duration_ms: 4,
            }],
        };
        write_batch_manifest(&path, &manifest).unwrap();
        let back = read_batch_manifest(&path).unwrap();
        assert_eq!(back.num_jobs, 2);
        assert_eq!(back.jobs[0].job_id, "base/cost-lp");
    }
}
