use std::path::{Path, PathBuf};

use anyhow::Result;
use gasnet_algo::OptimizationSettings;
use gasnet_batch::{expand_jobs, run_batch, BatchRunnerConfig};
use gasnet_scenarios::{load_spec_from_path, resolve_scenarios};

use super::load_checked;

pub fn validate(spec: &str) -> Result<()> {
    let set = load_spec_from_path(Path::new(spec))?;
    let resolved = resolve_scenarios(&set)?;
    println!("{} scenarios resolved", resolved.len());
    for scenario in &resolved {
        println!(
            "  {} (demand x{:.2}, supply x{:.2}, {} outages)",
            scenario.scenario_id,
            scenario.demand_scale,
            scenario.supply_scale,
            scenario.outages.len()
        );
    }
    Ok(())
}

pub fn run(
    config: &str,
    spec: &str,
    out: &str,
    algorithms: &[String],
    threads: usize,
) -> Result<()> {
    let network = load_checked(config)?;
    let set = load_spec_from_path(Path::new(spec))?;
    let scenarios = resolve_scenarios(&set)?;

    let jobs = expand_jobs(&network, &scenarios, algorithms, true)?;
    println!("running {} jobs", jobs.len());

    let summary = run_batch(&BatchRunnerConfig {
        jobs,
        output_root: PathBuf::from(out),
        settings: OptimizationSettings::default(),
        threads,
    })?;

    println!(
        "batch complete: {} ok, {} failed; manifest at {}",
        summary.success,
        summary.failure,
        summary.manifest_path.display()
    );
    Ok(())
}
