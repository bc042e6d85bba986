use std::path::Path;

use anyhow::{bail, Result};
use gasnet_algo::{OptimizationEngine, OptimizationSettings};
use gasnet_io::write_result_json;

use super::load_checked;

#[allow(clippy::too_many_arguments)]
pub fn handle(
    config: &str,
    algorithm: &str,
    out: Option<&str>,
    pressure: bool,
    compressors: bool,
    solver: &str,
    time_limit: u64,
) -> Result<()> {
    let network = load_checked(config)?;

    let mut settings = OptimizationSettings::default();
    settings.enable_pressure_constraints = pressure;
    settings.enable_compressor_stations = compressors;
    settings.preferred_solver = solver.to_string();
    settings.max_solution_time_seconds = time_limit;

    let engine = OptimizationEngine::with_defaults();
    let result = engine.optimize(&network, algorithm, &settings);

    println!(
        "{} on '{}': {} (objective {:.2}, {} ms)",
        algorithm, network.name, result.status, result.objective_value, result.elapsed_ms
    );
    println!(
        "  throughput {:.2} MMscfd, demand {:.2}/{:.2} MMscfd, total cost ${:.2}",
        result.metrics.total_throughput,
        result.metrics.demand_satisfied,
        result.metrics.demand_required,
        result.cost_breakdown.total()
    );
    for message in &result.messages {
        println!("  {}", message);
    }
    for violation in &result.validation_errors {
        eprintln!("  violation: {}", violation);
    }

    if let Some(out) = out {
        write_result_json(&result, Path::new(out))?;
        println!("result written to {}", out);
    }

    if !result.status.has_solution() {
        bail!("optimization ended with status '{}'", result.status);
    }
    if !result.is_validated() {
        bail!(
            "solution failed post-validation with {} violations",
            result.validation_errors.len()
        );
    }
    Ok(())
}
