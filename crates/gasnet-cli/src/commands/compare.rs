use anyhow::Result;
use gasnet_algo::{OptimizationEngine, OptimizationSettings};

use super::load_checked;

pub fn handle(
    config: &str,
    algorithms: &[String],
    pressure: bool,
    compressors: bool,
) -> Result<()> {
    let network = load_checked(config)?;

    let mut settings = OptimizationSettings::default();
    settings.enable_pressure_constraints = pressure;
    settings.enable_compressor_stations = compressors;

    let engine = OptimizationEngine::with_defaults();
    let names: Vec<String> = if algorithms.is_empty() {
        engine
            .algorithm_names()
            .into_iter()
            .map(|s| s.to_string())
            .collect()
    } else {
        algorithms.to_vec()
    };

    let results = engine.compare(&network, &names, &settings);
    print!("{}", OptimizationEngine::report(&results));
    Ok(())
}
