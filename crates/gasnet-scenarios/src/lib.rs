//! # gasnet-scenarios: What-If Variants
//!
//! Scenario files (YAML or JSON) describe variants of a base network:
//! outages, demand/supply scaling, capacity overrides. Applying a scenario
//! deep-copies the base, so batch runs over many scenarios share nothing
//! mutable.

pub mod apply;
pub mod spec;

pub use apply::apply_scenario;
pub use spec::{
    load_spec_from_path, resolve_scenarios, validate, OutageSpec, ResolvedScenario,
    ScenarioDefaults, ScenarioSet, ScenarioSpec,
};
