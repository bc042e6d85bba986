//! Scenario specification files: what-if variants of a base network.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

/// A whole scenario file: shared defaults plus the scenario list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSet {
    pub version: Option<u32>,
    /// Optional pointer back to the base network configuration
    pub network_file: Option<String>,
    #[serde(default)]
    pub defaults: ScenarioDefaults,
    #[serde(default)]
    pub scenarios: Vec<ScenarioSpec>,
}

/// Defaults merged into every scenario that leaves a field unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioDefaults {
    #[serde(default = "default_scale")]
    pub demand_scale: f64,
    #[serde(default = "default_scale")]
    pub supply_scale: f64,
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_scale() -> f64 {
    1.0
}

impl Default for ScenarioDefaults {
    fn default() -> Self {
        Self {
            demand_scale: default_scale(),
            supply_scale: default_scale(),
            tags: Vec::new(),
        }
    }
}

/// One scenario as written in the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSpec {
    pub scenario_id: String,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    /// Elements switched off in this scenario
    #[serde(default)]
    pub outages: Vec<OutageSpec>,
    pub demand_scale: Option<f64>,
    pub supply_scale: Option<f64>,
    /// Capacity overrides keyed by segment id (MMscfd)
    #[serde(default)]
    pub capacity_overrides: BTreeMap<String, f64>,
}

/// An element taken out of service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutageSpec {
    Point { id: String },
    Segment { id: String },
}

/// A scenario with defaults folded in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedScenario {
    pub scenario_id: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub outages: Vec<OutageSpec>,
    pub demand_scale: f64,
    pub supply_scale: f64,
    pub capacity_overrides: BTreeMap<String, f64>,
}

/// Load a scenario file; YAML or JSON, decided by extension with a
/// try-both fallback.
pub fn load_spec_from_path(path: &Path) -> Result<ScenarioSet> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading scenario spec '{}'", path.display()))?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
            serde_yaml::from_str(&data).context("parsing scenario spec yaml")
        }
        Some(ext) if ext.eq_ignore_ascii_case("json") => {
            serde_json::from_str(&data).context("parsing scenario spec json")
        }
        _ => serde_yaml::from_str(&data)
            .or_else(|_| serde_json::from_str(&data))
            .context("parsing scenario spec"),
    }
}

/// Fold defaults into every scenario, rejecting duplicate or empty ids.
pub fn resolve_scenarios(set: &ScenarioSet) -> Result<Vec<ResolvedScenario>> {
    if set.scenarios.is_empty() {
        return Err(anyhow!("scenario set contains no scenarios"));
    }
    let defaults = set.defaults.clone();
    let mut seen = HashSet::new();
    let mut resolved = Vec::with_capacity(set.scenarios.len());
    for scenario in &set.scenarios {
        if scenario.scenario_id.trim().is_empty() {
            return Err(anyhow!("scenario_id cannot be empty"));
        }
        if !seen.insert(scenario.scenario_id.clone()) {
            return Err(anyhow!(
                "duplicate scenario_id '{}' in spec",
                scenario.scenario_id
            ));
        }
        let demand_scale = scenario.demand_scale.unwrap_or(defaults.demand_scale);
        let supply_scale = scenario.supply_scale.unwrap_or(defaults.supply_scale);
        if demand_scale < 0.0 || supply_scale < 0.0 {
            return Err(anyhow!(
                "scenario '{}' has a negative scale factor",
                scenario.scenario_id
            ));
        }
        resolved.push(ResolvedScenario {
            scenario_id: scenario.scenario_id.clone(),
            description: scenario.description.clone(),
            tags: scenario
                .tags
                .as_ref()
                .cloned()
                .unwrap_or_else(|| defaults.tags.clone()),
            outages: scenario.outages.clone(),
            demand_scale,
            supply_scale,
            capacity_overrides: scenario.capacity_overrides.clone(),
        });
    }
    Ok(resolved)
}

/// Validate without keeping the resolution.
pub fn validate(set: &ScenarioSet) -> Result<()> {
    resolve_scenarios(set).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_scenario(id: &str) -> ScenarioSpec {
        ScenarioSpec {
            scenario_id: id.to_string(),
            description: None,
            tags: None,
            outages: Vec::new(),
            demand_scale: None,
            supply_scale: None,
            capacity_overrides: BTreeMap::new(),
        }
    }

    #[test]
    fn test_defaults_fold_in() {
        let set = ScenarioSet {
            version: Some(1),
            network_file: None,
            defaults: ScenarioDefaults {
                demand_scale: 1.2,
                supply_scale: 1.0,
                tags: vec!["sensitivity".to_string()],
            },
            scenarios: vec![one_scenario("high-demand")],
        };
        let resolved = resolve_scenarios(&set).unwrap();
        assert_eq!(resolved[0].demand_scale, 1.2);
        assert_eq!(resolved[0].tags, vec!["sensitivity"]);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let set = ScenarioSet {
            version: None,
            network_file: None,
            defaults: ScenarioDefaults::default(),
            scenarios: vec![one_scenario("a"), one_scenario("a")],
        };
        assert!(resolve_scenarios(&set).is_err());
    }

    #[test]
    fn test_empty_set_rejected() {
        let set = ScenarioSet {
            version: None,
            network_file: None,
            defaults: ScenarioDefaults::default(),
            scenarios: Vec::new(),
        };
        assert!(validate(&set).is_err());
    }

    #[test]
    fn test_yaml_parses() {
        let yaml = r#"
version: 1
defaults:
  demand_scale: 1.0
scenarios:
  - scenario_id: peak-winter
    demand_scale: 1.5
    outages:
      - type: segment
        id: S3
    capacity_overrides:
      S2: 450.0
"#;
        let set: ScenarioSet = serde_yaml::from_str(yaml).unwrap();
        let resolved = resolve_scenarios(&set).unwrap();
        assert_eq!(resolved[0].demand_scale, 1.5);
        assert!(matches!(&resolved[0].outages[0], OutageSpec::Segment { id } if id == "S3"));
        assert_eq!(resolved[0].capacity_overrides["S2"], 450.0);
    }

    #[test]
    fn test_negative_scale_rejected() {
        let mut scenario = one_scenario("bad");
        scenario.demand_scale = Some(-0.5);
        let set = ScenarioSet {
            version: None,
            network_file: None,
            defaults: ScenarioDefaults::default(),
            scenarios: vec![scenario],
        };
        assert!(resolve_scenarios(&set).is_err());
    }
}
