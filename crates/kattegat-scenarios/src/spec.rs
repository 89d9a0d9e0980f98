use anyhow::{anyhow, Context, Result};
use kattegat_algo::{OpfError, OpfSolver};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::apply::apply_scenario_to_network;
use crate::builder::{build_network, solve_network};
use crate::params::{ModelParams, ParamField};
use crate::result::ResultSet;
use crate::topology::{LinkCorridor, Topology};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSet {
    pub version: Option<u32>,
    /// Base parameters every scenario starts from
    #[serde(default)]
    pub defaults: ModelParams,
    #[serde(default)]
    pub scenarios: Vec<ScenarioSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSpec {
    pub scenario_id: String,
    pub description: Option<String>,
    /// Field key (`demand.aarhus`, `cost.gas`, ...) -> value
    #[serde(default)]
    pub overrides: BTreeMap<String, f64>,
    /// Multiplier applied to every demand after overrides
    pub load_scale: Option<f64>,
    #[serde(default)]
    pub outages: Vec<OutageSpec>,
    /// Controllable links added on top of the reference lines
    #[serde(default)]
    pub links: Vec<LinkSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkSpec {
    pub id: String,
    /// Sending site name
    pub from: String,
    pub to: String,
    pub p_nom: f64,
    #[serde(default = "default_efficiency")]
    pub efficiency: f64,
    #[serde(default)]
    pub bidirectional: bool,
}

fn default_efficiency() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutageSpec {
    Line { id: String },
    Gen { id: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedScenario {
    pub scenario_id: String,
    pub description: Option<String>,
    pub params: ModelParams,
    pub outages: Vec<OutageSpec>,
    pub links: Vec<LinkCorridor>,
}

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

pub fn resolve_scenarios(set: &ScenarioSet) -> Result<Vec<ResolvedScenario>> {
    if set.scenarios.is_empty() {
        return Err(anyhow!("scenario set contains no scenarios"));
    }
    set.defaults
        .validate()
        .context("invalid scenario defaults")?;

    let topology = Topology::danish_triangle();
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

        let mut params = set.defaults;
        for (key, value) in &scenario.overrides {
            let field: ParamField = key
                .parse()
                .map_err(|e: String| anyhow!(e))
                .with_context(|| format!("scenario '{}'", scenario.scenario_id))?;
            params
                .set(field, *value)
                .with_context(|| format!("scenario '{}'", scenario.scenario_id))?;
        }
        if let Some(scale) = scenario.load_scale {
            if !scale.is_finite() || scale < 0.0 {
                return Err(anyhow!(
                    "scenario '{}': load_scale must be a non-negative number, got {}",
                    scenario.scenario_id,
                    scale
                ));
            }
            params = params.with_load_scale(scale);
        }

        let links = scenario
            .links
            .iter()
            .map(|link| resolve_link(&topology, link))
            .collect::<Result<Vec<_>>>()
            .with_context(|| format!("scenario '{}'", scenario.scenario_id))?;

        resolved.push(ResolvedScenario {
            scenario_id: scenario.scenario_id.clone(),
            description: scenario.description.clone(),
            params,
            outages: scenario.outages.clone(),
            links,
        });
    }
    Ok(resolved)
}

fn resolve_link(topology: &Topology, link: &LinkSpec) -> Result<LinkCorridor> {
    let site = |name: &str| {
        topology
            .site_index(name)
            .ok_or_else(|| anyhow!("link '{}': unknown site '{}'", link.id, name))
    };
    let (from, to) = (site(&link.from)?, site(&link.to)?);
    if from == to {
        return Err(anyhow!("link '{}' must join two different sites", link.id));
    }
    if !link.p_nom.is_finite() || link.p_nom < 0.0 {
        return Err(anyhow!(
            "link '{}': p_nom must be a non-negative number, got {}",
            link.id,
            link.p_nom
        ));
    }
    if !(link.efficiency > 0.0 && link.efficiency <= 1.0) {
        return Err(anyhow!(
            "link '{}': efficiency must be in (0, 1], got {}",
            link.id,
            link.efficiency
        ));
    }
    Ok(LinkCorridor {
        name: link.id.clone(),
        from,
        to,
        p_nom: link.p_nom,
        efficiency: link.efficiency,
        bidirectional: link.bidirectional,
    })
}

pub fn validate(set: &ScenarioSet) -> Result<()> {
    resolve_scenarios(set).map(|_| ())
}

/// What happened to one scenario. A failed scenario carries the error
/// category and message; the batch itself never aborts.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioOutcome {
    pub scenario_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ResultSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScenarioOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_some()
    }

    pub fn status(&self) -> &'static str {
        if self.is_ok() {
            "ok"
        } else {
            "failed"
        }
    }
}

/// Solve every scenario on the reference layout, in order.
pub fn run_scenarios(scenarios: &[ResolvedScenario], solver: &OpfSolver) -> Vec<ScenarioOutcome> {
    let topology = Topology::danish_triangle();
    scenarios
        .iter()
        .map(|scenario| {
            let outcome = run_one(&topology, scenario, solver);
            match outcome {
                Ok(result) => {
                    info!(
                        scenario = %scenario.scenario_id,
                        cost = result.total_cost(),
                        "scenario solved"
                    );
                    ScenarioOutcome {
                        scenario_id: scenario.scenario_id.clone(),
                        result: Some(result),
                        category: None,
                        error: None,
                    }
                }
                Err(err) => {
                    warn!(scenario = %scenario.scenario_id, error = %err, "scenario failed");
                    ScenarioOutcome {
                        scenario_id: scenario.scenario_id.clone(),
                        result: None,
                        category: Some(err.category()),
                        error: Some(err.to_string()),
                    }
                }
            }
        })
        .collect()
}

fn run_one(
    topology: &Topology,
    scenario: &ResolvedScenario,
    solver: &OpfSolver,
) -> Result<ResultSet, OpfError> {
    scenario.params.validate()?;
    let topology = scenario
        .links
        .iter()
        .cloned()
        .fold(topology.clone(), Topology::with_link);
    let mut network = build_network(&topology, &scenario.params)?;
    apply_scenario_to_network(&mut network, scenario)
        .map_err(|e| OpfError::InvalidInput(format!("{:#}", e)))?;
    solve_network(&network, solver)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPEC: &str = r#"
version: 1
defaults:
  demand: [50, 50, 50]
scenarios:
  - scenario_id: base
  - scenario_id: hot_day
    description: Higher demand everywhere
    load_scale: 1.5
    overrides:
      cost.gas: 60
  - scenario_id: line_out
    outages:
      - type: line
        id: Aarhus_Aalborg
"#;

    fn parse(text: &str) -> ScenarioSet {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn resolves_overrides_and_scale() {
        let resolved = resolve_scenarios(&parse(SPEC)).unwrap();
        assert_eq!(resolved.len(), 3);
        assert_eq!(resolved[0].params, ModelParams::default());
        assert_eq!(resolved[1].params.demand, [75.0, 75.0, 75.0]);
        assert_eq!(resolved[1].params.cost[2], 60.0);
        assert_eq!(
            resolved[2].outages,
            vec![OutageSpec::Line {
                id: "Aarhus_Aalborg".into()
            }]
        );
    }

    #[test]
    fn rejects_duplicates_and_unknown_fields() {
        let dup = parse("scenarios:\n  - scenario_id: a\n  - scenario_id: a\n");
        assert!(resolve_scenarios(&dup)
            .unwrap_err()
            .to_string()
            .contains("duplicate"));

        let unknown = parse("scenarios:\n  - scenario_id: a\n    overrides:\n      price.gas: 3\n");
        let err = format!("{:#}", resolve_scenarios(&unknown).unwrap_err());
        assert!(err.contains("price.gas"), "{err}");

        let negative = parse("scenarios:\n  - scenario_id: a\n    overrides:\n      demand.aarhus: -1\n");
        assert!(validate(&negative).is_err());

        assert!(validate(&parse("version: 1\n")).is_err());
    }

    #[test]
    fn batch_continues_past_failures() {
        let set = parse(
            r#"
scenarios:
  - scenario_id: short
    overrides:
      capacity.wind: 0
      capacity.solar: 0
      capacity.gas: 10
  - scenario_id: base
"#,
        );
        let resolved = resolve_scenarios(&set).unwrap();
        let outcomes = run_scenarios(&resolved, &OpfSolver::new());

        assert_eq!(outcomes[0].status(), "failed");
        assert_eq!(outcomes[0].category, Some("infeasible"));
        assert!(outcomes[1].is_ok());
        let cost = outcomes[1].result.as_ref().unwrap().total_cost();
        assert!((cost - 3250.0).abs() < 1e-3);
    }

    #[test]
    fn links_resolve_to_site_indices() {
        let set = parse(
            r#"
scenarios:
  - scenario_id: hvdc
    links:
      - id: kattegat_hvdc
        from: Aalborg
        to: copenhagen
        p_nom: 60
        efficiency: 0.97
"#,
        );
        let resolved = resolve_scenarios(&set).unwrap();
        let link = &resolved[0].links[0];
        assert_eq!((link.from, link.to), (2, 0));
        assert_eq!(link.efficiency, 0.97);
        assert!(!link.bidirectional);

        let bad_site = parse(
            "scenarios:\n  - scenario_id: a\n    links:\n      - {id: x, from: Odense, to: Aarhus, p_nom: 10}\n",
        );
        let err = format!("{:#}", resolve_scenarios(&bad_site).unwrap_err());
        assert!(err.contains("Odense"), "{err}");

        let lossy = parse(
            "scenarios:\n  - scenario_id: a\n    links:\n      - {id: x, from: Aalborg, to: Aarhus, p_nom: 10, efficiency: 0}\n",
        );
        assert!(validate(&lossy).is_err());
    }

    #[test]
    fn link_carries_power_past_congested_lines() {
        let set = parse(
            r#"
scenarios:
  - scenario_id: congested
    overrides:
      demand.copenhagen: 300
      demand.aarhus: 0
      demand.aalborg: 0
      capacity.wind: 0
      capacity.solar: 0
      capacity.gas: 400
  - scenario_id: with_link
    overrides:
      demand.copenhagen: 300
      demand.aarhus: 0
      demand.aalborg: 0
      capacity.wind: 0
      capacity.solar: 0
      capacity.gas: 400
    links:
      - id: hvdc
        from: Aalborg
        to: Copenhagen
        p_nom: 150
        efficiency: 0.9
"#,
        );
        let outcomes = run_scenarios(&resolve_scenarios(&set).unwrap(), &OpfSolver::new());

        assert_eq!(outcomes[0].category, Some("infeasible"));
        let result = outcomes[1].result.as_ref().unwrap();
        let sent = 120.0 / 0.9;
        assert!((result.line_flows()["hvdc"] - sent).abs() < 1e-3);
        assert!((result.dispatch()["gas_Aalborg"] - (180.0 + sent)).abs() < 1e-3);
        assert_eq!(
            result.line_buses()["hvdc"],
            ("Aalborg".to_string(), "Copenhagen".to_string())
        );
        assert!((result.line_loading_percent("hvdc").unwrap() - 100.0 * sent / 150.0).abs() < 1e-3);
    }
}
