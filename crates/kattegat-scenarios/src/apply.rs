use kattegat_core::Network;
use tracing::debug;

use crate::spec::{OutageSpec, ResolvedScenario};

/// Apply a resolved scenario's outages to a network, modifying it in-place.
/// Links are part of the layout and are added by the builder beforehand.
///
/// Outaged lines are removed from the graph; outaged generators stay in the
/// graph with their status cleared, so they still appear in the dispatch
/// table at zero output. Demand scaling and overrides are already folded into
/// the scenario's parameters.
pub fn apply_scenario_to_network(
    network: &mut Network,
    scenario: &ResolvedScenario,
) -> anyhow::Result<()> {
    for outage in &scenario.outages {
        match outage {
            OutageSpec::Line { id } => {
                network.remove_branch(id)?;
            }
            OutageSpec::Gen { id } => {
                network.set_gen_status(id, false)?;
            }
        }
        debug!(scenario = %scenario.scenario_id, ?outage, "applied outage");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{build_network, ModelParams, Topology};

    fn scenario(outages: Vec<OutageSpec>) -> ResolvedScenario {
        ResolvedScenario {
            scenario_id: "test".into(),
            description: None,
            params: ModelParams::default(),
            outages,
            links: Vec::new(),
        }
    }

    #[test]
    fn removes_lines_and_disables_generators() {
        let mut network = build_network(&Topology::danish_triangle(), &ModelParams::default()).unwrap();
        apply_scenario_to_network(
            &mut network,
            &scenario(vec![
                OutageSpec::Line {
                    id: "Aarhus_Aalborg".into(),
                },
                OutageSpec::Gen {
                    id: "gas_Aalborg".into(),
                },
            ]),
        )
        .unwrap();

        assert_eq!(network.branches().len(), 2);
        let gas = network
            .generators()
            .into_iter()
            .find(|g| g.name == "gas_Aalborg")
            .unwrap();
        assert!(!gas.status);
    }

    #[test]
    fn unknown_line_is_an_error() {
        let mut network = build_network(&Topology::danish_triangle(), &ModelParams::default()).unwrap();
        let err = apply_scenario_to_network(
            &mut network,
            &scenario(vec![OutageSpec::Line {
                id: "Odense_Aarhus".into(),
            }]),
        )
        .unwrap_err();
        assert!(err.to_string().contains("Odense_Aarhus"));
    }
}
