//! Model builder: nine parameters in, [`ResultSet`] out.

use kattegat_algo::{OpfError, OpfSolver};
use kattegat_core::{
    Branch, BranchId, Bus, BusId, Gen, GenId, Link, LinkId, Load, LoadId, Network,
};
use tracing::debug;

use crate::params::ModelParams;
use crate::result::ResultSet;
use crate::topology::Topology;

/// Instantiate `topology` with the values in `params`: one bus, generator and
/// load per site, one line per corridor and one link per link corridor.
pub fn build_network(topology: &Topology, params: &ModelParams) -> Result<Network, OpfError> {
    if topology.sites.len() != params.demand.len() {
        return Err(OpfError::InvalidInput(format!(
            "topology has {} sites but the model takes {}",
            topology.sites.len(),
            params.demand.len()
        )));
    }

    let mut network = Network::new();
    for (i, site) in topology.sites.iter().enumerate() {
        let bus = BusId::new(i);
        network.add_bus(Bus::new(bus, site.name.clone(), site.location))?;
        network.add_gen(
            Gen::new(GenId::new(i), site.generator_name(), bus)
                .with_p_limits(0.0, params.capacity[i])
                .with_marginal_cost(params.cost[i])
                .with_carrier(site.technology.clone()),
        )?;
        network.add_load(Load::new(LoadId::new(i), site.load_name(), bus, params.demand[i]))?;
    }

    for (i, corridor) in topology.corridors.iter().enumerate() {
        let name = topology.line_name(corridor).ok_or_else(|| {
            OpfError::InvalidInput(format!(
                "corridor {} -> {} references a missing site",
                corridor.from, corridor.to
            ))
        })?;
        network.add_branch(
            Branch::new(
                BranchId::new(i),
                name,
                BusId::new(corridor.from),
                BusId::new(corridor.to),
                topology.reactance_per_km * corridor.length_km,
            )
            .with_length(corridor.length_km)
            .with_s_max(topology.line_rating_mw),
        )?;
    }

    for (i, corridor) in topology.links.iter().enumerate() {
        let mut link = Link::new(
            LinkId::new(i),
            corridor.name.clone(),
            BusId::new(corridor.from),
            BusId::new(corridor.to),
            corridor.p_nom,
        )
        .with_efficiency(corridor.efficiency);
        if corridor.bidirectional {
            link = link.bidirectional();
        }
        network.add_link(link)?;
    }

    debug!(stats = %network.stats(), "built model network");
    Ok(network)
}

/// Solve the reference Danish triangle for `params`.
pub fn run_model(params: &ModelParams, solver: &OpfSolver) -> Result<ResultSet, OpfError> {
    run_model_on(&Topology::danish_triangle(), params, solver)
}

/// Validate, build and solve. Pure apart from logging: the same inputs give
/// the same [`ResultSet`].
pub fn run_model_on(
    topology: &Topology,
    params: &ModelParams,
    solver: &OpfSolver,
) -> Result<ResultSet, OpfError> {
    params.validate()?;
    let network = build_network(topology, params)?;
    solve_network(&network, solver)
}

pub(crate) fn solve_network(network: &Network, solver: &OpfSolver) -> Result<ResultSet, OpfError> {
    let solution = solver.solve(network)?;
    Ok(ResultSet::from_solution(network, &solution))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_reference_elements() {
        let network = build_network(&Topology::danish_triangle(), &ModelParams::default()).unwrap();
        let stats = network.stats();
        assert_eq!(stats.num_buses, 3);
        assert_eq!(stats.num_gens, 3);
        assert_eq!(stats.num_loads, 3);
        assert_eq!(stats.num_branches, 3);

        let names: Vec<_> = network.generators().iter().map(|g| g.name.clone()).collect();
        assert_eq!(names, vec!["wind_Copenhagen", "solar_Aarhus", "gas_Aalborg"]);

        let line = network.branches()[2];
        assert_eq!(line.name, "Aalborg_Copenhagen");
        assert!((line.reactance.value() - 2.0).abs() < 1e-12);
        assert_eq!(line.s_max.map(|s| s.value()), Some(100.0));
    }

    #[test]
    fn link_corridors_become_links() {
        let topology = Topology::danish_triangle().with_link(crate::topology::LinkCorridor {
            name: "hvdc".into(),
            from: 2,
            to: 0,
            p_nom: 80.0,
            efficiency: 0.95,
            bidirectional: true,
        });
        let network = build_network(&topology, &ModelParams::default()).unwrap();
        assert_eq!(network.stats().num_links, 1);
        let link = network.links()[0];
        assert_eq!((link.from_bus, link.to_bus), (BusId::new(2), BusId::new(0)));
        assert_eq!(link.p_min.value(), -80.0);
        assert_eq!(link.efficiency, 0.95);
    }

    #[test]
    fn site_count_must_match() {
        let mut topology = Topology::danish_triangle();
        topology.sites.pop();
        let err = build_network(&topology, &ModelParams::default()).unwrap_err();
        assert!(matches!(err, OpfError::InvalidInput(_)));
    }
}
