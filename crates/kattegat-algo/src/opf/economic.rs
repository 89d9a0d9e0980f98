//! Merit-order economic dispatch
//!
//! Dispatches generators in order of marginal cost to minimize total cost.
//! Copper plate: lines, links and angles are not modelled, so the solution
//! carries no flows.

use std::collections::BTreeMap;
use std::time::Instant;

use kattegat_core::{Gen, Network};

use super::lp::SNAP_EPSILON;
use super::{ConstraintInfo, ConstraintType, OpfMethod, OpfSolution};
use crate::OpfError;

/// Solve using merit-order economic dispatch. With `value_of_lost_load` set,
/// unserved demand is a pseudo-unit priced at that value.
pub fn solve(network: &Network, value_of_lost_load: Option<f64>) -> Result<OpfSolution, OpfError> {
    let start = Instant::now();

    let generators: Vec<&Gen> = network.generators().into_iter().filter(|g| g.status).collect();
    if generators.is_empty() {
        return Err(OpfError::InvalidInput("No generators in network".to_string()));
    }

    let total_load = network.total_load().value();
    let total_pmin: f64 = generators.iter().map(|g| g.pmin.value()).sum();
    let total_pmax: f64 = generators.iter().map(|g| g.pmax.value()).sum();

    if total_load < total_pmin {
        return Err(OpfError::Infeasible(format!(
            "Load too low for minimum generation: need {:.2} MW, min {:.2} MW",
            total_load, total_pmin
        )));
    }
    if total_load > total_pmax && value_of_lost_load.is_none() {
        return Err(OpfError::Infeasible(format!(
            "Generator capacity insufficient: need {:.2} MW, max {:.2} MW",
            total_load, total_pmax
        )));
    }

    let (dispatch, shed) = merit_order(&generators, total_load, value_of_lost_load)?;

    let mut solution = OpfSolution {
        method_used: OpfMethod::EconomicDispatch,
        backend: "merit-order".to_string(),
        ..Default::default()
    };

    for (gen, &output) in generators.iter().zip(dispatch.iter()) {
        let output = if output.abs() < SNAP_EPSILON { 0.0 } else { output };
        solution.objective_value += output * gen.marginal_cost.value();
        solution.generator_p.insert(gen.name.clone(), output);
        if gen.pmax.value() > 0.0 && output >= gen.pmax.value() - SNAP_EPSILON {
            solution.binding_constraints.push(ConstraintInfo {
                name: gen.name.clone(),
                constraint_type: ConstraintType::GeneratorPMax,
                value: output,
                limit: gen.pmax.value(),
            });
        }
    }

    if shed > SNAP_EPSILON {
        if let Some(voll) = value_of_lost_load {
            solution.objective_value += shed * voll;
        }
        solution.load_shed = shed_by_bus(network, shed, total_load);
    }

    solution.solve_time_ms = start.elapsed().as_millis();
    Ok(solution)
}

/// Fill `required` MW cheapest-first after every unit's minimum. Ties are
/// broken by generator name so the result does not depend on insertion order.
fn merit_order(
    generators: &[&Gen],
    required: f64,
    value_of_lost_load: Option<f64>,
) -> Result<(Vec<f64>, f64), OpfError> {
    let mut dispatch: Vec<f64> = generators.iter().map(|g| g.pmin.value()).collect();
    let mut remaining = required - dispatch.iter().sum::<f64>();

    let mut order: Vec<usize> = (0..generators.len()).collect();
    order.sort_by(|&a, &b| {
        let (ga, gb) = (generators[a], generators[b]);
        ga.marginal_cost
            .value()
            .total_cmp(&gb.marginal_cost.value())
            .then_with(|| ga.name.cmp(&gb.name))
    });

    let mut shed = 0.0;
    for &idx in &order {
        if remaining <= SNAP_EPSILON {
            break;
        }
        let gen = generators[idx];
        if let Some(voll) = value_of_lost_load {
            if gen.marginal_cost.value() > voll {
                // Shedding is cheaper than every unit from here on.
                break;
            }
        }
        let headroom = (gen.pmax.value() - dispatch[idx]).max(0.0);
        let increment = remaining.min(headroom);
        dispatch[idx] += increment;
        remaining -= increment;
    }

    if remaining > SNAP_EPSILON {
        if value_of_lost_load.is_none() {
            return Err(OpfError::Infeasible(format!(
                "Cannot meet load: {:.3} MW unserved after dispatch",
                remaining
            )));
        }
        shed = remaining;
    }

    Ok((dispatch, shed))
}

/// Spread copper-plate shedding across buses in proportion to their demand.
fn shed_by_bus(network: &Network, shed: f64, total_load: f64) -> BTreeMap<String, f64> {
    network
        .buses()
        .into_iter()
        .filter_map(|bus| {
            let demand = network.demand_at_bus(bus.id).value();
            (demand > 0.0).then(|| (bus.name.clone(), shed * demand / total_load))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kattegat_core::{Bus, BusId, GenId, GeoPoint, Load, LoadId};

    fn copper_plate(load_mw: f64, units: &[(&str, f64, f64)]) -> Network {
        let mut network = Network::new();
        network
            .add_bus(Bus::new(BusId::new(0), "plate", GeoPoint::default()))
            .unwrap();
        for (i, (name, pmax, cost)) in units.iter().enumerate() {
            network
                .add_gen(
                    Gen::new(GenId::new(i), *name, BusId::new(0))
                        .with_p_limits(0.0, *pmax)
                        .with_marginal_cost(*cost),
                )
                .unwrap();
        }
        network
            .add_load(Load::new(LoadId::new(0), "load_plate", BusId::new(0), load_mw))
            .unwrap();
        network
    }

    #[test]
    fn cheapest_first() {
        let network = copper_plate(150.0, &[("gas", 120.0, 50.0), ("wind", 100.0, 20.0), ("solar", 80.0, 25.0)]);
        let solution = solve(&network, None).unwrap();
        assert_eq!(solution.generator_p["wind"], 100.0);
        assert_eq!(solution.generator_p["solar"], 50.0);
        assert_eq!(solution.generator_p["gas"], 0.0);
        assert_eq!(solution.objective_value, 3250.0);
        assert!(solution.branch_p_flow.is_empty());
        assert!(solution.is_binding("wind"));
    }

    #[test]
    fn ties_break_by_name() {
        let network = copper_plate(30.0, &[("b_unit", 50.0, 10.0), ("a_unit", 50.0, 10.0)]);
        let solution = solve(&network, None).unwrap();
        assert_eq!(solution.generator_p["a_unit"], 30.0);
        assert_eq!(solution.generator_p["b_unit"], 0.0);
    }

    #[test]
    fn shortfall_is_infeasible_without_shedding() {
        let network = copper_plate(200.0, &[("wind", 100.0, 20.0)]);
        assert!(matches!(solve(&network, None), Err(OpfError::Infeasible(_))));
    }

    #[test]
    fn shortfall_is_shed_at_voll() {
        let network = copper_plate(200.0, &[("wind", 100.0, 20.0)]);
        let solution = solve(&network, Some(10_000.0)).unwrap();
        assert_eq!(solution.generator_p["wind"], 100.0);
        assert!((solution.total_load_shed() - 100.0).abs() < 1e-9);
        assert!((solution.objective_value - (2000.0 + 1_000_000.0)).abs() < 1e-6);
    }
}
