//! DC optimal power flow as a linear program.
//!
//! Linearized OPF using the DC power flow approximation:
//! - Ignores reactive power and losses
//! - Assumes flat voltage magnitudes
//! - Branch flow follows angle differences: `x_b · f_b = θ_from − θ_to`
//!
//! Columns: one output per in-service generator, one flow per branch and per
//! link, one angle per bus (the first bus of every island is fixed to 0), and
//! optionally one shed variable per bus with demand.
//!
//! Rows: nodal balance `Σ p_g − Σ f_out + Σ f_in + shed_n = d_n` and one
//! KVL row per branch. Writing flows as explicit columns keeps line ratings
//! as plain variable bounds.

use std::collections::{HashMap, HashSet};

use kattegat_core::{bus_islands, BusId, Network};
use tracing::debug;

use super::lp::{LinearProgram, LpSolution, SNAP_EPSILON};
use super::{ConstraintInfo, ConstraintType, OpfMethod, OpfSolution};
use crate::OpfError;

struct GenColumn {
    name: String,
    index: usize,
    pmin: f64,
    pmax: f64,
}

struct FlowColumn {
    name: String,
    index: usize,
    lower: f64,
    upper: f64,
}

/// A DC-OPF instance together with the column map needed to read it back.
pub(crate) struct DcOpfProblem {
    pub program: LinearProgram,
    gens: Vec<GenColumn>,
    branches: Vec<FlowColumn>,
    links: Vec<FlowColumn>,
    angles: Vec<(String, usize)>,
    shed: Vec<(String, usize)>,
}

/// Build the LP for `network`. With `value_of_lost_load` set, demand may go
/// unserved at that price per MWh.
pub(crate) fn build(network: &Network, value_of_lost_load: Option<f64>) -> Result<DcOpfProblem, OpfError> {
    let buses = network.buses();
    let row_of: HashMap<BusId, usize> = buses.iter().enumerate().map(|(i, b)| (b.id, i)).collect();
    let locate = |bus: BusId, owner: &str| {
        row_of.get(&bus).copied().ok_or_else(|| {
            OpfError::InvalidInput(format!("'{}' references unknown bus id {}", owner, bus.value()))
        })
    };

    let mut program = LinearProgram::new();
    let mut balance: Vec<Vec<(usize, f64)>> = vec![Vec::new(); buses.len()];
    let mut demand = vec![0.0; buses.len()];

    for load in network.loads() {
        demand[locate(load.bus, &load.name)?] += load.active_power.value();
    }

    let references: HashSet<BusId> = bus_islands(network)
        .into_iter()
        .filter_map(|island| island.first().copied())
        .collect();

    let angles: Vec<(String, usize)> = buses
        .iter()
        .map(|bus| {
            let name = format!("theta_{}", bus.name);
            let index = if references.contains(&bus.id) {
                program.add_variable(name, 0.0, 0.0, 0.0)
            } else {
                program.add_free_variable(name)
            };
            (bus.name.clone(), index)
        })
        .collect();

    let mut gens = Vec::new();
    for gen in network.generators().into_iter().filter(|g| g.status) {
        let row = locate(gen.bus, &gen.name)?;
        let (pmin, pmax) = (gen.pmin.value(), gen.pmax.value());
        let index = program.add_variable(gen.name.clone(), pmin, pmax, gen.marginal_cost.value());
        balance[row].push((index, 1.0));
        gens.push(GenColumn {
            name: gen.name.clone(),
            index,
            pmin,
            pmax,
        });
    }

    let mut branches = Vec::new();
    for branch in network.branches().into_iter().filter(|b| b.status) {
        let from = locate(branch.from_bus, &branch.name)?;
        let to = locate(branch.to_bus, &branch.name)?;
        let limit = branch.s_max.map(|s| s.value()).unwrap_or(f64::INFINITY);
        let index = program.add_variable(branch.name.clone(), -limit, limit, 0.0);
        balance[from].push((index, -1.0));
        balance[to].push((index, 1.0));
        program.add_equality(
            format!("kvl_{}", branch.name),
            vec![
                (index, branch.reactance.value()),
                (angles[from].1, -1.0),
                (angles[to].1, 1.0),
            ],
            0.0,
        );
        branches.push(FlowColumn {
            name: branch.name.clone(),
            index,
            lower: -limit,
            upper: limit,
        });
    }

    let mut links = Vec::new();
    for link in network.links().into_iter().filter(|l| l.status) {
        let from = locate(link.from_bus, &link.name)?;
        let to = locate(link.to_bus, &link.name)?;
        let (lower, upper) = (link.p_min.value(), link.p_max.value());
        let index = program.add_variable(link.name.clone(), lower, upper, 0.0);
        balance[from].push((index, -1.0));
        balance[to].push((index, link.efficiency));
        links.push(FlowColumn {
            name: link.name.clone(),
            index,
            lower,
            upper,
        });
    }

    let mut shed = Vec::new();
    if let Some(voll) = value_of_lost_load {
        for (row, bus) in buses.iter().enumerate() {
            if demand[row] > 0.0 {
                let index = program.add_variable(format!("shed_{}", bus.name), 0.0, demand[row], voll);
                balance[row].push((index, 1.0));
                shed.push((bus.name.clone(), index));
            }
        }
    }

    for (row, terms) in balance.into_iter().enumerate() {
        if terms.is_empty() {
            if demand[row] > 0.0 {
                return Err(OpfError::Infeasible(format!(
                    "bus '{}' has {:.1} MW of demand but no supply or connection",
                    buses[row].name, demand[row]
                )));
            }
            continue;
        }
        program.add_equality(format!("balance_{}", buses[row].name), terms, demand[row]);
    }

    debug!(
        variables = program.num_variables(),
        equalities = program.num_equalities(),
        generators = gens.len(),
        branches = branches.len(),
        links = links.len(),
        "built DC-OPF program"
    );

    Ok(DcOpfProblem {
        program,
        gens,
        branches,
        links,
        angles,
        shed,
    })
}

impl DcOpfProblem {
    /// Read a backend's answer back into named quantities.
    pub(crate) fn extract(&self, lp: &LpSolution, backend: &str, tolerance: f64) -> OpfSolution {
        let at_bound = |value: f64, bound: f64| {
            (value - bound).abs() <= tolerance.max(1e-5 * bound.abs().max(1.0))
        };

        let mut solution = OpfSolution {
            method_used: OpfMethod::DcOpf,
            backend: backend.to_string(),
            objective_value: lp.objective,
            ..Default::default()
        };

        for gen in &self.gens {
            let p = lp.value(gen.index);
            solution.generator_p.insert(gen.name.clone(), p);
            if gen.pmax > 0.0 && at_bound(p, gen.pmax) {
                solution.binding_constraints.push(ConstraintInfo {
                    name: gen.name.clone(),
                    constraint_type: ConstraintType::GeneratorPMax,
                    value: p,
                    limit: gen.pmax,
                });
            } else if gen.pmin > 0.0 && at_bound(p, gen.pmin) {
                solution.binding_constraints.push(ConstraintInfo {
                    name: gen.name.clone(),
                    constraint_type: ConstraintType::GeneratorPMin,
                    value: p,
                    limit: gen.pmin,
                });
            }
        }

        for branch in &self.branches {
            let flow = lp.value(branch.index);
            solution.branch_p_flow.insert(branch.name.clone(), flow);
            if branch.upper.is_finite() && branch.upper > 0.0 && at_bound(flow.abs(), branch.upper) {
                solution.binding_constraints.push(ConstraintInfo {
                    name: branch.name.clone(),
                    constraint_type: ConstraintType::BranchFlowLimit,
                    value: flow,
                    limit: branch.upper,
                });
            }
        }

        for link in &self.links {
            let flow = lp.value(link.index);
            solution.link_p_flow.insert(link.name.clone(), flow);
            let bound = if flow >= 0.0 { link.upper } else { link.lower };
            if bound != 0.0 && at_bound(flow, bound) {
                solution.binding_constraints.push(ConstraintInfo {
                    name: link.name.clone(),
                    constraint_type: ConstraintType::LinkLimit,
                    value: flow,
                    limit: bound,
                });
            }
        }

        for (bus, index) in &self.angles {
            solution.bus_angle.insert(bus.clone(), lp.value(*index));
        }

        for (bus, index) in &self.shed {
            let mw = lp.value(*index);
            if mw > SNAP_EPSILON {
                solution.load_shed.insert(bus.clone(), mw);
            }
        }

        solution
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kattegat_core::{Branch, BranchId, Bus, Gen, GenId, GeoPoint, Load, LoadId};

    fn two_bus(load_mw: f64) -> Network {
        let mut network = Network::new();
        network
            .add_bus(Bus::new(BusId::new(0), "west", GeoPoint::default()))
            .unwrap();
        network
            .add_bus(Bus::new(BusId::new(1), "east", GeoPoint::default()))
            .unwrap();
        network
            .add_gen(
                Gen::new(GenId::new(0), "gen_west", BusId::new(0))
                    .with_p_limits(0.0, 100.0)
                    .with_marginal_cost(10.0),
            )
            .unwrap();
        network
            .add_load(Load::new(LoadId::new(0), "load_east", BusId::new(1), load_mw))
            .unwrap();
        network
            .add_branch(
                Branch::new(BranchId::new(0), "west_east", BusId::new(0), BusId::new(1), 0.1)
                    .with_s_max(Some(80.0)),
            )
            .unwrap();
        network
    }

    #[test]
    fn program_shape() {
        let problem = build(&two_bus(50.0), None).unwrap();
        // 2 angles + 1 gen + 1 branch
        assert_eq!(problem.program.num_variables(), 4);
        // 1 KVL + 2 balance rows
        assert_eq!(problem.program.num_equalities(), 3);
        // reference angle is fixed
        assert!(problem.program.variables[0].is_fixed());
        assert!(!problem.program.variables[1].is_fixed());
    }

    #[test]
    fn shedding_adds_a_column_per_loaded_bus() {
        let problem = build(&two_bus(50.0), Some(10_000.0)).unwrap();
        assert_eq!(problem.program.num_variables(), 5);
        let shed = problem.program.variables.last().unwrap();
        assert_eq!(shed.name, "shed_east");
        assert_eq!(shed.upper, 50.0);
        assert_eq!(shed.cost, 10_000.0);
    }

    #[test]
    fn hand_solution_extracts_and_flags_binding_line() {
        let problem = build(&two_bus(80.0), None).unwrap();
        // theta_west, theta_east, gen_west, west_east
        let lp = LpSolution::from_raw(&problem.program, &[0.0, -8.0, 80.0, 80.0]);
        assert_eq!(problem.program.max_residual(&lp.values), 0.0);

        let solution = problem.extract(&lp, "hand", 1e-6);
        assert_eq!(solution.generator_p["gen_west"], 80.0);
        assert_eq!(solution.branch_p_flow["west_east"], 80.0);
        assert_eq!(solution.objective_value, 800.0);
        assert!(solution.is_binding("west_east"));
        assert!(!solution.is_binding("gen_west"));
    }

    #[test]
    fn stranded_demand_is_infeasible() {
        let mut network = two_bus(10.0);
        network.remove_branch("west_east").unwrap();
        let err = build(&network, None).err().unwrap();
        assert!(matches!(err, OpfError::Infeasible(_)));
    }
}
