//! N-1 line outage screening.
//!
//! Each in-service branch is taken out in turn and the dispatch is re-solved
//! with load shedding enabled, so an outage that strands demand shows up as
//! shed MW at the value of lost load rather than as a failed solve.
//!
//! Outages are independent and solved in parallel on rayon's pool, each on
//! its own copy of the network. Results come back in branch order.

use kattegat_core::Network;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

use crate::opf::{OpfSolution, OpfSolver, DEFAULT_VALUE_OF_LOST_LOAD};

/// Outcome of one branch outage.
#[derive(Debug, Clone, Serialize)]
pub struct OutageResult {
    /// Branch taken out of service
    pub branch: String,
    /// Number of islands left after the outage
    pub islands: usize,
    pub objective: Option<f64>,
    pub load_shed_mw: Option<f64>,
    pub most_loaded_branch: Option<String>,
    /// |flow| / rating of the most loaded remaining branch
    pub max_loading: Option<f64>,
    /// Error category and message when the solve failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OutageResult {
    pub fn is_secure(&self) -> bool {
        self.error.is_none() && self.load_shed_mw.map_or(false, |mw| mw <= 1e-6)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ContingencyReport {
    pub value_of_lost_load: f64,
    /// Objective of the intact network (with shedding allowed)
    pub base_objective: Option<f64>,
    pub outages: Vec<OutageResult>,
}

impl ContingencyReport {
    pub fn num_insecure(&self) -> usize {
        self.outages.iter().filter(|o| !o.is_secure()).count()
    }
}

/// Screen every single-branch outage of `network`.
///
/// `solver` keeps its method, backend and timeout; shedding is switched on at
/// its configured value of lost load, or [`DEFAULT_VALUE_OF_LOST_LOAD`].
pub fn screen_n1(network: &Network, solver: &OpfSolver) -> ContingencyReport {
    let voll = solver.value_of_lost_load().unwrap_or(DEFAULT_VALUE_OF_LOST_LOAD);
    let solver = solver.clone().with_marginal_prices(false).with_load_shedding(voll);

    let base_objective = match solver.solve(network) {
        Ok(solution) => Some(solution.objective_value),
        Err(err) => {
            warn!(error = %err, "intact network failed to solve");
            None
        }
    };

    let names: Vec<String> = network
        .branches()
        .into_iter()
        .filter(|b| b.status)
        .map(|b| b.name.clone())
        .collect();
    debug!(outages = names.len(), "screening N-1 outages");

    let outages = names
        .par_iter()
        .map(|name| evaluate_outage(network, &solver, name))
        .collect();

    ContingencyReport {
        value_of_lost_load: voll,
        base_objective,
        outages,
    }
}

fn evaluate_outage(network: &Network, solver: &OpfSolver, branch: &str) -> OutageResult {
    let mut result = OutageResult {
        branch: branch.to_string(),
        islands: 0,
        objective: None,
        load_shed_mw: None,
        most_loaded_branch: None,
        max_loading: None,
        error: None,
    };

    let mut outaged = network.clone();
    if let Err(err) = outaged.remove_branch(branch) {
        result.error = Some(err.to_string());
        return result;
    }
    result.islands = kattegat_core::bus_islands(&outaged).len();

    match solver.solve(&outaged) {
        Ok(solution) => {
            result.objective = Some(solution.objective_value);
            result.load_shed_mw = Some(solution.total_load_shed());
            if let Some((name, loading)) = most_loaded(&outaged, &solution) {
                result.most_loaded_branch = Some(name);
                result.max_loading = Some(loading);
            }
        }
        Err(err) => {
            warn!(branch, category = err.category(), error = %err, "outage solve failed");
            result.error = Some(err.to_string());
        }
    }
    result
}

/// Branch with the highest |flow| / rating among rated branches.
pub fn most_loaded(network: &Network, solution: &OpfSolution) -> Option<(String, f64)> {
    network
        .branches()
        .into_iter()
        .filter_map(|b| {
            let limit = b.s_max?.value();
            let flow = solution.branch_p_flow.get(&b.name)?;
            (limit > 0.0).then(|| (b.name.clone(), flow.abs() / limit))
        })
        .max_by(|a, b| a.1.total_cmp(&b.1))
}
