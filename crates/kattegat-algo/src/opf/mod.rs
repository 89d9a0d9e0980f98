//! Optimal Power Flow solvers
//!
//! This module provides dispatch solvers with two solution methods:
//! - DC-OPF (linear program with Kirchhoff-consistent line flows)
//! - Economic dispatch (merit-order, no network)
//!
//! The LP itself is handed to an [`LpBackend`]; the solver owns preflight
//! checks, the timeout and post-processing.

mod backends;
mod dc_opf;
pub mod economic;
mod lmp;
mod lp;
mod types;

#[cfg(feature = "solver-highs")]
pub use backends::HighsBackend;
pub use backends::{ClarabelBackend, LpBackend, LpSolverKind};
pub use lmp::STEP_MW;
pub use lp::{LinearProgram, LpEquality, LpSolution, LpVariable, SNAP_EPSILON};
pub use types::{ConstraintInfo, ConstraintType, OpfMethod, OpfSolution};

use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use kattegat_core::{bus_islands, Diagnostics, Network};
use tracing::{debug, info, warn};

use crate::OpfError;

/// Upper bound on a single LP solve
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Cost per MWh of unserved demand when shedding is enabled
pub const DEFAULT_VALUE_OF_LOST_LOAD: f64 = 10_000.0;

/// Unified OPF solver
#[derive(Clone)]
pub struct OpfSolver {
    method: OpfMethod,
    backend: Arc<dyn LpBackend>,
    timeout: Duration,
    value_of_lost_load: Option<f64>,
    marginal_prices: bool,
    tolerance: f64,
}

impl OpfSolver {
    /// Create new OPF solver with default settings (DC-OPF on Clarabel)
    pub fn new() -> Self {
        Self {
            method: OpfMethod::default(),
            backend: LpSolverKind::default().backend(),
            timeout: DEFAULT_TIMEOUT,
            value_of_lost_load: None,
            marginal_prices: false,
            tolerance: 1e-6,
        }
    }

    /// Set solution method
    pub fn with_method(mut self, method: OpfMethod) -> Self {
        self.method = method;
        self
    }

    /// Use one of the built-in LP backends
    pub fn with_lp_solver(mut self, kind: LpSolverKind) -> Self {
        self.backend = kind.backend();
        self
    }

    /// Use a custom LP backend
    pub fn with_backend(mut self, backend: Arc<dyn LpBackend>) -> Self {
        self.backend = backend;
        self
    }

    /// Abandon a solve that takes longer than `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Allow demand to go unserved at `value_of_lost_load` per MWh
    pub fn with_load_shedding(mut self, value_of_lost_load: f64) -> Self {
        self.value_of_lost_load = Some(value_of_lost_load);
        self
    }

    pub fn with_marginal_prices(mut self, enabled: bool) -> Self {
        self.marginal_prices = enabled;
        self
    }

    /// Tolerance used to report binding constraints
    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    /// Get the configured method
    pub fn method(&self) -> OpfMethod {
        self.method
    }

    pub fn backend_id(&self) -> &str {
        self.backend.id()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn value_of_lost_load(&self) -> Option<f64> {
        self.value_of_lost_load
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Solve OPF for the given network
    ///
    /// Input problems are reported as [`OpfError::InvalidInput`] and a
    /// demand that cannot be covered as [`OpfError::Infeasible`], both
    /// without calling the backend.
    pub fn solve(&self, network: &Network) -> Result<OpfSolution, OpfError> {
        let start = Instant::now();
        self.preflight(network)?;

        let mut solution = self.solve_once(network)?;
        if self.marginal_prices {
            solution.bus_lmp =
                lmp::marginal_prices(network, solution.objective_value, |stepped| self.solve_once(stepped));
        }
        solution.solve_time_ms = start.elapsed().as_millis();

        info!(
            method = %self.method,
            backend = %solution.backend,
            objective = solution.objective_value,
            elapsed_ms = solution.solve_time_ms as u64,
            "dispatch solved"
        );
        Ok(solution)
    }

    fn solve_once(&self, network: &Network) -> Result<OpfSolution, OpfError> {
        match self.method {
            OpfMethod::EconomicDispatch => economic::solve(network, self.value_of_lost_load),
            OpfMethod::DcOpf => {
                let problem = dc_opf::build(network, self.value_of_lost_load)?;
                let lp = self.run_backend(problem.program.clone())?;
                debug!(
                    residual = problem.program.max_residual(&lp.values),
                    "LP solution residual"
                );
                Ok(problem.extract(&lp, self.backend.id(), self.tolerance))
            }
        }
    }

    /// Run the backend on a worker thread and wait at most `self.timeout`.
    ///
    /// A timed-out solve is abandoned, not cancelled: the worker finishes in
    /// the background and its answer is dropped.
    fn run_backend(&self, program: LinearProgram) -> Result<LpSolution, OpfError> {
        let backend = Arc::clone(&self.backend);
        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name(format!("lp-{}", backend.id()))
            .spawn(move || {
                // The receiver is gone after a timeout; nothing to report then.
                let _ = tx.send(backend.solve(&program));
            })
            .map_err(|e| OpfError::SolverFailure(format!("could not start solver thread: {}", e)))?;

        match rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                warn!(timeout = ?self.timeout, backend = self.backend.id(), "LP solve timed out");
                Err(OpfError::Timeout(self.timeout))
            }
            Err(RecvTimeoutError::Disconnected) => Err(OpfError::SolverFailure(format!(
                "{} backend stopped without an answer",
                self.backend.id()
            ))),
        }
    }

    fn preflight(&self, network: &Network) -> Result<(), OpfError> {
        let mut diag = Diagnostics::new();
        network.validate_into(&mut diag);
        if let Some(issue) = diag.errors().next() {
            return Err(OpfError::InvalidInput(match &issue.entity {
                Some(entity) => format!("{}: {}", entity, issue.message),
                None => issue.message.clone(),
            }));
        }

        match self.value_of_lost_load {
            Some(voll) if !(voll.is_finite() && voll >= 0.0) => Err(OpfError::InvalidInput(format!(
                "value of lost load must be non-negative, got {}",
                voll
            ))),
            Some(_) => Ok(()),
            None => self.check_adequacy(network),
        }
    }

    /// Demand above available capacity can never be served; catch it before
    /// the solver does so the message says why.
    fn check_adequacy(&self, network: &Network) -> Result<(), OpfError> {
        let shortfall = |demand: f64, capacity: f64, scope: &str| {
            OpfError::Infeasible(format!(
                "demand {:.1} MW exceeds available capacity {:.1} MW{}",
                demand, capacity, scope
            ))
        };

        let demand = network.total_load().value();
        let capacity = network.total_capacity().value();
        if demand > capacity + SNAP_EPSILON {
            return Err(shortfall(demand, capacity, ""));
        }
        if self.method == OpfMethod::EconomicDispatch {
            return Ok(());
        }

        for island in bus_islands(network) {
            let demand: f64 = island.iter().map(|&b| network.demand_at_bus(b).value()).sum();
            let capacity: f64 = island
                .iter()
                .flat_map(|&b| network.generators_at_bus(b))
                .filter(|g| g.status)
                .map(|g| g.pmax.value())
                .sum();
            if demand > capacity + SNAP_EPSILON {
                let name = island
                    .first()
                    .and_then(|&b| network.bus(b))
                    .map(|b| b.name.as_str())
                    .unwrap_or("?");
                return Err(shortfall(demand, capacity, &format!(" in the island of '{}'", name)));
            }
        }
        Ok(())
    }
}

impl Default for OpfSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for OpfSolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpfSolver")
            .field("method", &self.method)
            .field("backend", &self.backend.id())
            .field("timeout", &self.timeout)
            .field("value_of_lost_load", &self.value_of_lost_load)
            .field("marginal_prices", &self.marginal_prices)
            .field("tolerance", &self.tolerance)
            .finish()
    }
}
