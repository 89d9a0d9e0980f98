//! # kattegat-algo: dispatch optimisation for small networks
//!
//! ## Optimal Power Flow (OPF)
//!
//! The [`OpfSolver`] provides a unified interface to the solution methods:
//!
//! | Method | Description | Problem Class |
//! |--------|-------------|---------------|
//! | [`OpfMethod::DcOpf`] | Linear DC approximation with KVL line flows | Linear |
//! | [`OpfMethod::EconomicDispatch`] | Merit-order dispatch without network | Sorting |
//!
//! ### Architecture
//!
//! - **[`opf::LinearProgram`]**: solver-neutral LP written by the DC formulation
//! - **[`opf::LpBackend`]**: turns an LP into primal values (Clarabel, HiGHS, or
//!   any user-supplied implementation)
//! - **[`OpfSolver`]**: preflight checks, worker-thread timeout, numerical
//!   cleanup and optional marginal prices
//!
//! ## Post-processing
//!
//! - [`validation::verify_dispatch`]: balance, bound and rating checks
//! - [`contingency::screen_n1`]: parallel single-line outage screening
//!
//! ## Example
//!
//! ```ignore
//! use kattegat_algo::{OpfMethod, OpfSolver};
//!
//! let solver = OpfSolver::new()
//!     .with_method(OpfMethod::DcOpf)
//!     .with_marginal_prices(true);
//!
//! let solution = solver.solve(&network)?;
//! println!("Cost: {:.2}/h", solution.objective_value);
//! ```

pub mod contingency;
mod error;
pub mod opf;
pub mod validation;

pub use contingency::{screen_n1, ContingencyReport, OutageResult};
pub use error::OpfError;
pub use opf::{
    LpBackend, LpSolverKind, OpfMethod, OpfSolution, OpfSolver, DEFAULT_TIMEOUT,
    DEFAULT_VALUE_OF_LOST_LOAD,
};
pub use validation::{verify_dispatch, DispatchReport, Violation};
