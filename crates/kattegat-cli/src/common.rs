//! Types and helpers shared across commands.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use kattegat_algo::{LpSolverKind, OpfError, OpfMethod, OpfSolver};
use kattegat_scenarios::{ModelParams, ParamField};
use serde::Serialize;

use crate::cli::{ModelArgs, SolverArgs};
use crate::config::SolverConfig;

/// Output format for results.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable tables
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
}

/// Overlay command-line values on `base`. Each value goes through
/// [`ModelParams::set`], so a negative flag is reported as invalid input.
pub fn model_params(base: ModelParams, args: &ModelArgs) -> Result<ModelParams, OpfError> {
    let mut params = base;
    for (field, value) in ParamField::ALL.iter().zip(args.values()) {
        if let Some(value) = value {
            params.set(*field, value)?;
        }
    }
    Ok(params)
}

/// Build a solver from the config file, with flags taking precedence.
pub fn build_solver(config: &SolverConfig, args: &SolverArgs) -> Result<OpfSolver> {
    let method: OpfMethod = args
        .method
        .as_deref()
        .unwrap_or(config.method.as_str())
        .parse()
        .map_err(anyhow::Error::msg)?;
    let lp_solver: LpSolverKind = args
        .lp_solver
        .as_deref()
        .unwrap_or(config.lp_solver.as_str())
        .parse()
        .context("selecting LP solver")?;
    let timeout_seconds = args.timeout.unwrap_or(config.timeout_seconds);
    if timeout_seconds == 0 {
        bail!("solver timeout must be at least 1 second");
    }
    let timeout = Duration::from_secs(timeout_seconds);

    let mut solver = OpfSolver::new()
        .with_method(method)
        .with_lp_solver(lp_solver)
        .with_timeout(timeout)
        .with_marginal_prices(args.prices || config.marginal_prices);
    if let Some(voll) = args.voll.or(config.value_of_lost_load) {
        solver = solver.with_load_shedding(voll);
    }
    Ok(solver)
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("serializing output to JSON")?;
    println!("{text}");
    Ok(())
}
