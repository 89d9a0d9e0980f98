//! LP solver backends.
//!
//! Each backend takes a [`LinearProgram`] and returns primal values through
//! the [`LpBackend`] trait. Both built-in backends go through `good_lp`.

mod clarabel;
#[cfg(feature = "solver-highs")]
mod highs;

pub use clarabel::ClarabelBackend;
#[cfg(feature = "solver-highs")]
pub use highs::HighsBackend;

use std::str::FromStr;
use std::sync::Arc;

use anyhow::anyhow;
use good_lp::{
    constraint, variable, Expression, ProblemVariables, ResolutionError, Solution, Solver,
    SolverModel, Variable,
};
use serde::{Deserialize, Serialize};

use super::lp::{LinearProgram, LpSolution};
use crate::OpfError;

/// Solves a [`LinearProgram`]. Implementations must be deterministic:
/// the same program gives the same answer.
pub trait LpBackend: Send + Sync {
    /// Unique identifier (e.g., "clarabel", "highs")
    fn id(&self) -> &str;

    fn solve(&self, program: &LinearProgram) -> Result<LpSolution, OpfError>;
}

/// Built-in backends selectable by name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LpSolverKind {
    #[default]
    Clarabel,
    #[cfg(feature = "solver-highs")]
    Highs,
}

impl LpSolverKind {
    pub fn available() -> &'static [&'static str] {
        AVAILABLE_LP_SOLVERS
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LpSolverKind::Clarabel => "clarabel",
            #[cfg(feature = "solver-highs")]
            LpSolverKind::Highs => "highs",
        }
    }

    pub fn backend(&self) -> Arc<dyn LpBackend> {
        match self {
            LpSolverKind::Clarabel => Arc::new(ClarabelBackend),
            #[cfg(feature = "solver-highs")]
            LpSolverKind::Highs => Arc::new(HighsBackend),
        }
    }
}

impl std::fmt::Display for LpSolverKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

const AVAILABLE_LP_SOLVERS: &[&str] = &[
    "clarabel",
    #[cfg(feature = "solver-highs")]
    "highs",
];

fn unknown_solver_error(label: &str) -> anyhow::Error {
    anyhow!(
        "unknown lp solver '{}'; supported values: {}",
        label,
        LpSolverKind::available().join(", ")
    )
}

impl FromStr for LpSolverKind {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.to_ascii_lowercase();
        match normalized.as_str() {
            "clarabel" => Ok(LpSolverKind::Clarabel),
            "highs" => {
                #[cfg(feature = "solver-highs")]
                {
                    Ok(LpSolverKind::Highs)
                }
                #[cfg(not(feature = "solver-highs"))]
                {
                    Err(unknown_solver_error(&normalized))
                }
            }
            other => Err(unknown_solver_error(other)),
        }
    }
}

/// Translate `program` into a `good_lp` model for `solver` and solve it.
///
/// Fixed variables become explicit equalities, since interior-point codes
/// dislike bound pairs with an empty interior.
pub(crate) fn solve_with_good_lp<S>(program: &LinearProgram, solver: S) -> Result<LpSolution, OpfError>
where
    S: Solver,
    S::Model: SolverModel<Error = ResolutionError>,
{
    let mut vars = ProblemVariables::new();
    let handles: Vec<Variable> = program
        .variables
        .iter()
        .map(|var| {
            let mut definition = variable().name(var.name.clone());
            if !var.is_fixed() {
                if var.lower.is_finite() {
                    definition = definition.min(var.lower);
                }
                if var.upper.is_finite() {
                    definition = definition.max(var.upper);
                }
            }
            vars.add(definition)
        })
        .collect();

    let objective = program
        .variables
        .iter()
        .zip(&handles)
        .fold(Expression::from(0.0), |acc, (var, &handle)| {
            acc + var.cost * handle
        });

    let mut model = vars.minimise(objective).using(solver);

    for (var, &handle) in program.variables.iter().zip(&handles) {
        if var.is_fixed() {
            let value = var.lower;
            model = model.with(constraint!(handle == value));
        }
    }
    for row in &program.equalities {
        let lhs = row
            .terms
            .iter()
            .fold(Expression::from(0.0), |acc, &(index, coeff)| {
                acc + coeff * handles[index]
            });
        let rhs = row.rhs;
        model = model.with(constraint!(lhs == rhs));
    }

    let solution = model.solve().map_err(resolution_error)?;
    let raw: Vec<f64> = handles.iter().map(|&h| solution.value(h)).collect();
    Ok(LpSolution::from_raw(program, &raw))
}

fn resolution_error(err: ResolutionError) -> OpfError {
    match err {
        ResolutionError::Infeasible => {
            OpfError::Infeasible("no dispatch satisfies demand and line limits".into())
        }
        ResolutionError::Unbounded => OpfError::SolverFailure("LP is unbounded".into()),
        other => OpfError::SolverFailure(format!("LP solver failed: {}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_solver_names() {
        assert_eq!("clarabel".parse::<LpSolverKind>().unwrap(), LpSolverKind::Clarabel);
        assert_eq!("CLARABEL".parse::<LpSolverKind>().unwrap(), LpSolverKind::Clarabel);
        let err = "gurobi".parse::<LpSolverKind>().unwrap_err();
        assert!(err.to_string().contains("supported values: clarabel"));
    }

    #[test]
    fn test_backend_ids_match_kind() {
        for name in LpSolverKind::available() {
            let kind: LpSolverKind = name.parse().unwrap();
            assert_eq!(kind.backend().id(), *name);
            assert_eq!(kind.to_string(), *name);
        }
    }

    #[test]
    fn test_backend_is_object_safe_and_shareable() {
        fn _assert_send_sync<T: Send + Sync + ?Sized>() {}
        _assert_send_sync::<dyn LpBackend>();
    }
}
