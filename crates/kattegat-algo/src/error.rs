use std::time::Duration;

use kattegat_core::GridError;
use thiserror::Error;

/// Failure of a dispatch solve. Every solve yields either a full solution or
/// exactly one of these.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OpfError {
    /// Negative, non-finite or structurally broken input. Raised before the
    /// solver is invoked.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No dispatch satisfies demand, capacity and line limits
    #[error("infeasible: {0}")]
    Infeasible(String),

    /// The LP backend failed for a reason other than infeasibility
    #[error("solver failure: {0}")]
    SolverFailure(String),

    #[error("solve timed out after {0:?}")]
    Timeout(Duration),
}

impl OpfError {
    /// Stable short tag for logs, JSON output and exit messages.
    pub fn category(&self) -> &'static str {
        match self {
            OpfError::InvalidInput(_) => "invalid-input",
            OpfError::Infeasible(_) => "infeasible",
            OpfError::SolverFailure(_) => "solver-failure",
            OpfError::Timeout(_) => "timeout",
        }
    }
}

impl From<GridError> for OpfError {
    fn from(err: GridError) -> Self {
        OpfError::InvalidInput(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_are_stable() {
        assert_eq!(OpfError::InvalidInput("x".into()).category(), "invalid-input");
        assert_eq!(OpfError::Infeasible("x".into()).category(), "infeasible");
        assert_eq!(OpfError::SolverFailure("x".into()).category(), "solver-failure");
        assert_eq!(OpfError::Timeout(Duration::from_secs(1)).category(), "timeout");
    }

    #[test]
    fn grid_errors_are_invalid_input() {
        let err: OpfError = GridError::NotFound("bus id 9 referenced by 'gas_Odense'".into()).into();
        assert_eq!(
            err,
            OpfError::InvalidInput("not found: bus id 9 referenced by 'gas_Odense'".into())
        );
        assert_eq!(err.category(), "invalid-input");
    }

    #[test]
    fn timeout_message_includes_duration() {
        let err = OpfError::Timeout(Duration::from_millis(1500));
        assert_eq!(err.to_string(), "solve timed out after 1.5s");
    }
}
