//! Clarabel interior-point backend (pure Rust, always available).

use good_lp::solvers::clarabel::clarabel;

use super::{solve_with_good_lp, LpBackend};
use crate::opf::lp::{LinearProgram, LpSolution};
use crate::OpfError;

pub struct ClarabelBackend;

impl LpBackend for ClarabelBackend {
    fn id(&self) -> &str {
        "clarabel"
    }

    fn solve(&self, program: &LinearProgram) -> Result<LpSolution, OpfError> {
        solve_with_good_lp(program, clarabel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clarabel_backend_id() {
        assert_eq!(ClarabelBackend.id(), "clarabel");
    }

    #[test]
    fn test_clarabel_solves_two_generator_balance() {
        let mut lp = LinearProgram::new();
        let cheap = lp.add_variable("cheap", 0.0, 60.0, 10.0);
        let dear = lp.add_variable("dear", 0.0, 100.0, 30.0);
        lp.add_equality("balance", vec![(cheap, 1.0), (dear, 1.0)], 80.0);

        let solution = ClarabelBackend.solve(&lp).unwrap();
        assert!((solution.value(cheap) - 60.0).abs() < 1e-4);
        assert!((solution.value(dear) - 20.0).abs() < 1e-4);
        assert!((solution.objective - 1200.0).abs() < 1e-2);
    }

    #[test]
    fn test_clarabel_reports_infeasible() {
        let mut lp = LinearProgram::new();
        let p = lp.add_variable("p", 0.0, 10.0, 1.0);
        lp.add_equality("balance", vec![(p, 1.0)], 50.0);

        let err = ClarabelBackend.solve(&lp).unwrap_err();
        assert!(matches!(err, OpfError::Infeasible(_)), "{err:?}");
    }

    #[test]
    fn test_fixed_variable_is_respected() {
        let mut lp = LinearProgram::new();
        let fixed = lp.add_variable("fixed", 0.0, 0.0, 1.0);
        let free = lp.add_variable("free", 0.0, 10.0, 5.0);
        lp.add_equality("balance", vec![(fixed, 1.0), (free, 1.0)], 4.0);

        let solution = ClarabelBackend.solve(&lp).unwrap();
        assert_eq!(solution.value(fixed), 0.0);
        assert!((solution.value(free) - 4.0).abs() < 1e-4);
    }
}
