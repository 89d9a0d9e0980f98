//! HiGHS simplex/IPM backend (native library, feature `solver-highs`).

use good_lp::solvers::highs::highs;

use super::{solve_with_good_lp, LpBackend};
use crate::opf::lp::{LinearProgram, LpSolution};
use crate::OpfError;

pub struct HighsBackend;

impl LpBackend for HighsBackend {
    fn id(&self) -> &str {
        "highs"
    }

    fn solve(&self, program: &LinearProgram) -> Result<LpSolution, OpfError> {
        solve_with_good_lp(program, highs)
    }
}
