//! Solver-neutral linear program.
//!
//! Formulations write into a [`LinearProgram`]; an
//! [`LpBackend`](super::LpBackend) turns it into whatever its solver needs.
//! All rows are equalities; inequalities are expressed through variable
//! bounds, which is all a DC-OPF needs.

/// Values smaller than this are reported as exactly zero.
pub const SNAP_EPSILON: f64 = 1e-7;

#[derive(Debug, Clone, PartialEq)]
pub struct LpVariable {
    pub name: String,
    /// `f64::NEG_INFINITY` for a free lower end
    pub lower: f64,
    /// `f64::INFINITY` for a free upper end
    pub upper: f64,
    /// Objective coefficient
    pub cost: f64,
}

impl LpVariable {
    pub fn is_fixed(&self) -> bool {
        self.lower.is_finite() && self.lower == self.upper
    }
}

/// `Σ coeff · x[index] = rhs`
#[derive(Debug, Clone, PartialEq)]
pub struct LpEquality {
    pub name: String,
    pub terms: Vec<(usize, f64)>,
    pub rhs: f64,
}

/// Minimise `Σ cost · x` subject to equalities and bounds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearProgram {
    pub variables: Vec<LpVariable>,
    pub equalities: Vec<LpEquality>,
}

impl LinearProgram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable and return its column index.
    pub fn add_variable(&mut self, name: impl Into<String>, lower: f64, upper: f64, cost: f64) -> usize {
        self.variables.push(LpVariable {
            name: name.into(),
            lower,
            upper,
            cost,
        });
        self.variables.len() - 1
    }

    pub fn add_free_variable(&mut self, name: impl Into<String>) -> usize {
        self.add_variable(name, f64::NEG_INFINITY, f64::INFINITY, 0.0)
    }

    pub fn add_equality(&mut self, name: impl Into<String>, terms: Vec<(usize, f64)>, rhs: f64) {
        self.equalities.push(LpEquality {
            name: name.into(),
            terms,
            rhs,
        });
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_equalities(&self) -> usize {
        self.equalities.len()
    }

    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.variables
            .iter()
            .zip(values)
            .map(|(v, x)| v.cost * x)
            .sum()
    }

    /// Largest absolute residual over all equalities.
    pub fn max_residual(&self, values: &[f64]) -> f64 {
        self.equalities
            .iter()
            .map(|row| {
                let lhs: f64 = row.terms.iter().map(|&(i, c)| c * values[i]).sum();
                (lhs - row.rhs).abs()
            })
            .fold(0.0, f64::max)
    }

    /// Clamp solver output into the variable bounds and snap near-zero values.
    ///
    /// Interior-point solvers stop a hair inside or outside the bounds; the
    /// reported dispatch must respect them exactly.
    pub fn clean(&self, raw: &[f64]) -> Vec<f64> {
        self.variables
            .iter()
            .zip(raw)
            .map(|(var, &x)| {
                let x = x.max(var.lower).min(var.upper);
                if x.abs() < SNAP_EPSILON {
                    0.0
                } else {
                    x
                }
            })
            .collect()
    }
}

/// Primal values in column order plus the objective they give.
#[derive(Debug, Clone, PartialEq)]
pub struct LpSolution {
    pub values: Vec<f64>,
    pub objective: f64,
}

impl LpSolution {
    /// Clean `raw` against `program` and evaluate the objective on the result.
    pub fn from_raw(program: &LinearProgram, raw: &[f64]) -> Self {
        let values = program.clean(raw);
        let objective = program.objective_value(&values);
        Self { values, objective }
    }

    pub fn value(&self, index: usize) -> f64 {
        self.values.get(index).copied().unwrap_or(0.0)
    }
}
