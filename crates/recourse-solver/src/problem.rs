/// A linear program over nonnegative continuous columns
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct LpProblem {
    /// Column names, in column order
    pub variables: Vec<String>,
    /// Objective function coefficients
    pub objective: Objective,
    /// Constraint rows
    pub constraints: Vec<Constraint>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct Objective {
    /// Coefficient for each column
    pub coefficients: Vec<f64>,
    /// Whether to minimize or maximize
    pub minimize: bool,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct Constraint {
    /// Row label, e.g. `need_constraint[Site 1,Scenario 2]`
    pub name: String,
    /// Coefficient for each column
    pub coefficients: Vec<f64>,
    pub op: ConstraintOp,
    /// Right-hand side value
    pub rhs: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintOp {
    /// Less than or equal (<=)
    Le,
    /// Greater than or equal (>=)
    Ge,
    /// Equal (=)
    Eq,
}

impl ConstraintOp {
    /// The relation obtained by multiplying both sides by -1
    pub fn flipped(self) -> Self {
        match self {
            ConstraintOp::Le => ConstraintOp::Ge,
            ConstraintOp::Ge => ConstraintOp::Le,
            ConstraintOp::Eq => ConstraintOp::Eq,
        }
    }
}

impl LpProblem {
    pub fn new(variables: Vec<String>) -> Self {
        let n = variables.len();
        Self {
            variables,
            objective: Objective {
                coefficients: vec![0.0; n],
                minimize: true,
            },
            constraints: Vec::new(),
        }
    }

    pub fn set_objective(&mut self, coefficients: Vec<f64>, minimize: bool) {
        self.objective = Objective { coefficients, minimize };
    }

    pub fn add_constraint(&mut self, name: impl Into<String>, coefficients: Vec<f64>, op: ConstraintOp, rhs: f64) {
        self.constraints.push(Constraint {
            name: name.into(),
            coefficients,
            op,
            rhs,
        });
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Objective value at `values`
    pub fn objective_at(&self, values: &[f64]) -> f64 {
        dot(&self.objective.coefficients, values)
    }

    /// Left-hand side of `constraint` evaluated at `values`
    pub fn lhs(&self, constraint: &Constraint, values: &[f64]) -> f64 {
        dot(&constraint.coefficients, values)
    }

    /// Largest amount by which `values` breaks a row or a nonnegativity bound.
    /// Zero for a feasible point.
    pub fn max_violation(&self, values: &[f64]) -> f64 {
        let bounds = values.iter().map(|&v| (-v).max(0.0));
        let rows = self.constraints.iter().map(|c| {
            let lhs = self.lhs(c, values);
            match c.op {
                ConstraintOp::Le => (lhs - c.rhs).max(0.0),
                ConstraintOp::Ge => (c.rhs - lhs).max(0.0),
                ConstraintOp::Eq => (lhs - c.rhs).abs(),
            }
        });
        bounds.chain(rows).fold(0.0, f64::max)
    }
}

fn dot(coefficients: &[f64], values: &[f64]) -> f64 {
    coefficients.iter().zip(values).map(|(c, v)| c * v).sum()
}
