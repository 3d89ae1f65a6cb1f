use recourse_solver::{ConstraintOp, LpProblem, Solution, SolutionStatus, Solver};
use tracing::{debug, trace, warn};

use crate::error::{BuildError, Error, SolveError};
use crate::model::{Model, ProblemClass, Relation, Sense, VarRef};

/// A returned point may break a lowered row by at most this much
pub const FEASIBILITY_TOLERANCE: f64 = 1e-6;

/// Anything that can solve a lowered linear program
pub trait SolverBackend {
    fn name(&self) -> &str;

    fn solve_lp(&self, problem: &LpProblem) -> Solution;
}

/// Backend running the in-process two-phase simplex
#[derive(Debug, Clone, Default)]
pub struct SimplexBackend {
    solver: Solver,
}

impl SimplexBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_solver(solver: Solver) -> Self {
        Self { solver }
    }
}

impl SolverBackend for SimplexBackend {
    fn name(&self) -> &str {
        "simplex"
    }

    fn solve_lp(&self, problem: &LpProblem) -> Solution {
        self.solver.solve(problem)
    }
}

/// Optimal column values for a model, in its flat column layout
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SolvedModel {
    pub backend: String,
    pub values: Vec<f64>,
    pub objective_value: f64,
    pub iterations: usize,
}

impl SolvedModel {
    pub fn value(&self, model: &Model, var: &VarRef) -> Result<f64, BuildError> {
        self.check_layout(model)?;
        Ok(self.values[model.column_of(var)?])
    }

    /// All values of one variable, in row-major domain order
    pub fn variable_values(&self, model: &Model, variable: usize) -> Result<&[f64], BuildError> {
        self.check_layout(model)?;
        let Some(declared) = model.variables.get(variable) else {
            return Err(BuildError::dimension(
                "variable",
                format!("an id below {}", model.variables.len()),
                variable,
            ));
        };
        let start = model.variable_offset(variable);
        let len = model.domain_size(&declared.domain);
        Ok(&self.values[start..start + len])
    }

    fn check_layout(&self, model: &Model) -> Result<(), BuildError> {
        let columns = model.column_count();
        if self.values.len() != columns {
            return Err(BuildError::dimension("values", columns, self.values.len()));
        }
        Ok(())
    }
}

/// Lowers every equation row to `coefficients . columns (op) rhs`,
/// moving variable terms left and constants right.
///
/// Every column is nonnegative, so a row that only restates a column's own
/// bound (`a * v >= r` with `a > 0`, `r <= 0`) stays in the model but is
/// not handed to the solver.
pub fn lower(model: &Model) -> Result<LpProblem, BuildError> {
    let columns = model.column_count();
    let mut problem = LpProblem::new(model.column_labels());

    let objective = model.objective.expr.linearize(model)?;
    problem.set_objective(objective.dense(columns), model.objective.sense == Sense::Minimize);

    let mut implied = 0;
    for equation in &model.equations {
        for row in &equation.rows {
            let lhs = row.lhs.linearize(model)?;
            let rhs = row.rhs.linearize(model)?;

            let mut coefficients = lhs.dense(columns);
            for (&column, &coef) in &rhs.terms {
                coefficients[column] -= coef;
            }
            let bound = rhs.constant - lhs.constant;
            let name = format!("{}[{}]", equation.name, model.tuple_label(&equation.domain, &row.index));
            if implied_by_bounds(&coefficients, row.relation, bound) {
                trace!(row = %name, relation = %row.relation, bound, "row implied by column bounds");
                implied += 1;
                continue;
            }
            problem.add_constraint(name, coefficients, constraint_op(row.relation), bound);
        }
    }
    debug!(rows = problem.num_constraints(), implied, "model lowered");

    Ok(problem)
}

/// True when a single-column row holds for every nonnegative value
fn implied_by_bounds(coefficients: &[f64], relation: Relation, bound: f64) -> bool {
    let mut nonzero = coefficients.iter().filter(|&&c| c != 0.0);
    let (Some(&coef), None) = (nonzero.next(), nonzero.next()) else {
        return false;
    };
    match relation {
        Relation::Ge => coef > 0.0 && bound <= 0.0,
        Relation::Le => coef < 0.0 && bound >= 0.0,
        Relation::Eq => false,
    }
}

/// Lowers `model`, hands it to `backend` and checks what comes back.
pub fn solve<B: SolverBackend + ?Sized>(model: &Model, backend: &B) -> Result<SolvedModel, Error> {
    if model.class == ProblemClass::Mip {
        warn!(model = %model.name, "model declared as MIP has no integer variables; solving it as an LP");
    }

    let problem = lower(model)?;
    let objective_constant = model.objective.expr.linearize(model)?.constant;
    debug!(
        backend = backend.name(),
        columns = problem.num_variables(),
        rows = problem.num_constraints(),
        "handing model to solver"
    );

    let solution = backend.solve_lp(&problem);
    let unavailable = |reason: String| SolveError::SolverUnavailable {
        backend: backend.name().to_string(),
        reason,
    };

    match solution.status {
        SolutionStatus::Optimal => {}
        SolutionStatus::Infeasible => return Err(SolveError::Infeasible.into()),
        SolutionStatus::Unbounded => return Err(SolveError::Unbounded.into()),
        SolutionStatus::IterationLimit => {
            return Err(unavailable(format!("iteration limit reached after {} pivots", solution.iterations)).into());
        }
    }

    if solution.values.len() != problem.num_variables() {
        return Err(unavailable(format!(
            "returned {} values for {} columns",
            solution.values.len(),
            problem.num_variables()
        ))
        .into());
    }
    let violation = problem.max_violation(&solution.values);
    if violation > FEASIBILITY_TOLERANCE {
        return Err(unavailable(format!("returned a point violating the model by {violation:e}")).into());
    }

    debug!(iterations = solution.iterations, objective = solution.objective_value, "solver finished");

    Ok(SolvedModel {
        backend: backend.name().to_string(),
        objective_value: solution.objective_value + objective_constant,
        values: solution.values,
        iterations: solution.iterations,
    })
}

fn constraint_op(relation: Relation) -> ConstraintOp {
    match relation {
        Relation::Eq => ConstraintOp::Eq,
        Relation::Le => ConstraintOp::Le,
        Relation::Ge => ConstraintOp::Ge,
    }
}
