use tracing::{debug, trace};

use crate::problem::{ConstraintOp, LpProblem};
use crate::solution::{Solution, SolutionStatus};

/// Largest artificial residual still accepted as feasible at the end of phase 1
const FEASIBILITY_TOLERANCE: f64 = 1e-7;

/// Smallest column entry the ratio test will pivot on
const PIVOT_TOLERANCE: f64 = 1e-9;

/// Consecutive non-improving pivots before falling back to Bland's rule
const DEGENERATE_STREAK: usize = 1000;

/// Simplex solver for linear programming problems
#[derive(Debug, Clone)]
pub struct Solver {
    /// Maximum pivots across both phases before giving up
    max_iterations: usize,
    /// Tolerance for floating point comparisons
    tolerance: f64,
}

impl Default for Solver {
    fn default() -> Self {
        Self {
            max_iterations: 50_000,
            tolerance: 1e-9,
        }
    }
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    /// Solve the LP problem using the two-phase simplex method
    pub fn solve(&self, problem: &LpProblem) -> Solution {
        let mut tableau = Tableau::build(problem);
        let mut iterations = 0;
        debug!(
            rows = problem.num_constraints(),
            columns = problem.num_variables(),
            slack = tableau.n_slack,
            artificial = tableau.n_artificial,
            "simplex tableau built"
        );

        if tableau.n_artificial > 0 {
            match self.phase1(&mut tableau, &mut iterations) {
                SimplexResult::Optimal => {}
                SimplexResult::Unbounded => return Solution::infeasible(iterations),
                SimplexResult::IterationLimit => return Solution::iteration_limit(iterations),
                SimplexResult::Infeasible => {
                    debug!(iterations, "phase 1 left a positive artificial residual");
                    return Solution::infeasible(iterations);
                }
            }
            debug!(iterations, "phase 1 found a basic feasible solution");
        }

        match self.phase2(&mut tableau, &mut iterations) {
            SimplexResult::Optimal => {}
            SimplexResult::Unbounded => return Solution::unbounded(iterations),
            SimplexResult::IterationLimit => return Solution::iteration_limit(iterations),
            SimplexResult::Infeasible => return Solution::infeasible(iterations),
        }
        debug!(iterations, "phase 2 reached optimality");

        self.extract_solution(&tableau, problem, iterations)
    }

    fn phase1(&self, tableau: &mut Tableau, iterations: &mut usize) -> SimplexResult {
        // Auxiliary objective: maximize -sum(artificials)
        let obj_row = tableau.obj_row();
        let n_cols = tableau.n_cols();
        let art_start = tableau.artificial_start();

        let orig_obj = std::mem::replace(&mut tableau.data[obj_row], vec![0.0; n_cols]);
        for j in art_start..(art_start + tableau.n_artificial) {
            tableau.data[obj_row][j] = -1.0;
        }

        // Price out the artificials that start in the basis
        for i in 0..obj_row {
            if tableau.basic_vars[i] >= art_start {
                for j in 0..n_cols {
                    tableau.data[obj_row][j] += tableau.data[i][j];
                }
            }
        }

        // Artificials only ever leave; once their sum is zero phase 1 is done
        match self.iterate(tableau, art_start, true, iterations) {
            SimplexResult::Optimal => {}
            other => return other,
        }

        // The objective cell holds the remaining sum of artificials
        let residual = tableau.data[obj_row][n_cols - 1];
        if residual > self.feasibility_tolerance() {
            return SimplexResult::Infeasible;
        }

        self.drive_out_artificials(tableau);

        // Restore the original objective in terms of the current basis
        tableau.data[obj_row] = orig_obj;
        for i in 0..obj_row {
            let ratio = tableau.data[obj_row][tableau.basic_vars[i]];
            if ratio != 0.0 {
                for j in 0..n_cols {
                    tableau.data[obj_row][j] -= ratio * tableau.data[i][j];
                }
            }
        }

        SimplexResult::Optimal
    }

    /// Pivots zero-level artificials out of the basis on the largest
    /// available element. A row with no usable column is linearly dependent
    /// on the others and keeps its artificial.
    fn drive_out_artificials(&self, tableau: &mut Tableau) {
        let art_start = tableau.artificial_start();
        for i in 0..tableau.obj_row() {
            if tableau.basic_vars[i] < art_start {
                continue;
            }
            let mut column: Option<(usize, f64)> = None;
            for j in 0..art_start {
                let magnitude = tableau.data[i][j].abs();
                if magnitude > PIVOT_TOLERANCE && column.is_none_or(|(_, best)| magnitude > best) {
                    column = Some((j, magnitude));
                }
            }
            match column {
                Some((j, _)) => self.pivot(tableau, i, j),
                None => trace!(row = i, "redundant row keeps its artificial"),
            }
        }
    }

    fn phase2(&self, tableau: &mut Tableau, iterations: &mut usize) -> SimplexResult {
        // Artificial columns never re-enter
        let limit = tableau.artificial_start();
        self.iterate(tableau, limit, false, iterations)
    }

    /// Pivots until no column below `column_limit` improves the objective.
    ///
    /// Columns are priced by steepest edge. After a run of
    /// `DEGENERATE_STREAK` pivots that do not move the objective, Bland's
    /// rule takes over until a pivot makes progress again, which rules out
    /// cycling.
    fn iterate(
        &self,
        tableau: &mut Tableau,
        column_limit: usize,
        stop_at_zero: bool,
        iterations: &mut usize,
    ) -> SimplexResult {
        let obj_row = tableau.obj_row();
        let rhs_col = tableau.n_cols() - 1;
        let mut degenerate = 0;

        loop {
            if stop_at_zero && tableau.data[obj_row][rhs_col] <= self.feasibility_tolerance() {
                return SimplexResult::Optimal;
            }

            let bland = degenerate >= DEGENERATE_STREAK;
            let Some(pivot_col) = self.find_pivot_column(tableau, column_limit, bland) else {
                return SimplexResult::Optimal;
            };
            let Some((pivot_row, step)) = self.find_pivot_row(tableau, pivot_col, bland) else {
                return SimplexResult::Unbounded;
            };
            if *iterations >= self.max_iterations {
                return SimplexResult::IterationLimit;
            }

            self.pivot(tableau, pivot_row, pivot_col);
            *iterations += 1;

            if step <= self.tolerance {
                degenerate += 1;
                if degenerate == DEGENERATE_STREAK {
                    trace!(iterations = *iterations, "degenerate streak, switching to Bland's rule");
                }
            } else {
                degenerate = 0;
            }
        }
    }

    /// Improving column with the largest `d_j^2 / (1 + |a_j|^2)`, i.e. the
    /// steepest edge, or the lowest-index improving column under Bland's rule
    fn find_pivot_column(&self, tableau: &Tableau, column_limit: usize, bland: bool) -> Option<usize> {
        let obj_row = tableau.obj_row();
        let obj = &tableau.data[obj_row];
        if bland {
            return (0..column_limit).find(|&j| obj[j] > self.tolerance);
        }

        let mut max_score = 0.0;
        let mut max_col = None;
        for (j, &value) in obj.iter().enumerate().take(column_limit) {
            if value <= self.tolerance {
                continue;
            }
            let norm: f64 = tableau.data[..obj_row].iter().map(|row| row[j] * row[j]).sum();
            let score = value * value / (1.0 + norm);
            if score > max_score {
                max_score = score;
                max_col = Some(j);
            }
        }
        max_col
    }

    /// Minimum-ratio row and its ratio. Ties go to the lowest basic column
    /// under Bland's rule, otherwise to the largest pivot element.
    fn find_pivot_row(&self, tableau: &Tableau, col: usize, bland: bool) -> Option<(usize, f64)> {
        let rhs_col = tableau.n_cols() - 1;
        let rows = tableau.obj_row();

        // Round-off can leave a basic value a hair below zero; treat it as zero
        let ratio = move |i: usize| tableau.data[i][rhs_col].max(0.0) / tableau.data[i][col];
        let eligible = move || (0..rows).filter(move |&i| tableau.data[i][col] > PIVOT_TOLERANCE);

        let min_ratio = eligible().map(ratio).min_by(f64::total_cmp)?;
        let ties = eligible().filter(|&i| ratio(i) <= min_ratio + self.tolerance);
        let row = if bland {
            ties.min_by_key(|&i| tableau.basic_vars[i])
        } else {
            ties.max_by(|&a, &b| tableau.data[a][col].total_cmp(&tableau.data[b][col]))
        }?;

        Some((row, min_ratio))
    }

    fn feasibility_tolerance(&self) -> f64 {
        FEASIBILITY_TOLERANCE.max(self.tolerance)
    }

    fn pivot(&self, tableau: &mut Tableau, row: usize, col: usize) {
        let n_rows = tableau.data.len();
        let n_cols = tableau.n_cols();

        tableau.basic_vars[row] = col;

        let pivot_val = tableau.data[row][col];
        for j in 0..n_cols {
            tableau.data[row][j] /= pivot_val;
        }

        let pivot_row = tableau.data[row].clone();
        for i in 0..n_rows {
            if i == row {
                continue;
            }
            let factor = tableau.data[i][col];
            if factor == 0.0 {
                continue;
            }
            for j in 0..n_cols {
                tableau.data[i][j] -= factor * pivot_row[j];
            }
            tableau.data[i][col] = 0.0;
            // Keep degenerate rows exactly degenerate
            if i < n_rows - 1 && tableau.data[i][n_cols - 1].abs() <= self.tolerance {
                tableau.data[i][n_cols - 1] = 0.0;
            }
        }
    }

    fn extract_solution(&self, tableau: &Tableau, problem: &LpProblem, iterations: usize) -> Solution {
        let n_vars = problem.num_variables();
        let rhs_col = tableau.n_cols() - 1;

        let mut values = vec![0.0; n_vars];
        for (i, &basic) in tableau.basic_vars.iter().enumerate() {
            if basic < n_vars {
                values[basic] = tableau.data[i][rhs_col];
            }
        }
        for v in values.iter_mut() {
            if v.abs() <= self.tolerance {
                *v = 0.0;
            }
        }

        let objective_value = problem.objective_at(&values);

        Solution {
            status: SolutionStatus::Optimal,
            values,
            objective_value,
            iterations,
        }
    }
}

struct Tableau {
    /// Constraint rows followed by the objective row; last column is the RHS
    data: Vec<Vec<f64>>,
    basic_vars: Vec<usize>,
    n_slack: usize,
    n_artificial: usize,
    n_vars: usize,
}

impl Tableau {
    fn build(problem: &LpProblem) -> Self {
        let n_vars = problem.num_variables();

        // Normalize every row to a nonnegative RHS
        let rows: Vec<(Vec<f64>, ConstraintOp, f64)> = problem
            .constraints
            .iter()
            .map(|c| {
                let mut coefficients = vec![0.0; n_vars];
                for (slot, &coef) in coefficients.iter_mut().zip(&c.coefficients) {
                    *slot = coef;
                }
                if c.rhs < 0.0 {
                    coefficients.iter_mut().for_each(|v| *v = -*v);
                    (coefficients, c.op.flipped(), -c.rhs)
                } else {
                    (coefficients, c.op, c.rhs)
                }
            })
            .collect();

        let mut n_slack = 0;
        let mut n_artificial = 0;
        for (_, op, _) in &rows {
            match op {
                ConstraintOp::Le => n_slack += 1,
                ConstraintOp::Ge => {
                    n_slack += 1;
                    n_artificial += 1;
                }
                ConstraintOp::Eq => n_artificial += 1,
            }
        }

        let total_cols = n_vars + n_slack + n_artificial + 1;
        let mut data = vec![vec![0.0; total_cols]; rows.len() + 1];
        let mut basic_vars = vec![0; rows.len()];

        let mut slack_idx = n_vars;
        let mut artificial_idx = n_vars + n_slack;
        for (i, (coefficients, op, rhs)) in rows.into_iter().enumerate() {
            data[i][..n_vars].copy_from_slice(&coefficients);
            data[i][total_cols - 1] = rhs;

            match op {
                ConstraintOp::Le => {
                    data[i][slack_idx] = 1.0;
                    basic_vars[i] = slack_idx;
                    slack_idx += 1;
                }
                ConstraintOp::Ge => {
                    data[i][slack_idx] = -1.0;
                    slack_idx += 1;
                    data[i][artificial_idx] = 1.0;
                    basic_vars[i] = artificial_idx;
                    artificial_idx += 1;
                }
                ConstraintOp::Eq => {
                    data[i][artificial_idx] = 1.0;
                    basic_vars[i] = artificial_idx;
                    artificial_idx += 1;
                }
            }
        }

        // The tableau maximizes, so a minimization stores -c
        let obj_row = data.len() - 1;
        for (j, &coef) in problem.objective.coefficients.iter().take(n_vars).enumerate() {
            data[obj_row][j] = if problem.objective.minimize { -coef } else { coef };
        }

        Self {
            data,
            basic_vars,
            n_slack,
            n_artificial,
            n_vars,
        }
    }

    fn obj_row(&self) -> usize {
        self.data.len() - 1
    }

    fn n_cols(&self) -> usize {
        self.data[0].len()
    }

    fn artificial_start(&self) -> usize {
        self.n_vars + self.n_slack
    }
}

enum SimplexResult {
    Optimal,
    Unbounded,
    Infeasible,
    IterationLimit,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::LpProblem;

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_simple_maximization() {
        // Maximize: 3x + 2y
        // Subject to:
        //   x + y <= 4
        //   x <= 3
        //   y <= 3
        // Optimal: x=3, y=1, obj=11
        let mut problem = LpProblem::new(names(&["x", "y"]));
        problem.set_objective(vec![3.0, 2.0], false);
        problem.add_constraint("sum", vec![1.0, 1.0], ConstraintOp::Le, 4.0);
        problem.add_constraint("x_max", vec![1.0, 0.0], ConstraintOp::Le, 3.0);
        problem.add_constraint("y_max", vec![0.0, 1.0], ConstraintOp::Le, 3.0);

        let solution = Solver::new().solve(&problem);

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert!((solution.values[0] - 3.0).abs() < 1e-6, "x = {} (expected 3)", solution.values[0]);
        assert!((solution.values[1] - 1.0).abs() < 1e-6, "y = {} (expected 1)", solution.values[1]);
        assert!((solution.objective_value - 11.0).abs() < 1e-6, "obj = {} (expected 11)", solution.objective_value);
    }

    #[test]
    fn test_minimization_with_ge() {
        // Minimize: 2x + 3y
        // Subject to:
        //   x + y >= 4
        //   x <= 3
        //   y <= 3
        // Optimal: x=3, y=1, obj=9
        let mut problem = LpProblem::new(names(&["x", "y"]));
        problem.set_objective(vec![2.0, 3.0], true);
        problem.add_constraint("sum", vec![1.0, 1.0], ConstraintOp::Ge, 4.0);
        problem.add_constraint("x_max", vec![1.0, 0.0], ConstraintOp::Le, 3.0);
        problem.add_constraint("y_max", vec![0.0, 1.0], ConstraintOp::Le, 3.0);

        let solution = Solver::new().solve(&problem);

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert!((solution.values[0] - 3.0).abs() < 1e-6, "x = {} (expected 3)", solution.values[0]);
        assert!((solution.values[1] - 1.0).abs() < 1e-6, "y = {} (expected 1)", solution.values[1]);
        assert!((solution.objective_value - 9.0).abs() < 1e-6, "obj = {} (expected 9)", solution.objective_value);
    }

    #[test]
    fn test_infeasible() {
        // x >= 5
        // x <= 3
        let mut problem = LpProblem::new(names(&["x"]));
        problem.set_objective(vec![1.0], true);
        problem.add_constraint("lower", vec![1.0], ConstraintOp::Ge, 5.0);
        problem.add_constraint("upper", vec![1.0], ConstraintOp::Le, 3.0);

        let solution = Solver::new().solve(&problem);

        assert_eq!(solution.status, SolutionStatus::Infeasible);
        assert!(solution.values.is_empty());
    }

    #[test]
    fn test_unbounded() {
        // Minimize -x subject to x - y <= 1
        let mut problem = LpProblem::new(names(&["x", "y"]));
        problem.set_objective(vec![-1.0, 0.0], true);
        problem.add_constraint("gap", vec![1.0, -1.0], ConstraintOp::Le, 1.0);

        let solution = Solver::new().solve(&problem);

        assert_eq!(solution.status, SolutionStatus::Unbounded);
    }

    #[test]
    fn test_negative_rhs_equality() {
        // Minimize x + y subject to -x - 2y = -4
        // Optimal: y=2, obj=2
        let mut problem = LpProblem::new(names(&["x", "y"]));
        problem.set_objective(vec![1.0, 1.0], true);
        problem.add_constraint("link", vec![-1.0, -2.0], ConstraintOp::Eq, -4.0);

        let solution = Solver::new().solve(&problem);

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert_eq!(solution.values[0], 0.0);
        assert!((solution.values[1] - 2.0).abs() < 1e-9);
        assert!((solution.objective_value - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_redundant_equalities() {
        // The second row is twice the first; its artificial stays in the basis
        let mut problem = LpProblem::new(names(&["x", "y"]));
        problem.set_objective(vec![1.0, 2.0], true);
        problem.add_constraint("first", vec![1.0, 1.0], ConstraintOp::Eq, 2.0);
        problem.add_constraint("second", vec![2.0, 2.0], ConstraintOp::Eq, 4.0);

        let solution = Solver::new().solve(&problem);

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert!((solution.values[0] - 2.0).abs() < 1e-9, "x = {}", solution.values[0]);
        assert!((solution.objective_value - 2.0).abs() < 1e-9);
        assert!(problem.max_violation(&solution.values) < 1e-9);
    }

    #[test]
    fn test_degenerate_problem_terminates() {
        // Beale's example, which cycles under the largest-coefficient rule
        let mut problem = LpProblem::new(names(&["x4", "x5", "x6", "x7"]));
        problem.set_objective(vec![0.75, -20.0, 0.5, -6.0], false);
        problem.add_constraint("r1", vec![0.25, -8.0, -1.0, 9.0], ConstraintOp::Le, 0.0);
        problem.add_constraint("r2", vec![0.5, -12.0, -0.5, 3.0], ConstraintOp::Le, 0.0);
        problem.add_constraint("r3", vec![0.0, 0.0, 1.0, 0.0], ConstraintOp::Le, 1.0);

        let solution = Solver::new().solve(&problem);

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert!((solution.objective_value - 1.25).abs() < 1e-9, "obj = {}", solution.objective_value);
    }

    #[test]
    fn test_zero_rhs_ge_rows() {
        // Explicit nonnegativity rows on top of the implicit bounds
        let mut problem = LpProblem::new(names(&["x", "y"]));
        problem.set_objective(vec![0.5, -1.0], true);
        problem.add_constraint("x_nonneg", vec![1.0, 0.0], ConstraintOp::Ge, 0.0);
        problem.add_constraint("y_nonneg", vec![0.0, 1.0], ConstraintOp::Ge, 0.0);
        problem.add_constraint("y_le_x", vec![-1.0, 1.0], ConstraintOp::Le, 0.0);
        problem.add_constraint("y_cap", vec![0.0, 1.0], ConstraintOp::Le, 5.0);

        let solution = Solver::new().solve(&problem);

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert!((solution.values[0] - 5.0).abs() < 1e-9, "x = {}", solution.values[0]);
        assert!((solution.values[1] - 5.0).abs() < 1e-9, "y = {}", solution.values[1]);
        assert!((solution.objective_value + 2.5).abs() < 1e-9);
        assert!(problem.max_violation(&solution.values) < 1e-9);
    }

    #[test]
    fn test_iteration_limit() {
        let mut problem = LpProblem::new(names(&["x", "y"]));
        problem.set_objective(vec![3.0, 2.0], false);
        problem.add_constraint("sum", vec![1.0, 1.0], ConstraintOp::Le, 4.0);

        let solution = Solver::new().with_max_iterations(0).solve(&problem);

        assert_eq!(solution.status, SolutionStatus::IterationLimit);
    }

    #[test]
    fn test_repeat_solves_are_identical() {
        let mut problem = LpProblem::new(names(&["x", "y", "z"]));
        problem.set_objective(vec![1.0, 2.0, -1.0], true);
        problem.add_constraint("a", vec![1.0, 1.0, 1.0], ConstraintOp::Eq, 6.0);
        problem.add_constraint("b", vec![0.0, 1.0, -1.0], ConstraintOp::Ge, -2.0);
        problem.add_constraint("c", vec![1.0, 0.0, 0.0], ConstraintOp::Ge, 1.0);

        let solver = Solver::new();
        let first = solver.solve(&problem);
        let second = solver.solve(&problem);

        assert!(first.is_optimal());
        assert_eq!(first, second);
    }

    #[test]
    fn test_degenerate_recourse_shape() {
        // Order/leftover/produce layout with every nonnegativity row spelled
        // out and two identical scenarios, which makes most bases degenerate
        let (n, m, scenarios) = (15, 15, 2);
        let req = |i: usize, j: usize| ((3 * i + 5 * j) % 10) as f64;
        let b = |j: usize| (1 + (7 * j) % 19) as f64;
        let s = |j: usize| b(j) - 1.0 - (j % 3) as f64;
        let c = |i: usize| (80 + (37 * i) % 150) as f64 - (600 + (53 * i) % 2000) as f64;
        let d = |i: usize| ((11 * i) % 15) as f64;

        let x = |j: usize| j;
        let y = |j: usize, k: usize| m + j * scenarios + k;
        let z = |i: usize, k: usize| m + m * scenarios + i * scenarios + k;
        let columns = m + m * scenarios + n * scenarios;
        let row = |entries: &[(usize, f64)]| {
            let mut coefficients = vec![0.0; columns];
            for &(col, value) in entries {
                coefficients[col] += value;
            }
            coefficients
        };

        let mut problem = LpProblem::new((0..columns).map(|c| format!("v{c}")).collect());
        let mut objective = vec![0.0; columns];
        for j in 0..m {
            objective[x(j)] = b(j);
            for k in 0..scenarios {
                objective[y(j, k)] = -0.5 * s(j);
            }
        }
        for i in 0..n {
            for k in 0..scenarios {
                objective[z(i, k)] = 0.5 * c(i);
            }
        }
        problem.set_objective(objective, true);

        for j in 0..m {
            for k in 0..scenarios {
                let mut entries = vec![(y(j, k), 1.0), (x(j), -1.0)];
                entries.extend((0..n).map(|i| (z(i, k), req(i, j))));
                problem.add_constraint(format!("need{j}_{k}"), row(&entries), ConstraintOp::Eq, 0.0);
            }
        }
        for j in 0..m {
            problem.add_constraint(format!("x{j}"), row(&[(x(j), 1.0)]), ConstraintOp::Ge, 0.0);
        }
        for j in 0..m {
            for k in 0..scenarios {
                problem.add_constraint(format!("y{j}_{k}"), row(&[(y(j, k), 1.0)]), ConstraintOp::Ge, 0.0);
            }
        }
        for i in 0..n {
            for k in 0..scenarios {
                problem.add_constraint(format!("z{i}_{k}"), row(&[(z(i, k), 1.0)]), ConstraintOp::Ge, 0.0);
                problem.add_constraint(format!("cap{i}_{k}"), row(&[(z(i, k), 1.0)]), ConstraintOp::Le, d(i));
            }
        }
        for j in 0..m {
            for k in 0..scenarios {
                problem.add_constraint(format!("salvage{j}_{k}"), row(&[(y(j, k), 1.0)]), ConstraintOp::Ge, 0.0);
            }
        }

        // Without hedging, warehouse i pays c + sum_j A b per unit
        let expected: f64 = (0..n)
            .map(|i| (c(i) + (0..m).map(|j| req(i, j) * b(j)).sum::<f64>()).min(0.0) * d(i))
            .sum();
        assert!(expected < 0.0);

        let solution = Solver::new().solve(&problem);

        assert_eq!(solution.status, SolutionStatus::Optimal, "after {} pivots", solution.iterations);
        assert!(
            (solution.objective_value - expected).abs() <= 1e-6 * expected.abs(),
            "obj = {}, expected {expected}",
            solution.objective_value
        );
        assert!(problem.max_violation(&solution.values) < 1e-6);
    }
}
