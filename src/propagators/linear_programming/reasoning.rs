//! Translation of raw solver output (reduced costs, dual rays) into reasons
//! and bound deductions over the search engine's own variables.

use super::LinearProgrammingPropagator;
use super::EPSILON;
use crate::containers::KeyedVec;
use crate::engine::propagation::PropagationContext;
use crate::lp::ColIndex;
use crate::lp::LinearSolver;
use crate::lp::LpSolution;
use crate::lp::RowIndex;
use crate::predicate;

impl<Solver: LinearSolver> LinearProgrammingPropagator<Solver> {
    /// Collect the bound predicates explaining why the current LP optimum
    /// cannot be improved: a column with a strictly positive reduced cost
    /// rests on its lower bound and contributes that lower bound, one with a
    /// strictly negative reduced cost rests on its upper bound and
    /// contributes that upper bound. The collected conjunction justifies
    /// every deduction and conflict produced from the same solve.
    pub(crate) fn fill_reduced_costs_reason(
        &mut self,
        context: PropagationContext<'_>,
        solution: &LpSolution,
    ) {
        self.integer_reason.clear();
        for (variable, column) in self.mirror.iter() {
            let reduced_cost = solution.reduced_costs[column];
            if reduced_cost > EPSILON {
                self.integer_reason
                    .push(predicate![variable >= context.lower_bound(variable)]);
            } else if reduced_cost < -EPSILON {
                self.integer_reason
                    .push(predicate![variable <= context.upper_bound(variable)]);
            }
        }
    }

    /// Collect the bound predicates explaining primal infeasibility from a
    /// dual ray: combining the rows with the ray weights yields an
    /// inequality `sum c_j x_j <= d` which is violated even at its minimum
    /// over the column bounds. The bounds attaining that minimum (the lower
    /// bound where `c_j` is positive, the upper bound where it is negative)
    /// are the reason. Usually tighter than a reduced-cost explanation, and
    /// preferred whenever a ray is available.
    pub(crate) fn fill_dual_ray_reason(
        &mut self,
        context: PropagationContext<'_>,
        dual_ray: &KeyedVec<RowIndex, f64>,
    ) {
        let mut combination: KeyedVec<ColIndex, f64> = KeyedVec::default();
        combination.resize(self.program.num_columns(), 0.0);
        for row in self.program.row_indices() {
            let weight = dual_ray[row];
            if weight == 0.0 {
                continue;
            }
            for &(column, coefficient) in self.program.row_coefficients(row) {
                combination[column] += weight * coefficient;
            }
        }

        self.integer_reason.clear();
        for (variable, column) in self.mirror.iter() {
            let coefficient = combination[column];
            if coefficient > EPSILON {
                self.integer_reason
                    .push(predicate![variable >= context.lower_bound(variable)]);
            } else if coefficient < -EPSILON {
                self.integer_reason
                    .push(predicate![variable <= context.upper_bound(variable)]);
            }
        }
    }

    /// Derive bound tightenings from reduced costs: a column with reduced
    /// cost `r` can move at most `delta / |r|` solver-scale units off its
    /// active bound before the objective exceeds its known upper bound,
    /// where `delta` is `cp_objective_delta` converted to the solver scale
    /// of the active objective column.
    ///
    /// Candidates are rounded towards the variable's feasible integer side
    /// (floor for upper bounds, ceil for lower bounds, with an epsilon slack
    /// so rounding under-filters), and only strictly tightening candidates
    /// are kept.
    pub(crate) fn reduced_cost_strengthening_deductions(
        &mut self,
        context: PropagationContext<'_>,
        solution: &LpSolution,
        objective_column: ColIndex,
        cp_objective_delta: f64,
    ) {
        self.deductions.clear();
        let objective_scale = self.scaling.column_scale(objective_column);

        for (variable, column) in self.mirror.iter() {
            let reduced_cost = solution.reduced_costs[column];
            if reduced_cost.abs() <= EPSILON {
                continue;
            }

            let value = self
                .scaling
                .value_at_cp_scale(column, solution.primal_values[column]);
            let movement = self.scaling.column_scale(column) * cp_objective_delta
                / (reduced_cost.abs() * objective_scale);

            if reduced_cost > 0.0 {
                let candidate = (value + movement + EPSILON).floor();
                if candidate < context.upper_bound(variable) as f64 {
                    self.deductions.push(predicate![variable <= candidate as i32]);
                }
            } else {
                let candidate = (value - movement - EPSILON).ceil();
                if candidate > context.lower_bound(variable) as f64 {
                    self.deductions.push(predicate![variable >= candidate as i32]);
                }
            }
        }
    }
}
