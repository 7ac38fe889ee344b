//! Propagator enforcing a set of linear inequality constraints over integer
//! variables through an external LP solver.
//!
//! The propagator mirrors every referenced integer variable as a continuous
//! column and maintains two solve modes over the same frozen model:
//!
//! * a *feasibility probe* which minimises the total constraint violation
//!   (every row is made elastic through a slack column; the slacks are summed
//!   into a dedicated violation column). A zero optimum certifies that the
//!   rows are satisfiable under the current bounds, a positive optimum or a
//!   solver-reported infeasibility certifies that they are not;
//! * an *objective solve* which pins the slacks to zero and minimises the
//!   column mirroring the main objective variable. Since that column's LP
//!   bounds are refreshed from the trail like any other mirror column, the
//!   search's objective upper bound cuts the LP directly, and exceeding it
//!   surfaces as infeasibility with a dual-ray explanation citing the
//!   objective bound.
//!
//! Conflicts and deductions are justified by reason conjunctions derived
//! from reduced costs or dual rays; see the [`reasoning`] module. Bounds
//! propagation per individual constraint is out of scope here: reduced-cost
//! filtering can be weaker than constraint-specific reasoning, so dedicated
//! propagators complement this one rather than duplicate it.
//!
//! The propagator holds mutable solver state and is not shareable; a
//! parallelised search needs one instance per worker.

mod mirror;
mod reasoning;
mod scaling;

use log::debug;

use self::mirror::VariableMirror;
use self::scaling::LpScaling;
use crate::basic_types::Inconsistency;
use crate::basic_types::PropagationStatusCP;
use crate::basic_types::PropagatorConflict;
use crate::basic_types::PropositionalConjunction;
use crate::create_statistics_struct;
use crate::engine::domain_events::DomainEvents;
use crate::engine::predicates::Predicate;
use crate::engine::propagation::LocalId;
use crate::engine::propagation::PropagationContext;
use crate::engine::propagation::PropagationContextMut;
use crate::engine::propagation::Propagator;
use crate::engine::propagation::VariableWatcher;
use crate::engine::variables::IntegerVariable;
use crate::lp::ColIndex;
use crate::lp::LinearProgram;
use crate::lp::LinearSolver;
use crate::lp::LpSolution;
use crate::lp::LpStatus;
use crate::lp::RowIndex;
use crate::lp_assert_simple;
use crate::predicate;
use crate::statistics::Statistic;
use crate::statistics::StatisticLogger;

/// Tolerance below which solver values are treated as zero. Filtering always
/// rounds away from this margin, so floating-point noise makes the
/// propagator under-filter rather than over-filter.
pub(crate) const EPSILON: f64 = 1e-6;

create_statistics_struct!(LinearProgrammingStatistics {
    number_of_solves: u64,
    number_of_incremental_skips: u64,
    number_of_deductions: u64,
    number_of_conflicts: u64,
});

/// Propagator for a conjunction of linear inequalities `lb <= sum a_i x_i <= ub`
/// backed by an LP relaxation.
///
/// Workflow: create the propagator, author rows through
/// [`create_new_constraint`](Self::create_new_constraint) and
/// [`set_coefficient`](Self::set_coefficient) (plus the objective calls when
/// optimising), then freeze the model with
/// [`register_with`](Self::register_with). From then on the engine drives
/// [`Propagator::propagate`] and [`Propagator::incremental_propagate`] and no
/// structural change is allowed.
#[derive(Debug)]
pub struct LinearProgrammingPropagator<Solver> {
    program: LinearProgram,
    solver: Solver,
    mirror: VariableMirror,
    scaling: LpScaling,

    /// One slack column per elastic row, measuring that row's infeasibility.
    slack_columns: Vec<ColIndex>,
    /// Column equal to the total violation, minimised by the probe.
    violation_sum: Option<ColIndex>,
    violation_sum_row: Option<RowIndex>,

    /// The authored objective, one entry per column; overwritten per column
    /// on repeated [`set_objective_coefficient`](Self::set_objective_coefficient) calls.
    objective_entries: Vec<(ColIndex, f64)>,
    /// The variable the objective expression must equal.
    objective_variable: Option<IntegerVariable>,
    /// The mirror column of [`Self::objective_variable`], set at registration.
    objective_column: Option<ColIndex>,

    integer_reason: Vec<Predicate>,
    deductions: Vec<Predicate>,

    /// The last primal solution at CP scale, one value per mirror ordinal.
    /// When the bound updates since the last solve do not invalidate this
    /// solution, incremental propagation will not find new deductions and
    /// skips the solve entirely.
    lp_solution: Vec<f64>,

    /// Linear constraints cannot be created or modified once this is set.
    lp_constraint_is_registered: bool,

    statistics: LinearProgrammingStatistics,
}

impl<Solver: LinearSolver> LinearProgrammingPropagator<Solver> {
    pub fn new(solver: Solver) -> Self {
        LinearProgrammingPropagator {
            program: LinearProgram::default(),
            solver,
            mirror: VariableMirror::default(),
            scaling: LpScaling::default(),
            slack_columns: Vec::new(),
            violation_sum: None,
            violation_sum_row: None,
            objective_entries: Vec::new(),
            objective_variable: None,
            objective_column: None,
            integer_reason: Vec::new(),
            deductions: Vec::new(),
            lp_solution: Vec::new(),
            lp_constraint_is_registered: false,
            statistics: LinearProgrammingStatistics::default(),
        }
    }

    /// Create a new row `lb <= sum <= ub`; either bound may be infinite.
    /// Must not be called after [`register_with`](Self::register_with).
    pub fn create_new_constraint(&mut self, lower_bound: f64, upper_bound: f64) -> RowIndex {
        lp_assert_simple!(
            !self.lp_constraint_is_registered,
            "constraints cannot be created after registration"
        );
        self.program.new_row(lower_bound, upper_bound)
    }

    /// Set the coefficient of `variable` in `constraint`.
    ///
    /// Calling this twice on the same (constraint, variable) pair overwrites
    /// the earlier value; it does not accumulate.
    pub fn set_coefficient(
        &mut self,
        constraint: RowIndex,
        variable: IntegerVariable,
        coefficient: f64,
    ) {
        lp_assert_simple!(
            !self.lp_constraint_is_registered,
            "coefficients cannot be set after registration"
        );
        let (variable, coefficient) = normalise_orientation(variable, coefficient);
        let column = self.mirror.get_or_create(variable, &mut self.program);
        self.program.set_coefficient(constraint, column, coefficient);
    }

    /// Set the coefficient of `variable` in the objective expression.
    /// Calling it twice overwrites the previous value.
    pub fn set_objective_coefficient(&mut self, variable: IntegerVariable, coefficient: f64) {
        lp_assert_simple!(
            !self.lp_constraint_is_registered,
            "the objective cannot be changed after registration"
        );
        let (variable, coefficient) = normalise_orientation(variable, coefficient);
        let column = self.mirror.get_or_create(variable, &mut self.program);
        match self
            .objective_entries
            .iter_mut()
            .find(|(entry, _)| *entry == column)
        {
            Some((_, entry_coefficient)) => *entry_coefficient = coefficient,
            None => self.objective_entries.push((column, coefficient)),
        }
    }

    /// Record the variable whose value equals the objective expression. The
    /// binding is pure identity; no arithmetic is performed on it here.
    pub fn set_main_objective_variable(&mut self, variable: IntegerVariable) {
        lp_assert_simple!(
            !self.lp_constraint_is_registered,
            "the objective cannot be changed after registration"
        );
        lp_assert_simple!(
            variable.is_positive(),
            "the objective variable must be a positive-orientation handle"
        );
        self.objective_variable = Some(variable);
    }

    /// Freeze the model and subscribe to the watched variables.
    ///
    /// This builds the violation-sum scaffolding (per-row slacks summed into
    /// the violation column), ties the objective expression to the objective
    /// variable's column, equilibrates the matrix, and registers every
    /// mirror ordinal with the watcher so that bound tightenings re-trigger
    /// incremental propagation.
    pub fn register_with(&mut self, watcher: &mut dyn VariableWatcher) {
        lp_assert_simple!(
            !self.lp_constraint_is_registered,
            "register_with may only be called once"
        );
        lp_assert_simple!(
            self.objective_entries.is_empty() || self.objective_variable.is_some(),
            "an objective expression requires a main objective variable"
        );

        let user_rows: Vec<RowIndex> = self.program.row_indices().collect();

        if let Some(objective_variable) = self.objective_variable {
            let objective_column = self
                .mirror
                .get_or_create(objective_variable, &mut self.program);
            self.objective_column = Some(objective_column);

            // Row tying the objective expression to the objective column;
            // cancels away when the objective is exactly that column.
            let mut linking = self.objective_entries.clone();
            match linking
                .iter_mut()
                .find(|(column, _)| *column == objective_column)
            {
                Some((_, coefficient)) => *coefficient -= 1.0,
                None => linking.push((objective_column, -1.0)),
            }
            linking.retain(|(_, coefficient)| *coefficient != 0.0);
            if !linking.is_empty() {
                let row = self.program.new_row(0.0, 0.0);
                for (column, coefficient) in linking {
                    self.program.set_coefficient(row, column, coefficient);
                }
            }
        }

        let violation_sum = self.program.new_column(0.0, 0.0);
        for row in user_rows {
            let (lower_bound, upper_bound) = self.program.row_bounds(row);
            if !lower_bound.is_finite() && !upper_bound.is_finite() {
                continue;
            }

            let slack = self.program.new_column(0.0, 0.0);
            self.slack_columns.push(slack);

            if lower_bound.is_finite() && upper_bound.is_finite() {
                // Two-sided rows split: the slack absorbs shortfall below the
                // lower bound in the original row and excess above the upper
                // bound in a shadow row sharing the same coefficients.
                let shadow = self.program.new_row(f64::NEG_INFINITY, upper_bound);
                let coefficients = self.program.row_coefficients(row).to_vec();
                for (column, coefficient) in coefficients {
                    self.program.set_coefficient(shadow, column, coefficient);
                }
                self.program.set_coefficient(shadow, slack, -1.0);
                self.program.set_row_bounds(row, lower_bound, f64::INFINITY);
                self.program.set_coefficient(row, slack, 1.0);
            } else if lower_bound.is_finite() {
                self.program.set_coefficient(row, slack, 1.0);
            } else {
                self.program.set_coefficient(row, slack, -1.0);
            }
        }

        let violation_sum_row = self.program.new_row(0.0, 0.0);
        for &slack in &self.slack_columns {
            self.program.set_coefficient(violation_sum_row, slack, 1.0);
        }
        self.program
            .set_coefficient(violation_sum_row, violation_sum, -1.0);
        self.violation_sum = Some(violation_sum);
        self.violation_sum_row = Some(violation_sum_row);

        self.scaling = LpScaling::equilibrate(&mut self.program);

        for (ordinal, variable) in self.mirror.variables().iter().enumerate() {
            watcher.watch_variable(*variable, DomainEvents::BOUNDS, LocalId::from(ordinal as u32));
        }

        self.lp_constraint_is_registered = true;
        debug!(
            "registered lp propagator: {} mirrored variables, {} rows, {} slacks",
            self.mirror.len(),
            self.program.num_rows(),
            self.slack_columns.len()
        );
    }

    fn violation_column(&self) -> ColIndex {
        self.violation_sum
            .expect("the violation column exists after registration")
    }

    /// Refresh every mirror column's LP bounds from the trail.
    fn update_mirror_bounds(&mut self, context: PropagationContext<'_>) {
        for (variable, column) in self.mirror.iter() {
            let lower_bound = context.lower_bound(variable) as f64;
            let upper_bound = context.upper_bound(variable) as f64;
            self.program.set_column_bounds(
                column,
                self.scaling.bound_at_lp_scale(column, lower_bound),
                self.scaling.bound_at_lp_scale(column, upper_bound),
            );
        }
    }

    fn cached_solution_is_valid(&self, context: PropagationContext<'_>) -> bool {
        !self.lp_solution.is_empty()
            && self
                .lp_solution
                .iter()
                .zip(self.mirror.variables())
                .all(|(&value, &variable)| {
                    value >= context.lower_bound(variable) as f64 - EPSILON
                        && value <= context.upper_bound(variable) as f64 + EPSILON
                })
    }

    fn cache_solution(&mut self, solution: &LpSolution) {
        let scaling = &self.scaling;
        self.lp_solution = self
            .mirror
            .columns()
            .iter()
            .map(|&column| scaling.value_at_cp_scale(column, solution.primal_values[column]))
            .collect();
    }

    /// Elastic slacks, minimise the violation column.
    fn set_violation_mode(&mut self) {
        self.program.clear_objective();
        for &slack in &self.slack_columns {
            self.program.set_column_bounds(slack, 0.0, f64::INFINITY);
        }
        let violation_sum = self.violation_column();
        self.program
            .set_column_bounds(violation_sum, 0.0, f64::INFINITY);
        self.program.set_objective_coefficient(violation_sum, 1.0);
    }

    /// Slacks pinned to zero, minimise the objective column.
    fn set_objective_mode(&mut self) {
        self.program.clear_objective();
        for &slack in &self.slack_columns {
            self.program.set_column_bounds(slack, 0.0, 0.0);
        }
        let violation_sum = self.violation_column();
        self.program.set_column_bounds(violation_sum, 0.0, 0.0);
        let objective_column = self
            .objective_column
            .expect("objective mode requires an objective");
        self.program.set_objective_coefficient(objective_column, 1.0);
    }

    /// Build a conflict from an infeasible solve. Without a certificate the
    /// infeasibility cannot be explained and is treated as inconclusive.
    fn infeasibility_conflict(
        &mut self,
        context: PropagationContext<'_>,
        solution: &LpSolution,
    ) -> Option<PropagatorConflict> {
        let dual_ray = solution.dual_ray.as_ref()?;
        self.fill_dual_ray_reason(context, dual_ray);
        Some(PropagatorConflict {
            conjunction: self.integer_reason.clone().into(),
        })
    }

    /// Run the feasibility probe. `Ok(Some(solution))` means the rows are
    /// satisfiable under the current bounds; `Ok(None)` means the solve was
    /// abandoned or unexplainable and yields no information this round.
    fn run_violation_probe(
        &mut self,
        context: &mut PropagationContextMut<'_>,
    ) -> Result<Option<LpSolution>, Inconsistency> {
        self.set_violation_mode();
        self.statistics.number_of_solves += 1;
        let solution = self.solver.solve(&self.program, context.termination());

        match solution.status {
            LpStatus::Inconclusive => Ok(None),
            LpStatus::Infeasible | LpStatus::DualUnbounded => {
                // The elastic rows are always satisfiable; this arises when
                // the objective linking row contradicts the column bounds.
                match self.infeasibility_conflict(context.as_readonly(), &solution) {
                    Some(conflict) => {
                        self.statistics.number_of_conflicts += 1;
                        Err(conflict.into())
                    }
                    None => Ok(None),
                }
            }
            LpStatus::Optimal => {
                let violation = self
                    .scaling
                    .value_at_cp_scale(self.violation_column(), solution.objective_value);
                debug!("lp feasibility probe: violation sum {violation}");
                if violation > EPSILON {
                    self.fill_reduced_costs_reason(context.as_readonly(), &solution);
                    self.statistics.number_of_conflicts += 1;
                    return Err(
                        PropositionalConjunction::from(self.integer_reason.clone()).into(),
                    );
                }
                self.cache_solution(&solution);
                Ok(Some(solution))
            }
        }
    }

    /// Optimise the objective column over the strict rows and derive the
    /// objective lower bound plus reduced cost strengthening deductions.
    /// Requires the relaxation to be known feasible.
    fn optimise_objective(
        &mut self,
        context: &mut PropagationContextMut<'_>,
    ) -> PropagationStatusCP {
        let objective_column = self
            .objective_column
            .expect("optimisation requires an objective");
        let objective_variable = self
            .objective_variable
            .expect("set together with the objective column");

        self.set_objective_mode();
        self.statistics.number_of_solves += 1;
        let solution = self.solver.solve(&self.program, context.termination());

        match solution.status {
            LpStatus::Inconclusive => Ok(()),
            LpStatus::Infeasible | LpStatus::DualUnbounded => {
                match self.infeasibility_conflict(context.as_readonly(), &solution) {
                    Some(conflict) => {
                        self.statistics.number_of_conflicts += 1;
                        Err(conflict.into())
                    }
                    None => Ok(()),
                }
            }
            LpStatus::Optimal => {
                self.cache_solution(&solution);
                let objective_lower_bound = self
                    .scaling
                    .value_at_cp_scale(objective_column, solution.objective_value);
                debug!("lp objective solve: lower bound {objective_lower_bound}");
                self.fill_reduced_costs_reason(context.as_readonly(), &solution);

                // Push the relaxation bound onto the objective variable.
                let candidate = (objective_lower_bound - EPSILON).ceil();
                if candidate > context.lower_bound(objective_variable) as f64 {
                    let reason = PropositionalConjunction::from(self.integer_reason.clone());
                    context.set_lower_bound(objective_variable, candidate as i32, reason)?;
                    self.statistics.number_of_deductions += 1;
                }

                let objective_upper_bound = context.upper_bound(objective_variable);
                let delta = (objective_upper_bound as f64 - objective_lower_bound).max(0.0);
                self.reduced_cost_strengthening_deductions(
                    context.as_readonly(),
                    &solution,
                    objective_column,
                    delta,
                );
                self.apply_deductions(
                    context,
                    Some(predicate![objective_variable <= objective_upper_bound]),
                )
            }
        }
    }

    /// Apply the pending deductions; each carries the reduced-cost reason of
    /// the solve that produced it, extended with the objective bound record
    /// when optimising.
    fn apply_deductions(
        &mut self,
        context: &mut PropagationContextMut<'_>,
        objective_bound: Option<Predicate>,
    ) -> PropagationStatusCP {
        if self.deductions.is_empty() {
            return Ok(());
        }

        let mut reason_predicates = self.integer_reason.clone();
        reason_predicates.extend(objective_bound);

        let deductions = std::mem::take(&mut self.deductions);
        for deduction in deductions {
            let reason = PropositionalConjunction::from(reason_predicates.clone());
            match deduction {
                Predicate::LowerBound {
                    variable,
                    lower_bound,
                } => context.set_lower_bound(variable, lower_bound, reason)?,
                Predicate::UpperBound {
                    variable,
                    upper_bound,
                } => context.set_upper_bound(variable, upper_bound, reason)?,
            }
            self.statistics.number_of_deductions += 1;
        }
        Ok(())
    }
}

impl<Solver: LinearSolver + 'static> Propagator for LinearProgrammingPropagator<Solver> {
    fn name(&self) -> &str {
        "LinearProgramming"
    }

    fn propagate(&mut self, context: &mut PropagationContextMut<'_>) -> PropagationStatusCP {
        lp_assert_simple!(
            self.lp_constraint_is_registered,
            "propagation requires a registered model"
        );

        if context.termination().should_stop() {
            return Ok(());
        }

        self.update_mirror_bounds(context.as_readonly());

        if self.objective_column.is_none() {
            let Some(solution) = self.run_violation_probe(context)? else {
                return Ok(());
            };
            // At a zero-violation optimum the probe's reduced costs still
            // carry information: a column that cannot move off its bound
            // without forcing positive violation is fixed there.
            let violation_column = self.violation_column();
            self.fill_reduced_costs_reason(context.as_readonly(), &solution);
            self.reduced_cost_strengthening_deductions(
                context.as_readonly(),
                &solution,
                violation_column,
                0.0,
            );
            return self.apply_deductions(context, None);
        }

        if !self.cached_solution_is_valid(context.as_readonly())
            && self.run_violation_probe(context)?.is_none()
        {
            return Ok(());
        }

        self.optimise_objective(context)
    }

    fn incremental_propagate(
        &mut self,
        context: &mut PropagationContextMut<'_>,
        watch_indices: &[LocalId],
    ) -> PropagationStatusCP {
        if !self.lp_solution.is_empty() {
            let read = context.as_readonly();
            let cache_still_valid = watch_indices.iter().all(|local_id| {
                let ordinal = local_id.unpack() as usize;
                let value = self.lp_solution[ordinal];
                let variable = self.mirror.variable(ordinal);
                value >= read.lower_bound(variable) as f64 - EPSILON
                    && value <= read.upper_bound(variable) as f64 + EPSILON
            });
            if cache_still_valid {
                self.statistics.number_of_incremental_skips += 1;
                return Ok(());
            }
        }
        self.propagate(context)
    }

    fn priority(&self) -> u32 {
        // an LP solve is expensive; let the cheap propagators filter first
        4
    }

    fn log_statistics(&self, statistic_logger: StatisticLogger) {
        self.statistics.log(statistic_logger);
    }
}

/// Rewrite a possibly negated handle into its positive orientation,
/// flipping the coefficient sign accordingly.
fn normalise_orientation(variable: IntegerVariable, coefficient: f64) -> (IntegerVariable, f64) {
    if variable.is_positive() {
        (variable, coefficient)
    } else {
        (variable.negated(), -coefficient)
    }
}

#[cfg(test)]
mod tests;
