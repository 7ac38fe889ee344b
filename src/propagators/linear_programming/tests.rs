use super::*;
use crate::conjunction;
use crate::containers::StorageKey;
use crate::engine::test_solver::infeasible_solution;
use crate::engine::test_solver::optimal_solution;
use crate::engine::test_solver::ScriptedLinearSolver;
use crate::engine::test_solver::TestSolver;

#[test]
fn coefficients_are_overwritten_not_accumulated() {
    let mut solver = TestSolver::default();
    let x = solver.new_variable(0, 10);
    let y = solver.new_variable(0, 10);

    let mut propagator = LinearProgrammingPropagator::new(ScriptedLinearSolver::default());
    let row = propagator.create_new_constraint(f64::NEG_INFINITY, 2.0);
    propagator.set_coefficient(row, x, 1.0);
    propagator.set_coefficient(row, y, -1.0);
    // overwriting the coefficient of x leaves the row as -y <= 2
    propagator.set_coefficient(row, x, 0.0);

    let columns = propagator.mirror.columns().to_vec();
    assert_eq!(propagator.program.coefficient(row, columns[0]), 0.0);
    assert_eq!(propagator.program.coefficient(row, columns[1]), -1.0);
}

#[test]
fn mirroring_is_shared_between_rows_and_objective() {
    let mut solver = TestSolver::default();
    let x = solver.new_variable(0, 10);

    let mut propagator = LinearProgrammingPropagator::new(ScriptedLinearSolver::default());
    let first = propagator.create_new_constraint(0.0, 5.0);
    let second = propagator.create_new_constraint(1.0, f64::INFINITY);
    propagator.set_coefficient(first, x, 1.0);
    propagator.set_coefficient(second, x, 1.0);
    propagator.set_objective_coefficient(x, 1.0);

    assert_eq!(propagator.mirror.len(), 1);
    assert_eq!(propagator.program.num_columns(), 1);
}

#[test]
fn negated_handles_are_normalised_with_flipped_coefficients() {
    let mut solver = TestSolver::default();
    let x = solver.new_variable(0, 10);

    let mut propagator = LinearProgrammingPropagator::new(ScriptedLinearSolver::default());
    let row = propagator.create_new_constraint(f64::NEG_INFINITY, 2.0);
    propagator.set_coefficient(row, x.negated(), 2.0);

    assert_eq!(propagator.mirror.variables(), &[x]);
    let column = propagator.mirror.columns()[0];
    assert_eq!(propagator.program.coefficient(row, column), -2.0);
}

#[test]
#[should_panic(expected = "constraints cannot be created after registration")]
fn creating_a_constraint_after_registration_panics() {
    let mut solver = TestSolver::default();
    let x = solver.new_variable(0, 10);

    let mut propagator = LinearProgrammingPropagator::new(ScriptedLinearSolver::default());
    let row = propagator.create_new_constraint(0.0, 5.0);
    propagator.set_coefficient(row, x, 1.0);
    propagator.register_with(&mut solver.watcher);

    let _ = propagator.create_new_constraint(0.0, 1.0);
}

#[test]
#[should_panic(expected = "coefficients cannot be set after registration")]
fn setting_a_coefficient_after_registration_panics() {
    let mut solver = TestSolver::default();
    let x = solver.new_variable(0, 10);

    let mut propagator = LinearProgrammingPropagator::new(ScriptedLinearSolver::default());
    let row = propagator.create_new_constraint(0.0, 5.0);
    propagator.set_coefficient(row, x, 1.0);
    propagator.register_with(&mut solver.watcher);

    propagator.set_coefficient(row, x, 2.0);
}

#[test]
fn registration_subscribes_every_mirror_ordinal() {
    let mut solver = TestSolver::default();
    let x = solver.new_variable(0, 10);
    let y = solver.new_variable(0, 10);

    let mut propagator = LinearProgrammingPropagator::new(ScriptedLinearSolver::default());
    let row = propagator.create_new_constraint(f64::NEG_INFINITY, 10.0);
    propagator.set_coefficient(row, x, 1.0);
    propagator.set_coefficient(row, y, 1.0);
    propagator.register_with(&mut solver.watcher);

    assert_eq!(
        solver.watcher.watches,
        vec![
            (x, DomainEvents::BOUNDS, LocalId::from(0)),
            (y, DomainEvents::BOUNDS, LocalId::from(1)),
        ]
    );
}

#[test]
fn registration_builds_the_violation_scaffolding() {
    let mut solver = TestSolver::default();
    let x = solver.new_variable(0, 10);
    let y = solver.new_variable(0, 10);

    let mut propagator = LinearProgrammingPropagator::new(ScriptedLinearSolver::default());
    let at_least = propagator.create_new_constraint(5.0, f64::INFINITY);
    propagator.set_coefficient(at_least, x, 1.0);
    let at_most = propagator.create_new_constraint(f64::NEG_INFINITY, 2.0);
    propagator.set_coefficient(at_most, y, 1.0);
    let ranged = propagator.create_new_constraint(1.0, 3.0);
    propagator.set_coefficient(ranged, x, 1.0);
    propagator.set_coefficient(ranged, y, 1.0);
    propagator.register_with(&mut solver.watcher);

    let program = &propagator.program;
    // x, y, the violation column, and one slack per row
    assert_eq!(program.num_columns(), 6);
    // the three authored rows, the shadow of the ranged row, the violation row
    assert_eq!(program.num_rows(), 5);

    let violation_sum = propagator.violation_sum.unwrap();
    let slacks = propagator.slack_columns.clone();
    assert_eq!(slacks.len(), 3);

    // the >= row takes its slack positively, the <= row negatively
    assert_eq!(program.coefficient(at_least, slacks[0]), 1.0);
    assert_eq!(program.coefficient(at_most, slacks[1]), -1.0);

    // the ranged row keeps its lower bound and hands the upper bound to a
    // shadow row sharing the slack
    let violation_row = propagator.violation_sum_row.unwrap();
    let shadow = RowIndex::create_from_index(violation_row.index() - 1);
    assert_eq!(program.row_bounds(ranged), (1.0, f64::INFINITY));
    assert_eq!(program.coefficient(ranged, slacks[2]), 1.0);
    assert_eq!(program.row_bounds(shadow), (f64::NEG_INFINITY, 3.0));
    assert_eq!(program.coefficient(shadow, slacks[2]), -1.0);

    // the violation row equates the violation column with the slack total
    assert_eq!(program.row_bounds(violation_row), (0.0, 0.0));
    assert_eq!(program.coefficient(violation_row, violation_sum), -1.0);
    for slack in slacks {
        assert_eq!(program.coefficient(violation_row, slack), 1.0);
    }
}

#[test]
fn feasible_probe_produces_no_deductions() {
    // x + y <= 10 and x - y <= 2 with x, y in [0, 10] is satisfiable with
    // room to spare; feasibility alone must not force any bound change.
    let mut solver = TestSolver::default();
    let x = solver.new_variable(0, 10);
    let y = solver.new_variable(0, 10);

    let lp = ScriptedLinearSolver::default();
    let mut propagator = LinearProgrammingPropagator::new(lp.clone());
    let first = propagator.create_new_constraint(f64::NEG_INFINITY, 10.0);
    propagator.set_coefficient(first, x, 1.0);
    propagator.set_coefficient(first, y, 1.0);
    let second = propagator.create_new_constraint(f64::NEG_INFINITY, 2.0);
    propagator.set_coefficient(second, x, 1.0);
    propagator.set_coefficient(second, y, -1.0);
    propagator.register_with(&mut solver.watcher);

    // violation optimum 0 at x = y = 0, all reduced costs zero
    lp.enqueue(optimal_solution(&propagator.program, 0.0, &[], &[]));

    let result = solver.propagate(&mut propagator);

    assert!(result.is_ok());
    assert_eq!(lp.number_of_solves(), 1);
    assert_eq!(solver.number_of_deductions(), 0);
    solver.assert_bounds(x, 0, 10);
    solver.assert_bounds(y, 0, 10);
}

#[test]
fn positive_violation_optimum_is_a_conflict_citing_the_binding_bounds() {
    // x >= 5 with x in [0, 3] is infeasible by 2.
    let mut solver = TestSolver::default();
    let x = solver.new_variable(0, 3);

    let lp = ScriptedLinearSolver::default();
    let mut propagator = LinearProgrammingPropagator::new(lp.clone());
    let row = propagator.create_new_constraint(5.0, f64::INFINITY);
    propagator.set_coefficient(row, x, 1.0);
    propagator.register_with(&mut solver.watcher);

    let columns = propagator.mirror.columns().to_vec();
    let violation_sum = propagator.violation_sum.unwrap();
    let slack = propagator.slack_columns[0];
    // minimal violation 2 at x = 3; raising x would lower the violation, so
    // the reduced cost of x is negative and x rests on its upper bound
    lp.enqueue(optimal_solution(
        &propagator.program,
        2.0,
        &[(columns[0], 3.0), (slack, 2.0), (violation_sum, 2.0)],
        &[(columns[0], -1.0)],
    ));

    let result = solver.propagate(&mut propagator);

    assert_eq!(
        result,
        Err(Inconsistency::Conflict(PropagatorConflict {
            conjunction: conjunction!([x <= 3]),
        }))
    );
}

#[test]
fn objective_solve_tightens_the_objective_lower_bound() {
    // minimise x subject to x + y = 10 with y in [0, 4]; the relaxation
    // bound 6 is pushed onto x, justified by the upper bound of y.
    let mut solver = TestSolver::default();
    let x = solver.new_variable(0, 100);
    let y = solver.new_variable(0, 4);

    let lp = ScriptedLinearSolver::default();
    let mut propagator = LinearProgrammingPropagator::new(lp.clone());
    let row = propagator.create_new_constraint(10.0, 10.0);
    propagator.set_coefficient(row, x, 1.0);
    propagator.set_coefficient(row, y, 1.0);
    propagator.set_objective_coefficient(x, 1.0);
    propagator.set_main_objective_variable(x);
    propagator.register_with(&mut solver.watcher);

    let columns = propagator.mirror.columns().to_vec();
    // feasibility probe: violation 0 at (6, 4)
    lp.enqueue(optimal_solution(
        &propagator.program,
        0.0,
        &[(columns[0], 6.0), (columns[1], 4.0)],
        &[],
    ));
    // objective solve: minimum 6 with y nonbasic at its upper bound
    lp.enqueue(optimal_solution(
        &propagator.program,
        6.0,
        &[(columns[0], 6.0), (columns[1], 4.0)],
        &[(columns[1], -1.0)],
    ));

    let result = solver.propagate(&mut propagator);

    assert!(result.is_ok());
    assert_eq!(lp.number_of_solves(), 2);
    solver.assert_bounds(x, 6, 100);
    solver.assert_bounds(y, 0, 4);

    let reason = solver.get_reason(predicate![x >= 6]);
    assert_eq!(reason, conjunction!([y <= 4]));
}

#[test]
fn the_objective_is_its_own_mirror_column_when_it_is_the_objective_variable() {
    let mut solver = TestSolver::default();
    let x = solver.new_variable(0, 100);

    let mut propagator = LinearProgrammingPropagator::new(ScriptedLinearSolver::default());
    let row = propagator.create_new_constraint(0.0, f64::INFINITY);
    propagator.set_coefficient(row, x, 1.0);
    propagator.set_objective_coefficient(x, 1.0);
    propagator.set_main_objective_variable(x);
    propagator.register_with(&mut solver.watcher);

    // the identity binding cancels; no linking row is created, and the
    // objective column is the mirror column of x itself
    assert_eq!(propagator.objective_column, Some(propagator.mirror.columns()[0]));
    // the authored row, its shadow-free slack wiring, and the violation row
    assert_eq!(propagator.program.num_rows(), 2);
}

#[test]
fn zero_violation_reduced_costs_fix_pinned_columns() {
    // x + y >= 10 with x, y in [0, 5] is only satisfiable at (5, 5); the
    // probe's reduced costs fix both variables there.
    let mut solver = TestSolver::default();
    let x = solver.new_variable(0, 5);
    let y = solver.new_variable(0, 5);

    let lp = ScriptedLinearSolver::default();
    let mut propagator = LinearProgrammingPropagator::new(lp.clone());
    let row = propagator.create_new_constraint(10.0, f64::INFINITY);
    propagator.set_coefficient(row, x, 1.0);
    propagator.set_coefficient(row, y, 1.0);
    propagator.register_with(&mut solver.watcher);

    let columns = propagator.mirror.columns().to_vec();
    lp.enqueue(optimal_solution(
        &propagator.program,
        0.0,
        &[(columns[0], 5.0), (columns[1], 5.0)],
        &[(columns[0], -1.0), (columns[1], -1.0)],
    ));

    let result = solver.propagate(&mut propagator);

    assert!(result.is_ok());
    solver.assert_bounds(x, 5, 5);
    solver.assert_bounds(y, 5, 5);
    let reason = solver.get_reason(predicate![x >= 5]);
    assert_eq!(reason, conjunction!([x <= 5] & [y <= 5]));
}

#[test]
fn a_valid_cached_solution_short_circuits_incremental_propagation() {
    let mut solver = TestSolver::default();
    let x = solver.new_variable(0, 10);
    let y = solver.new_variable(0, 10);

    let lp = ScriptedLinearSolver::default();
    let mut propagator = LinearProgrammingPropagator::new(lp.clone());
    let row = propagator.create_new_constraint(f64::NEG_INFINITY, 10.0);
    propagator.set_coefficient(row, x, 1.0);
    propagator.set_coefficient(row, y, 1.0);
    propagator.register_with(&mut solver.watcher);

    lp.enqueue(optimal_solution(&propagator.program, 0.0, &[], &[]));
    let result = solver.propagate(&mut propagator);
    assert!(result.is_ok());
    assert_eq!(lp.number_of_solves(), 1);

    // the cached solution has y = 0, which the tightened bound still allows:
    // no re-solve, no deductions
    solver.tighten_upper_bound(y, 8);
    let result = solver.incremental_propagate(&mut propagator, &[LocalId::from(1)]);
    assert!(result.is_ok());
    assert_eq!(lp.number_of_solves(), 1);
    assert_eq!(solver.number_of_deductions(), 0);

    // excluding the cached value forces a re-solve
    solver.tighten_lower_bound(y, 1);
    let columns = propagator.mirror.columns().to_vec();
    lp.enqueue(optimal_solution(
        &propagator.program,
        0.0,
        &[(columns[1], 1.0)],
        &[],
    ));
    let result = solver.incremental_propagate(&mut propagator, &[LocalId::from(1)]);
    assert!(result.is_ok());
    assert_eq!(lp.number_of_solves(), 2);
}

#[test]
fn an_inconclusive_solve_yields_no_information() {
    let mut solver = TestSolver::default();
    let x = solver.new_variable(0, 10);

    let lp = ScriptedLinearSolver::default();
    let mut propagator = LinearProgrammingPropagator::new(lp.clone());
    let row = propagator.create_new_constraint(0.0, 5.0);
    propagator.set_coefficient(row, x, 1.0);
    propagator.register_with(&mut solver.watcher);

    lp.enqueue(LpSolution::inconclusive());
    let result = solver.propagate(&mut propagator);

    assert!(result.is_ok());
    assert_eq!(solver.number_of_deductions(), 0);

    // nothing was cached, so the next incremental call re-solves in full
    lp.enqueue(optimal_solution(&propagator.program, 0.0, &[], &[]));
    let result = solver.incremental_propagate(&mut propagator, &[LocalId::from(0)]);
    assert!(result.is_ok());
    assert_eq!(lp.number_of_solves(), 2);
}

#[test]
fn a_dual_ray_is_translated_into_the_bounds_entering_the_combination() {
    let mut solver = TestSolver::default();
    let x = solver.new_variable(0, 100);
    let y = solver.new_variable(0, 4);

    let lp = ScriptedLinearSolver::default();
    let mut propagator = LinearProgrammingPropagator::new(lp.clone());
    let row = propagator.create_new_constraint(10.0, 10.0);
    propagator.set_coefficient(row, x, 1.0);
    propagator.set_coefficient(row, y, 1.0);
    propagator.set_objective_coefficient(x, 1.0);
    propagator.set_main_objective_variable(x);
    propagator.register_with(&mut solver.watcher);

    let columns = propagator.mirror.columns().to_vec();
    lp.enqueue(optimal_solution(
        &propagator.program,
        0.0,
        &[(columns[0], 6.0), (columns[1], 4.0)],
        &[],
    ));
    // the solver reports the strict system infeasible with a ray over the
    // >= side of the equality row: combined coefficients are negative, so
    // the upper bounds of x and y enter the explanation
    lp.enqueue(infeasible_solution(&propagator.program, &[(row, -1.0)]));

    let result = solver.propagate(&mut propagator);

    assert_eq!(
        result,
        Err(Inconsistency::Conflict(PropagatorConflict {
            conjunction: conjunction!([x <= 100] & [y <= 4]),
        }))
    );
}

#[test]
#[should_panic(expected = "propagation requires a registered model")]
fn propagation_before_registration_is_a_programmer_error() {
    let mut solver = TestSolver::default();
    let x = solver.new_variable(0, 10);

    let mut propagator = LinearProgrammingPropagator::new(ScriptedLinearSolver::default());
    let row = propagator.create_new_constraint(0.0, 5.0);
    propagator.set_coefficient(row, x, 1.0);

    let _ = solver.propagate(&mut propagator);
}
