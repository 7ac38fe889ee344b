//! This module exposes helpers that aid testing of propagators. The
//! [`TestSolver`] stands in for the discrete search engine: it owns a simple
//! bound store and a recording watcher, and drives the propagation entry
//! points directly. The [`ScriptedLinearSolver`] stands in for the external
//! simplex: it replays prepared solve results and counts solve calls, which
//! is how tests pin down when a solve was (not) performed.

use std::cell::Cell;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::basic_types::PropagationStatusCP;
use crate::basic_types::PropositionalConjunction;
use crate::containers::KeyedVec;
use crate::engine::bound_store::BoundStore;
use crate::engine::bound_store::EmptyDomain;
use crate::engine::domain_events::DomainEvents;
use crate::engine::predicates::Predicate;
use crate::engine::propagation::LocalId;
use crate::engine::propagation::PropagationContextMut;
use crate::engine::propagation::Propagator;
use crate::engine::propagation::VariableWatcher;
use crate::engine::termination::Indefinite;
use crate::engine::termination::TerminationCondition;
use crate::engine::variables::IntegerVariable;
use crate::lp::ColIndex;
use crate::lp::LinearProgram;
use crate::lp::LinearSolver;
use crate::lp::LpSolution;
use crate::lp::LpStatus;
use crate::lp::RowIndex;

/// A container for variables and their bounds, which can be used to test
/// propagators.
#[derive(Debug, Default)]
pub(crate) struct TestSolver {
    pub(crate) bounds: SimpleBoundStore,
    pub(crate) watcher: RecordingWatcher,
    termination: Indefinite,
}

impl TestSolver {
    pub(crate) fn new_variable(&mut self, lower_bound: i32, upper_bound: i32) -> IntegerVariable {
        self.bounds.grow(lower_bound, upper_bound)
    }

    pub(crate) fn lower_bound(&self, variable: IntegerVariable) -> i32 {
        self.bounds.lower_bound(variable)
    }

    pub(crate) fn upper_bound(&self, variable: IntegerVariable) -> i32 {
        self.bounds.upper_bound(variable)
    }

    /// Tighten a bound directly, as a search decision would (no reason).
    pub(crate) fn tighten_upper_bound(&mut self, variable: IntegerVariable, bound: i32) {
        let entry = &mut self.bounds.bounds[variable.index() as usize];
        assert!(bound < entry.1, "tightening must strictly reduce the bound");
        entry.1 = bound;
    }

    pub(crate) fn tighten_lower_bound(&mut self, variable: IntegerVariable, bound: i32) {
        let entry = &mut self.bounds.bounds[variable.index() as usize];
        assert!(bound > entry.0, "tightening must strictly raise the bound");
        entry.0 = bound;
    }

    pub(crate) fn propagate(&mut self, propagator: &mut dyn Propagator) -> PropagationStatusCP {
        let mut context = PropagationContextMut::new(&mut self.bounds, &mut self.termination);
        propagator.propagate(&mut context)
    }

    pub(crate) fn incremental_propagate(
        &mut self,
        propagator: &mut dyn Propagator,
        watch_indices: &[LocalId],
    ) -> PropagationStatusCP {
        let mut context = PropagationContextMut::new(&mut self.bounds, &mut self.termination);
        propagator.incremental_propagate(&mut context, watch_indices)
    }

    pub(crate) fn assert_bounds(
        &self,
        variable: IntegerVariable,
        lower_bound: i32,
        upper_bound: i32,
    ) {
        assert_eq!(
            (self.lower_bound(variable), self.upper_bound(variable)),
            (lower_bound, upper_bound),
            "bounds of {variable} differ from the expected bounds",
        );
    }

    /// The reason recorded for the latest deduction of `predicate`.
    pub(crate) fn get_reason(&self, predicate: Predicate) -> PropositionalConjunction {
        self.bounds
            .deductions
            .iter()
            .rev()
            .find(|(deduced, _)| *deduced == predicate)
            .map(|(_, reason)| reason.clone())
            .unwrap_or_else(|| panic!("no deduction was recorded for {predicate}"))
    }

    pub(crate) fn number_of_deductions(&self) -> usize {
        self.bounds.deductions.len()
    }
}

/// A plain bound store: one `(lb, ub)` pair per variable plus a log of the
/// deductions applied through it.
#[derive(Debug, Default)]
pub(crate) struct SimpleBoundStore {
    bounds: Vec<(i32, i32)>,
    deductions: Vec<(Predicate, PropositionalConjunction)>,
}

impl SimpleBoundStore {
    fn grow(&mut self, lower_bound: i32, upper_bound: i32) -> IntegerVariable {
        let variable = IntegerVariable::from_index(self.bounds.len() as u32);
        self.bounds.push((lower_bound, upper_bound));
        variable
    }
}

impl BoundStore for SimpleBoundStore {
    fn lower_bound(&self, variable: IntegerVariable) -> i32 {
        self.bounds[variable.index() as usize].0
    }

    fn upper_bound(&self, variable: IntegerVariable) -> i32 {
        self.bounds[variable.index() as usize].1
    }

    fn set_lower_bound(
        &mut self,
        variable: IntegerVariable,
        bound: i32,
        reason: PropositionalConjunction,
    ) -> Result<(), EmptyDomain> {
        let entry = &mut self.bounds[variable.index() as usize];
        if bound > entry.1 {
            return Err(EmptyDomain);
        }
        if bound > entry.0 {
            entry.0 = bound;
            self.deductions.push((
                Predicate::LowerBound {
                    variable,
                    lower_bound: bound,
                },
                reason,
            ));
        }
        Ok(())
    }

    fn set_upper_bound(
        &mut self,
        variable: IntegerVariable,
        bound: i32,
        reason: PropositionalConjunction,
    ) -> Result<(), EmptyDomain> {
        let entry = &mut self.bounds[variable.index() as usize];
        if bound < entry.0 {
            return Err(EmptyDomain);
        }
        if bound < entry.1 {
            entry.1 = bound;
            self.deductions.push((
                Predicate::UpperBound {
                    variable,
                    upper_bound: bound,
                },
                reason,
            ));
        }
        Ok(())
    }
}

/// Records the subscriptions made during propagator registration.
#[derive(Debug, Default)]
pub(crate) struct RecordingWatcher {
    pub(crate) watches: Vec<(IntegerVariable, DomainEvents, LocalId)>,
}

impl VariableWatcher for RecordingWatcher {
    fn watch_variable(
        &mut self,
        variable: IntegerVariable,
        events: DomainEvents,
        local_id: LocalId,
    ) {
        self.watches.push((variable, events, local_id));
    }
}

/// A [`LinearSolver`] double which replays prepared [`LpSolution`]s in order.
///
/// All clones share the same script, solve counter, and solved-program log,
/// so a test keeps a clone as its handle after moving the solver into a
/// propagator. A solve without a prepared result panics.
#[derive(Debug, Default, Clone)]
pub(crate) struct ScriptedLinearSolver {
    script: Rc<RefCell<VecDeque<LpSolution>>>,
    number_of_solves: Rc<Cell<u64>>,
    solved_programs: Rc<RefCell<Vec<LinearProgram>>>,
}

impl ScriptedLinearSolver {
    pub(crate) fn enqueue(&self, solution: LpSolution) {
        self.script.borrow_mut().push_back(solution);
    }

    pub(crate) fn number_of_solves(&self) -> u64 {
        self.number_of_solves.get()
    }

    /// The program as the solver saw it on the latest solve.
    pub(crate) fn last_program(&self) -> LinearProgram {
        self.solved_programs
            .borrow()
            .last()
            .expect("no solve has happened")
            .clone()
    }
}

impl LinearSolver for ScriptedLinearSolver {
    fn solve(
        &mut self,
        program: &LinearProgram,
        termination: &mut dyn TerminationCondition,
    ) -> LpSolution {
        if termination.should_stop() {
            return LpSolution::inconclusive();
        }
        self.number_of_solves.set(self.number_of_solves.get() + 1);
        self.solved_programs.borrow_mut().push(program.clone());
        self.script
            .borrow_mut()
            .pop_front()
            .expect("a solve happened without a scripted result")
    }
}

/// An optimal [`LpSolution`] over `program`'s columns; values and reduced
/// costs which are not listed are zero.
pub(crate) fn optimal_solution(
    program: &LinearProgram,
    objective_value: f64,
    primal_values: &[(ColIndex, f64)],
    reduced_costs: &[(ColIndex, f64)],
) -> LpSolution {
    let mut primal: KeyedVec<ColIndex, f64> = KeyedVec::default();
    primal.resize(program.num_columns(), 0.0);
    for &(column, value) in primal_values {
        primal[column] = value;
    }
    let mut costs: KeyedVec<ColIndex, f64> = KeyedVec::default();
    costs.resize(program.num_columns(), 0.0);
    for &(column, value) in reduced_costs {
        costs[column] = value;
    }
    LpSolution {
        status: LpStatus::Optimal,
        objective_value,
        primal_values: primal,
        reduced_costs: costs,
        dual_ray: None,
    }
}

/// A dual-unbounded (primal infeasible) [`LpSolution`] certified by the given
/// ray; weights which are not listed are zero.
pub(crate) fn infeasible_solution(
    program: &LinearProgram,
    ray_weights: &[(RowIndex, f64)],
) -> LpSolution {
    let mut dual_ray: KeyedVec<RowIndex, f64> = KeyedVec::default();
    dual_ray.resize(program.num_rows(), 0.0);
    for &(row, weight) in ray_weights {
        dual_ray[row] = weight;
    }
    LpSolution {
        status: LpStatus::DualUnbounded,
        objective_value: 0.0,
        primal_values: KeyedVec::default(),
        reduced_costs: KeyedVec::default(),
        dual_ray: Some(dual_ray),
    }
}
