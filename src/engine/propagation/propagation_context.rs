use crate::basic_types::PropositionalConjunction;
use crate::engine::bound_store::BoundStore;
use crate::engine::bound_store::EmptyDomain;
use crate::engine::termination::TerminationCondition;
use crate::engine::variables::IntegerVariable;

/// Read-only view of the current variable bounds, passed to propagators for
/// bound queries. Negated handles are transparently reflected onto their
/// positive counterpart.
#[derive(Clone, Copy)]
pub struct PropagationContext<'a> {
    store: &'a dyn BoundStore,
}

impl<'a> PropagationContext<'a> {
    pub fn new(store: &'a dyn BoundStore) -> Self {
        PropagationContext { store }
    }

    pub fn lower_bound(&self, variable: IntegerVariable) -> i32 {
        lower_bound(self.store, variable)
    }

    pub fn upper_bound(&self, variable: IntegerVariable) -> i32 {
        upper_bound(self.store, variable)
    }
}

/// Mutable view of the search state, passed to propagators during
/// propagation. It is the only point of communication between a propagator
/// and the engine: bound reads, deduction writes (with attached reasons), and
/// the cooperative termination check all go through here.
pub struct PropagationContextMut<'a> {
    store: &'a mut dyn BoundStore,
    termination: &'a mut dyn TerminationCondition,
}

impl<'a> PropagationContextMut<'a> {
    pub fn new(
        store: &'a mut dyn BoundStore,
        termination: &'a mut dyn TerminationCondition,
    ) -> Self {
        PropagationContextMut { store, termination }
    }

    pub fn as_readonly(&self) -> PropagationContext<'_> {
        PropagationContext { store: self.store }
    }

    pub fn lower_bound(&self, variable: IntegerVariable) -> i32 {
        lower_bound(self.store, variable)
    }

    pub fn upper_bound(&self, variable: IntegerVariable) -> i32 {
        upper_bound(self.store, variable)
    }

    /// Tighten the lower bound of `variable` and record `reason` for it.
    pub fn set_lower_bound(
        &mut self,
        variable: IntegerVariable,
        bound: i32,
        reason: PropositionalConjunction,
    ) -> Result<(), EmptyDomain> {
        if variable.is_positive() {
            self.store.set_lower_bound(variable, bound, reason)
        } else {
            self.store
                .set_upper_bound(variable.negated(), -bound, reason)
        }
    }

    /// Tighten the upper bound of `variable` and record `reason` for it.
    pub fn set_upper_bound(
        &mut self,
        variable: IntegerVariable,
        bound: i32,
        reason: PropositionalConjunction,
    ) -> Result<(), EmptyDomain> {
        if variable.is_positive() {
            self.store.set_upper_bound(variable, bound, reason)
        } else {
            self.store
                .set_lower_bound(variable.negated(), -bound, reason)
        }
    }

    /// The cooperative termination condition, polled before and during
    /// expensive work such as an LP solve.
    pub fn termination(&mut self) -> &mut dyn TerminationCondition {
        self.termination
    }
}

fn lower_bound(store: &dyn BoundStore, variable: IntegerVariable) -> i32 {
    if variable.is_positive() {
        store.lower_bound(variable)
    } else {
        -store.upper_bound(variable.negated())
    }
}

fn upper_bound(store: &dyn BoundStore, variable: IntegerVariable) -> i32 {
    if variable.is_positive() {
        store.upper_bound(variable)
    } else {
        -store.lower_bound(variable.negated())
    }
}
