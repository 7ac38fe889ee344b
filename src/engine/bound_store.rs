use thiserror::Error;

use crate::basic_types::PropositionalConjunction;
use crate::engine::variables::IntegerVariable;

/// Error returned by a deduction which would leave a variable with an empty
/// domain, i.e. the new bound crosses an already-fixed opposite bound. The
/// bound store reports it; the propagation step converts it into an
/// [`Inconsistency`](crate::basic_types::Inconsistency).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("a deduction left a variable with an empty domain")]
pub struct EmptyDomain;

/// The discrete search engine's trail of variable bounds.
///
/// This crate never owns variable domains; it reads bounds from, and writes
/// deductions into, an implementation of this trait supplied by the
/// surrounding engine. All methods take positive-orientation handles;
/// negated handles are normalised by the
/// [contexts](crate::engine::propagation::PropagationContext) before they
/// reach the store.
///
/// A deduction write must atomically tighten the bound and record the given
/// reason so that the engine can later replay it during conflict analysis.
/// Writes which do not strictly tighten the current bound must be ignored by
/// the implementation; the propagators in this crate do not emit them.
pub trait BoundStore {
    fn lower_bound(&self, variable: IntegerVariable) -> i32;

    fn upper_bound(&self, variable: IntegerVariable) -> i32;

    fn set_lower_bound(
        &mut self,
        variable: IntegerVariable,
        bound: i32,
        reason: PropositionalConjunction,
    ) -> Result<(), EmptyDomain>;

    fn set_upper_bound(
        &mut self,
        variable: IntegerVariable,
        bound: i32,
        reason: PropositionalConjunction,
    ) -> Result<(), EmptyDomain>;
}
