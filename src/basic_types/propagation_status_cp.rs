use crate::basic_types::PropositionalConjunction;
use crate::engine::EmptyDomain;

/// The result of invoking a constraint programming propagator. The propagation
/// can either succeed or identify a conflict. The necessary conditions for the
/// conflict must be captured in the error variant, i.e. a propositional
/// conjunction.
pub type PropagationStatusCP = Result<(), Inconsistency>;

/// A conflict identified by a propagator, justified by the conjunction of
/// bound predicates under which the conflict arises.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PropagatorConflict {
    pub conjunction: PropositionalConjunction,
}

impl From<PropositionalConjunction> for PropagatorConflict {
    fn from(conjunction: PropositionalConjunction) -> Self {
        PropagatorConflict { conjunction }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Inconsistency {
    /// A deduction was applied which left a variable with an empty domain.
    EmptyDomain,
    /// The propagator identified the current bounds to be inconsistent.
    Conflict(PropagatorConflict),
}

impl From<EmptyDomain> for Inconsistency {
    fn from(_: EmptyDomain) -> Self {
        Inconsistency::EmptyDomain
    }
}

impl From<PropositionalConjunction> for Inconsistency {
    fn from(conflict_reason: PropositionalConjunction) -> Self {
        Inconsistency::Conflict(conflict_reason.into())
    }
}

impl From<PropagatorConflict> for Inconsistency {
    fn from(conflict: PropagatorConflict) -> Self {
        Inconsistency::Conflict(conflict)
    }
}
