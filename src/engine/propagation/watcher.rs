use super::LocalId;
use crate::engine::domain_events::DomainEvents;
use crate::engine::variables::IntegerVariable;

/// The engine's watched-variable registration service.
///
/// A propagator subscribes each variable it wants to be re-invoked for
/// exactly once, at registration time. The engine is then responsible for
/// calling
/// [`Propagator::incremental_propagate`](super::Propagator::incremental_propagate)
/// with the [`LocalId`]s of the variables whose bounds changed.
pub trait VariableWatcher {
    /// Subscribe the given propagator-local id to `events` on `variable`.
    fn watch_variable(&mut self, variable: IntegerVariable, events: DomainEvents, local_id: LocalId);
}
