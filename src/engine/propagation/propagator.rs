use downcast_rs::impl_downcast;
use downcast_rs::Downcast;

use super::LocalId;
use super::PropagationContextMut;
use crate::basic_types::PropagationStatusCP;
use crate::statistics::StatisticLogger;

// The engine stores propagators as `Box<dyn Propagator>`; downcasting is how
// it recovers a concrete propagator when it needs one.
impl_downcast!(Propagator);

/// The capability interface through which the discrete search engine drives a
/// propagator. A deliberately small surface: one full-strength entry point
/// and one incremental entry point, invoked polymorphically by the watcher
/// dispatch.
pub trait Propagator: Downcast {
    /// The name of the propagator; a convenience for logging.
    fn name(&self) -> &str;

    /// Extend the current partial assignment with inferred bound changes.
    ///
    /// Returns [`Result::Err`] with an
    /// [`Inconsistency`](crate::basic_types::Inconsistency) exactly when the
    /// propagator found the current state to be inconsistent; the attached
    /// conjunction is the explanation the engine resolves the conflict with.
    /// An inconclusive round (e.g. a time limit hit) is `Ok(())` with no
    /// deductions.
    fn propagate(&mut self, context: &mut PropagationContextMut<'_>) -> PropagationStatusCP;

    /// Called when the bounds of watched variables changed since the last
    /// propagation; `watch_indices` are the [`LocalId`]s registered for those
    /// variables. Implementations may use cheaper incremental reasoning, and
    /// by default fall back to a full [`Propagator::propagate`].
    fn incremental_propagate(
        &mut self,
        context: &mut PropagationContextMut<'_>,
        _watch_indices: &[LocalId],
    ) -> PropagationStatusCP {
        self.propagate(context)
    }

    /// The priority of the propagator; lower values propagate first. Cheap
    /// propagators should use low values so expensive ones (such as an LP
    /// solve) run on an already-filtered state.
    fn priority(&self) -> u32 {
        3
    }

    /// Logs statistics of the propagator using the provided
    /// [`StatisticLogger`].
    fn log_statistics(&self, _statistic_logger: StatisticLogger) {}
}
