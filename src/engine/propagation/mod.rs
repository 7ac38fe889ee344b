//! The propagation interface between the discrete search engine and the
//! propagators in this crate: the [`Propagator`] capability trait invoked
//! polymorphically by the engine, the contexts through which a propagator
//! reads and writes variable bounds, and the [`VariableWatcher`] through
//! which it subscribes to bound changes.

mod local_id;
mod propagation_context;
mod propagator;
mod watcher;

pub use local_id::LocalId;
pub use propagation_context::PropagationContext;
pub use propagation_context::PropagationContextMut;
pub use propagator::Propagator;
pub use watcher::VariableWatcher;
