//! Contains the propagator implementations of this crate.
//!
//! See [`crate::engine::propagation`] for the interface through which the
//! search engine drives them.

mod linear_programming;

pub use linear_programming::LinearProgrammingPropagator;
