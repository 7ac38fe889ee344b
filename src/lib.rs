//! # lp-propagation
//!
//! A propagation core that injects a continuous linear-relaxation solver into
//! a discrete (CP-style) search engine. The crate mirrors the search engine's
//! integer variables as continuous columns, accumulates linear inequality
//! rows over them, and turns raw LP solver output into two kinds of
//! machine-checkable information for the search:
//!
//! * **conflicts**: a certificate (dual ray or reduced costs) that no
//!   integer assignment within the current bounds satisfies the rows,
//!   expressed as a [`PropositionalConjunction`] of bound predicates the
//!   search can use for backjumping and learning;
//! * **deductions**: bound tightenings derived from reduced cost
//!   strengthening, each carrying the reason conjunction that justifies it.
//!
//! The simplex itself is not implemented here; it is consumed through the
//! [`lp::LinearSolver`] trait. Likewise the search engine's bound store,
//! watched-variable registration and time limit are injected through the
//! [`engine::BoundStore`], [`engine::propagation::VariableWatcher`] and
//! [`engine::termination::TerminationCondition`] traits.
//!
//! Typical embedding:
//!
//! 1. create a [`propagators::LinearProgrammingPropagator`] around a solver,
//! 2. author rows with [`create_new_constraint`][propagators::LinearProgrammingPropagator::create_new_constraint]
//!    / [`set_coefficient`][propagators::LinearProgrammingPropagator::set_coefficient],
//! 3. freeze the model with [`register_with`][propagators::LinearProgrammingPropagator::register_with],
//! 4. let the watcher drive
//!    [`propagate`][engine::propagation::Propagator::propagate] and
//!    [`incremental_propagate`][engine::propagation::Propagator::incremental_propagate]
//!    for the rest of the search.
//!
//! Per-constraint interval propagation is intentionally absent: reduced-cost
//! filtering and constraint-specific filtering are complementary, and the
//! latter belongs to dedicated propagators.
//!
//! [`PropositionalConjunction`]: basic_types::PropositionalConjunction

pub mod basic_types;
pub mod containers;
pub mod engine;
pub mod lp;
pub mod propagators;
pub mod statistics;

#[doc(hidden)]
pub mod asserts;
