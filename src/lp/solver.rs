use super::ColIndex;
use super::LinearProgram;
use super::RowIndex;
use crate::containers::KeyedVec;
use crate::engine::termination::TerminationCondition;

/// Terminal status of an LP solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LpStatus {
    /// An optimal solution was found; primal values, reduced costs and the
    /// objective value are available.
    Optimal,
    /// The program was proven primal infeasible.
    Infeasible,
    /// The dual was proven unbounded, which certifies primal infeasibility
    /// through the dual ray.
    DualUnbounded,
    /// The solve was abandoned (time limit, iteration limit, numerical
    /// trouble); nothing can be concluded from it.
    Inconclusive,
}

/// The output of a [`LinearSolver::solve`] call.
///
/// For an [`LpStatus::Optimal`] result, `primal_values` and `reduced_costs`
/// hold one entry per column of the solved program and `objective_value` is
/// the attained minimum. For [`LpStatus::Infeasible`] and
/// [`LpStatus::DualUnbounded`], `dual_ray` should carry an infeasibility
/// certificate when the solver can produce one; without a certificate the
/// infeasibility is treated as inconclusive by this crate.
///
/// The dual ray convention: one weight per row, such that combining the rows
/// with these weights yields per-column coefficients
/// `c_j = sum_r ray_r * a_rj` and a combined bound
/// `d = sum_r (if ray_r > 0 { ray_r * ub_r } else { ray_r * lb_r })`, and the
/// implied valid inequality `sum_j c_j x_j <= d` is violated by every `x`
/// within the current column bounds (its minimum over the bounds exceeds
/// `d`). Only weights selecting a finite row bound may be nonzero.
#[derive(Debug, Clone)]
pub struct LpSolution {
    pub status: LpStatus,
    /// The attained objective value; meaningful only for
    /// [`LpStatus::Optimal`].
    pub objective_value: f64,
    pub primal_values: KeyedVec<ColIndex, f64>,
    pub reduced_costs: KeyedVec<ColIndex, f64>,
    pub dual_ray: Option<KeyedVec<RowIndex, f64>>,
}

impl LpSolution {
    /// A solution carrying no information at all.
    pub fn inconclusive() -> LpSolution {
        LpSolution {
            status: LpStatus::Inconclusive,
            objective_value: 0.0,
            primal_values: KeyedVec::default(),
            reduced_costs: KeyedVec::default(),
            dual_ray: None,
        }
    }
}

/// An external continuous solver, consumed as an opaque service.
///
/// Implementations minimise the program's objective subject to its rows and
/// column bounds. They are expected to poll `termination` during the solve
/// and return [`LpStatus::Inconclusive`] when it triggers; the caller treats
/// an abandoned solve as "no information this round". Implementations report
/// infeasibility only when the program remains infeasible under a small
/// relative relaxation of the bounds, so downstream filtering under-filters
/// rather than over-filters on the margin.
pub trait LinearSolver: std::fmt::Debug {
    fn solve(
        &mut self,
        program: &LinearProgram,
        termination: &mut dyn TerminationCondition,
    ) -> LpSolution;
}
