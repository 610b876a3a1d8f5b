//! Solver capability shared by all LP backends.
//!
//! A solver is configured for a fixed number of variables, then driven
//! through `setup -> solve -> solution`. Backends must agree on the
//! feasible/infeasible verdict; they may differ in speed and tolerance.

use crate::error::{BuildError, LpError, SolveError};
use crate::problem::{ConstraintMatrix, LinearProgram, LpConstraints};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of one LP solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveStatus {
    /// An optimal (for feasibility problems: any feasible) point was found.
    Optimal,
    Infeasible,
    Unbounded,
    /// Nothing loaded or the backend failed numerically.
    Failed,
}

impl SolveStatus {
    pub fn is_feasible(self) -> bool {
        matches!(self, SolveStatus::Optimal)
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SolveStatus::Optimal => "optimal",
            SolveStatus::Infeasible => "infeasible",
            SolveStatus::Unbounded => "unbounded",
            SolveStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// LP backend interface.
pub trait LpSolver {
    /// Short backend name used in logs.
    fn name(&self) -> &'static str;

    /// Number of variables this instance was configured for.
    fn num_params(&self) -> usize;

    /// Load a problem, replacing any previous one.
    ///
    /// Fails if the problem is inconsistent or its variable count differs from
    /// [`LpSolver::num_params`].
    fn setup(&mut self, problem: &dyn LinearProgram) -> Result<(), LpError>;

    /// Solve the loaded problem.
    fn solve(&mut self) -> SolveStatus;

    /// Copy the last solution into `out` (length `num_params`).
    fn solution(&self, out: &mut [f64]) -> Result<(), LpError>;

    /// Objective value of the last solution, if any.
    fn objective_value(&self) -> Option<f64>;
}

/// Builder producing one LP whose bound is an LP variable.
pub trait ConstraintBuilder {
    type Matrix: ConstraintMatrix;

    fn num_params(&self) -> usize;

    fn build(&self) -> Result<LpConstraints<Self::Matrix>, BuildError>;
}

/// Build, load and solve a single LP, writing the solution into `out`.
///
/// Returns the objective value at the optimum.
pub fn solve_once<S, B>(solver: &mut S, builder: &B, out: &mut [f64]) -> Result<f64, SolveError>
where
    S: LpSolver + ?Sized,
    B: ConstraintBuilder + ?Sized,
{
    let constraints = builder.build()?;
    solver.setup(&constraints)?;
    let status = solver.solve();
    debug!(
        "{}: single LP with {} rows, {} variables -> {status}",
        solver.name(),
        constraints.num_rows(),
        constraints.num_params
    );
    if !status.is_feasible() {
        return Err(SolveError::Unsolved(status));
    }
    solver.solution(out)?;
    solver
        .objective_value()
        .ok_or(SolveError::Lp(LpError::NoSolution))
}

pub(crate) fn copy_solution(src: &[f64], out: &mut [f64]) -> Result<(), LpError> {
    if src.len() != out.len() {
        return Err(LpError::DimensionMismatch {
            what: "solution buffer",
            expected: src.len(),
            got: out.len(),
        });
    }
    out.copy_from_slice(src);
    Ok(())
}
