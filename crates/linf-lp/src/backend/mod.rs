//! LP backend adapters.
//!
//! Backends translate a [`LinearProgram`](crate::LinearProgram) into their
//! native representation and report a [`SolveStatus`](crate::SolveStatus).
//! The concrete backend is chosen at runtime so drivers and builders stay
//! backend-agnostic.

mod minilp_backend;

use serde::{Deserialize, Serialize};

use crate::solver::LpSolver;

pub use minilp_backend::MiniLpSolver;

/// Supported LP backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverKind {
    /// Pure Rust dense simplex (`minilp`).
    #[default]
    MiniLp,
}

/// Instantiate a backend configured for `num_params` variables.
pub fn make_solver(kind: SolverKind, num_params: usize) -> Box<dyn LpSolver> {
    match kind {
        SolverKind::MiniLp => Box::new(MiniLpSolver::new(num_params)),
    }
}
