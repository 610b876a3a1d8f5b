//! Linear programming layer for quasiconvex L∞ problems.
//!
//! The crate is organised around three pieces:
//! - a passive problem model ([`LpConstraints`], dense or sparse),
//! - the [`LpSolver`] capability with exchangeable backends selected at
//!   runtime through [`SolverKind`],
//! - drivers that combine a solver with a constraint builder: [`bisect`] for
//!   builders parameterised by a scalar bound and [`solve_once`] for builders
//!   that carry the bound as an LP variable.
//!
//! ```no_run
//! use linf_lp::{make_solver, DenseConstraints, Relation, SolverKind};
//!
//! // maximize x + y subject to x + 2y <= 4, x <= 3, x, y >= 0
//! let mut lp = DenseConstraints::new(2, 2);
//! lp.set_row(0, &[(0, 1.0), (1, 2.0)], Relation::LessOrEqual, 4.0);
//! lp.set_row(1, &[(0, 1.0)], Relation::LessOrEqual, 3.0);
//! lp.bounds.fill(linf_lp::VarBounds::non_negative());
//! lp.set_objective(linf_lp::Direction::Maximize, vec![1.0, 1.0]);
//!
//! let mut solver = make_solver(SolverKind::MiniLp, 2);
//! solver.setup(&lp).unwrap();
//! assert!(solver.solve().is_feasible());
//! let mut x = [0.0; 2];
//! solver.solution(&mut x).unwrap();
//! ```

pub mod backend;
pub mod bisection;
pub mod error;
pub mod problem;
pub mod solver;

pub use backend::{make_solver, MiniLpSolver, SolverKind};
pub use bisection::{bisect, BisectionOptions, BisectionReport, BoundedConstraintBuilder};
pub use error::{BuildError, LpError, SolveError};
pub use problem::*;
pub use solver::{solve_once, ConstraintBuilder, LpSolver, SolveStatus};
