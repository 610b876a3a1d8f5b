//! Bisection over a scalar L∞ bound.
//!
//! Quasiconvex problems become linear once the error bound `gamma` is fixed:
//! the set of parameters reaching residual `<= gamma` is a polyhedron. The
//! driver searches the smallest feasible `gamma` by bisecting a caller
//! supplied bracket `[gamma_low, gamma_high]`, using LP feasibility as the
//! oracle at each candidate. The upper end is tested first so an infeasible
//! bracket fails immediately instead of running the whole iteration budget.

use crate::error::{BuildError, LpError, SolveError};
use crate::problem::{ConstraintMatrix, LpConstraints};
use crate::solver::{LpSolver, SolveStatus};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Builder producing constraints for a fixed bound `gamma`.
///
/// Implementations are read-only with respect to their input, so one builder
/// serves every bisection step.
pub trait BoundedConstraintBuilder {
    type Matrix: ConstraintMatrix;

    /// Number of LP variables of every built problem.
    fn num_params(&self) -> usize;

    fn build(&self, gamma: f64) -> Result<LpConstraints<Self::Matrix>, BuildError>;
}

/// Bisection configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BisectionOptions {
    /// Lower end of the bracket (assumed infeasible or exact).
    pub gamma_low: f64,
    /// Upper end of the bracket; must be feasible.
    pub gamma_high: f64,
    /// Stop once `gamma_high - gamma_low <= tolerance`.
    pub tolerance: f64,
    /// Maximum number of bisection steps after the initial check.
    pub max_iterations: usize,
    /// Optional wall-clock budget in seconds for the whole search.
    pub time_budget_secs: Option<f64>,
}

impl Default for BisectionOptions {
    fn default() -> Self {
        Self {
            gamma_low: 0.0,
            gamma_high: 1.0,
            tolerance: 1e-8,
            max_iterations: 20,
            time_budget_secs: None,
        }
    }
}

impl BisectionOptions {
    pub fn with_bracket(gamma_low: f64, gamma_high: f64) -> Self {
        Self {
            gamma_low,
            gamma_high,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), SolveError> {
        let invalid = |msg: String| Err(SolveError::InvalidOptions(msg));
        if !(self.gamma_low.is_finite() && self.gamma_high.is_finite()) {
            return invalid("bracket must be finite".into());
        }
        if self.gamma_low < 0.0 || self.gamma_low >= self.gamma_high {
            return invalid(format!(
                "bracket must satisfy 0 <= low < high, got [{}, {}]",
                self.gamma_low, self.gamma_high
            ));
        }
        if !(self.tolerance > 0.0) {
            return invalid(format!("tolerance must be positive, got {}", self.tolerance));
        }
        if let Some(secs) = self.time_budget_secs {
            if Duration::try_from_secs_f64(secs).is_err() {
                return invalid(format!(
                    "time budget must be a non-negative number of seconds, got {secs}"
                ));
            }
        }
        Ok(())
    }

    fn time_budget(&self) -> Option<Duration> {
        self.time_budget_secs
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }
}

/// Summary of a bisection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BisectionReport {
    /// Tightest feasible bound found; the returned solution belongs to it.
    pub gamma: f64,
    /// Largest bound known (or assumed) to be infeasible.
    pub lower: f64,
    /// Bisection steps performed after the initial check.
    pub iterations: usize,
    /// Total LP solves, including the initial check.
    pub solves: usize,
    /// `true` when the bracket shrank below the tolerance.
    pub converged: bool,
}

/// Find the smallest feasible bound and write its solution into `solution`.
///
/// `solution` must hold `builder.num_params()` values. On success it contains
/// the LP solution at [`BisectionReport::gamma`].
///
/// # Errors
///
/// - [`SolveError::InvalidOptions`] for a malformed bracket,
/// - [`SolveError::InfeasibleBracket`] if `gamma_high` is not feasible,
/// - [`SolveError::Build`] / [`SolveError::Lp`] for malformed input.
pub fn bisect<S, B>(
    solver: &mut S,
    builder: &B,
    opts: &BisectionOptions,
    solution: &mut [f64],
) -> Result<BisectionReport, SolveError>
where
    S: LpSolver + ?Sized,
    B: BoundedConstraintBuilder + ?Sized,
{
    opts.validate()?;
    if solution.len() != builder.num_params() {
        return Err(LpError::DimensionMismatch {
            what: "solution buffer",
            expected: builder.num_params(),
            got: solution.len(),
        }
        .into());
    }

    let start = Instant::now();
    let budget = opts.time_budget();
    let mut low = opts.gamma_low;
    let mut high = opts.gamma_high;

    let status = feasibility(solver, builder, high)?;
    if !status.is_feasible() {
        warn!("{}: upper bound {high} is {status}", solver.name());
        return Err(SolveError::InfeasibleBracket {
            gamma_high: high,
            status,
        });
    }
    solver.solution(solution)?;

    let mut iterations = 0;
    while iterations < opts.max_iterations && high - low > opts.tolerance {
        if budget.is_some_and(|b| start.elapsed() >= b) {
            warn!("bisection stopped by time budget after {iterations} steps");
            break;
        }

        let gamma = 0.5 * (low + high);
        let status = feasibility(solver, builder, gamma)?;
        iterations += 1;
        if status.is_feasible() {
            high = gamma;
            solver.solution(solution)?;
            debug!(
                "{iterations}/{}: gamma {gamma:.3e} feasible, width {:.3e}",
                opts.max_iterations,
                high - low
            );
        } else {
            low = gamma;
            debug!(
                "{iterations}/{}: gamma {gamma:.3e} {status}",
                opts.max_iterations
            );
        }
    }

    let converged = high - low <= opts.tolerance;
    info!(
        "bisection finished: gamma {high:.3e} after {iterations} steps ({:.1} ms, converged: {converged})",
        start.elapsed().as_secs_f64() * 1e3
    );
    Ok(BisectionReport {
        gamma: high,
        lower: low,
        iterations,
        solves: iterations + 1,
        converged,
    })
}

fn feasibility<S, B>(solver: &mut S, builder: &B, gamma: f64) -> Result<SolveStatus, SolveError>
where
    S: LpSolver + ?Sized,
    B: BoundedConstraintBuilder + ?Sized,
{
    let constraints = builder.build(gamma)?;
    solver.setup(&constraints)?;
    Ok(solver.solve())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{DenseConstraints, LinearProgram, Relation};
    use crate::MiniLpSolver;

    /// Oracle solver: feasible iff the encoded bound reaches `threshold`.
    struct ThresholdSolver {
        threshold: f64,
        gamma: Option<f64>,
        solved: Option<f64>,
        solves: usize,
    }

    impl ThresholdSolver {
        fn new(threshold: f64) -> Self {
            Self {
                threshold,
                gamma: None,
                solved: None,
                solves: 0,
            }
        }
    }

    impl LpSolver for ThresholdSolver {
        fn name(&self) -> &'static str {
            "threshold"
        }

        fn num_params(&self) -> usize {
            1
        }

        fn setup(&mut self, problem: &dyn LinearProgram) -> Result<(), LpError> {
            problem.validate()?;
            self.gamma = Some(problem.rhs()[0]);
            Ok(())
        }

        fn solve(&mut self) -> SolveStatus {
            self.solves += 1;
            match self.gamma {
                Some(g) if g >= self.threshold => {
                    self.solved = Some(g);
                    SolveStatus::Optimal
                }
                Some(_) => SolveStatus::Infeasible,
                None => SolveStatus::Failed,
            }
        }

        fn solution(&self, out: &mut [f64]) -> Result<(), LpError> {
            out[0] = self.solved.ok_or(LpError::NoSolution)?;
            Ok(())
        }

        fn objective_value(&self) -> Option<f64> {
            None
        }
    }

    /// `x <= gamma` together with `x >= 0.3`: feasible iff gamma >= 0.3.
    struct Interval;

    impl BoundedConstraintBuilder for Interval {
        type Matrix = nalgebra::DMatrix<f64>;

        fn num_params(&self) -> usize {
            1
        }

        fn build(&self, gamma: f64) -> Result<DenseConstraints, BuildError> {
            let mut lp = DenseConstraints::new(2, 1);
            lp.set_row(0, &[(0, 1.0)], Relation::LessOrEqual, gamma);
            lp.set_row(1, &[(0, 1.0)], Relation::GreaterOrEqual, 0.3);
            Ok(lp)
        }
    }

    #[test]
    fn converges_to_threshold() {
        let mut solver = ThresholdSolver::new(0.3);
        let opts = BisectionOptions {
            max_iterations: 100,
            tolerance: 1e-6,
            ..BisectionOptions::default()
        };
        let mut x = [0.0];
        let report = bisect(&mut solver, &Interval, &opts, &mut x).unwrap();

        assert!(report.converged);
        assert!(report.gamma >= 0.3);
        assert!(report.gamma - report.lower <= 1e-6);
        assert!(report.gamma - 0.3 <= 1e-6);
        assert_eq!(x[0], report.gamma);
        assert_eq!(report.solves, solver.solves);
    }

    #[test]
    fn iteration_cap_is_respected() {
        let mut solver = ThresholdSolver::new(0.3);
        let opts = BisectionOptions {
            max_iterations: 5,
            ..BisectionOptions::default()
        };
        let mut x = [0.0];
        let report = bisect(&mut solver, &Interval, &opts, &mut x).unwrap();

        assert_eq!(report.iterations, 5);
        assert_eq!(solver.solves, 6);
        assert!(!report.converged);
        assert!((report.gamma - report.lower - 1.0 / 32.0).abs() < 1e-12);
        assert!(report.lower < 0.3 && 0.3 <= report.gamma);
    }

    #[test]
    fn infeasible_bracket_fails_fast() {
        let mut solver = ThresholdSolver::new(2.0);
        let mut x = [0.0];
        let err = bisect(&mut solver, &Interval, &BisectionOptions::default(), &mut x).unwrap_err();

        assert!(matches!(
            err,
            SolveError::InfeasibleBracket {
                status: SolveStatus::Infeasible,
                ..
            }
        ));
        assert_eq!(solver.solves, 1);
    }

    #[test]
    fn invalid_bracket_is_rejected() {
        let mut solver = ThresholdSolver::new(0.3);
        let mut x = [0.0];
        let opts = BisectionOptions::with_bracket(1.0, 0.5);
        assert!(matches!(
            bisect(&mut solver, &Interval, &opts, &mut x),
            Err(SolveError::InvalidOptions(_))
        ));
        assert_eq!(solver.solves, 0);
    }

    #[test]
    fn buffer_size_is_checked() {
        let mut solver = ThresholdSolver::new(0.3);
        let mut x = [0.0; 2];
        assert!(matches!(
            bisect(&mut solver, &Interval, &BisectionOptions::default(), &mut x),
            Err(SolveError::Lp(LpError::DimensionMismatch { .. }))
        ));
    }

    #[test]
    fn zero_time_budget_keeps_initial_solution() {
        let mut solver = ThresholdSolver::new(0.3);
        let opts = BisectionOptions {
            time_budget_secs: Some(0.0),
            ..BisectionOptions::default()
        };
        let mut x = [0.0];
        let report = bisect(&mut solver, &Interval, &opts, &mut x).unwrap();
        assert_eq!(report.iterations, 0);
        assert_eq!(report.gamma, 1.0);
        assert_eq!(x[0], 1.0);
    }

    #[test]
    fn oversized_time_budget_is_rejected() {
        let mut solver = ThresholdSolver::new(0.3);
        let mut x = [0.0];
        for secs in [1e30, f64::INFINITY, f64::NAN, -1.0] {
            let opts = BisectionOptions {
                time_budget_secs: Some(secs),
                ..BisectionOptions::default()
            };
            assert!(opts.validate().is_err(), "{secs} accepted");
            assert!(matches!(
                bisect(&mut solver, &Interval, &opts, &mut x),
                Err(SolveError::InvalidOptions(_))
            ));
        }
        assert_eq!(solver.solves, 0);
    }

    #[test]
    fn works_with_real_backend() {
        let mut solver = MiniLpSolver::new(1);
        let mut x = [0.0];
        let report = bisect(&mut solver, &Interval, &BisectionOptions::default(), &mut x).unwrap();
        assert!(report.gamma >= 0.3 - 1e-6);
        assert!(report.gamma - 0.3 < 1e-5);
        assert!(x[0] >= 0.3 - 1e-6 && x[0] <= report.gamma + 1e-6);
    }
}
