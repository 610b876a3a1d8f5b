use crate::solver::SolveStatus;
use thiserror::Error;

/// Violations of the LP model or solver contract.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LpError {
    #[error("{what} has {got} entries, expected {expected}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("problem has {got} variables but the solver is configured for {expected}")]
    ParamCountMismatch { expected: usize, got: usize },
    #[error("variable {index} has invalid bounds [{lower}, {upper}]")]
    InvalidBounds { index: usize, lower: f64, upper: f64 },
    #[error("non-finite value in {what}")]
    NonFinite { what: &'static str },
    #[error("no problem has been set up")]
    NotSetUp,
    #[error("no solution available")]
    NoSolution,
}

/// Malformed input handed to a constraint builder.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    #[error("{what}: expected {expected}, got {got}")]
    SizeMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("need at least {min} {what}, got {got}")]
    TooFew {
        what: &'static str,
        min: usize,
        got: usize,
    },
    #[error("{what} index {index} out of range (limit {limit})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        limit: usize,
    },
    #[error("invalid input: {0}")]
    Invalid(String),
}

/// Failures of the solve drivers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolveError {
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Lp(#[from] LpError),
    #[error("invalid driver options: {0}")]
    InvalidOptions(String),
    #[error("upper bound {gamma_high} is not feasible ({status})")]
    InfeasibleBracket { gamma_high: f64, status: SolveStatus },
    #[error("linear program not solved ({0})")]
    Unsolved(SolveStatus),
}
