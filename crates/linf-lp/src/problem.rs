//! Passive linear program definitions.
//!
//! A problem is `A x (<=|>=|=) b` row by row, with per-variable bounds and an
//! optional linear objective. An empty cost vector turns the problem into a
//! pure feasibility test, which is how the bisection builders use it.
//!
//! The constraint matrix is generic over [`ConstraintMatrix`]: dense
//! `nalgebra::DMatrix` for small fixed-size systems and `sprs::TriMat`
//! triplets for systems whose size scales with the observation count.

use crate::error::LpError;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use sprs::TriMat;

/// Relation between a constraint row and its right-hand side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Relation {
    LessOrEqual,
    GreaterOrEqual,
    Equal,
}

impl Relation {
    /// Whether `lhs (relation) rhs` holds exactly.
    pub fn holds(self, lhs: f64, rhs: f64) -> bool {
        match self {
            Relation::LessOrEqual => lhs <= rhs,
            Relation::GreaterOrEqual => lhs >= rhs,
            Relation::Equal => lhs == rhs,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Minimize,
    Maximize,
}

/// Lower/upper bound of one variable; infinite values mean unbounded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarBounds {
    pub lower: f64,
    pub upper: f64,
}

impl VarBounds {
    pub const FREE: VarBounds = VarBounds {
        lower: f64::NEG_INFINITY,
        upper: f64::INFINITY,
    };

    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    pub fn non_negative() -> Self {
        Self::new(0.0, f64::INFINITY)
    }

    pub fn fixed(value: f64) -> Self {
        Self::new(value, value)
    }

    pub fn is_valid(&self) -> bool {
        !self.lower.is_nan() && !self.upper.is_nan() && self.lower <= self.upper
    }
}

impl Default for VarBounds {
    fn default() -> Self {
        Self::FREE
    }
}

/// Storage for the constraint matrix `A`.
pub trait ConstraintMatrix {
    fn zeros(nrows: usize, ncols: usize) -> Self
    where
        Self: Sized;
    fn nrows(&self) -> usize;
    fn ncols(&self) -> usize;
    /// Accumulate `value` into entry `(row, col)`.
    fn add_entry(&mut self, row: usize, col: usize, value: f64);
    /// Visit stored entries; repeated coordinates must be summed by the consumer.
    fn for_each_entry(&self, f: &mut dyn FnMut(usize, usize, f64));
}

impl ConstraintMatrix for DMatrix<f64> {
    fn zeros(nrows: usize, ncols: usize) -> Self {
        DMatrix::zeros(nrows, ncols)
    }

    fn nrows(&self) -> usize {
        self.nrows()
    }

    fn ncols(&self) -> usize {
        self.ncols()
    }

    fn add_entry(&mut self, row: usize, col: usize, value: f64) {
        self[(row, col)] += value;
    }

    fn for_each_entry(&self, f: &mut dyn FnMut(usize, usize, f64)) {
        for c in 0..self.ncols() {
            for r in 0..self.nrows() {
                let v = self[(r, c)];
                if v != 0.0 {
                    f(r, c, v);
                }
            }
        }
    }
}

impl ConstraintMatrix for TriMat<f64> {
    fn zeros(nrows: usize, ncols: usize) -> Self {
        TriMat::new((nrows, ncols))
    }

    fn nrows(&self) -> usize {
        self.rows()
    }

    fn ncols(&self) -> usize {
        self.cols()
    }

    fn add_entry(&mut self, row: usize, col: usize, value: f64) {
        if value != 0.0 {
            self.add_triplet(row, col, value);
        }
    }

    fn for_each_entry(&self, f: &mut dyn FnMut(usize, usize, f64)) {
        for ((&r, &c), &v) in self
            .row_inds()
            .iter()
            .zip(self.col_inds())
            .zip(self.data())
        {
            f(r, c, v);
        }
    }
}

/// A linear program `A x (rel) b`, bounds, and objective.
#[derive(Debug, Clone)]
pub struct LpConstraints<M> {
    /// Constraint matrix, `rows x num_params`.
    pub matrix: M,
    /// Right-hand side, one entry per row.
    pub rhs: Vec<f64>,
    /// Relation of each row.
    pub relations: Vec<Relation>,
    /// Bounds of each variable.
    pub bounds: Vec<VarBounds>,
    /// Objective coefficients; empty for a feasibility problem.
    pub cost: Vec<f64>,
    pub direction: Direction,
    pub num_params: usize,
}

pub type DenseConstraints = LpConstraints<DMatrix<f64>>;
pub type SparseConstraints = LpConstraints<TriMat<f64>>;

impl<M: ConstraintMatrix> LpConstraints<M> {
    /// Zero system with `num_rows` `<=` rows and free variables.
    pub fn new(num_rows: usize, num_params: usize) -> Self {
        Self {
            matrix: M::zeros(num_rows, num_params),
            rhs: vec![0.0; num_rows],
            relations: vec![Relation::LessOrEqual; num_rows],
            bounds: vec![VarBounds::FREE; num_params],
            cost: Vec::new(),
            direction: Direction::Minimize,
            num_params,
        }
    }

    pub fn num_rows(&self) -> usize {
        self.rhs.len()
    }

    /// Fill row `row` with `(column, coefficient)` entries.
    pub fn set_row(&mut self, row: usize, entries: &[(usize, f64)], relation: Relation, rhs: f64) {
        for &(col, value) in entries {
            self.matrix.add_entry(row, col, value);
        }
        self.relations[row] = relation;
        self.rhs[row] = rhs;
    }

    pub fn set_objective(&mut self, direction: Direction, cost: Vec<f64>) {
        self.direction = direction;
        self.cost = cost;
    }

    /// Check that all parts of the problem agree on their dimensions.
    pub fn validate(&self) -> Result<(), LpError> {
        let rows = self.matrix.nrows();
        check_len("right-hand side", rows, self.rhs.len())?;
        check_len("relation list", rows, self.relations.len())?;
        check_len("constraint matrix columns", self.num_params, self.matrix.ncols())?;
        check_len("bound list", self.num_params, self.bounds.len())?;
        if !self.cost.is_empty() {
            check_len("cost vector", self.num_params, self.cost.len())?;
        }

        for (index, b) in self.bounds.iter().enumerate() {
            if !b.is_valid() {
                return Err(LpError::InvalidBounds {
                    index,
                    lower: b.lower,
                    upper: b.upper,
                });
            }
        }
        if !self.rhs.iter().all(|v| v.is_finite()) {
            return Err(LpError::NonFinite {
                what: "right-hand side",
            });
        }
        if !self.cost.iter().all(|v| v.is_finite()) {
            return Err(LpError::NonFinite {
                what: "cost vector",
            });
        }
        let mut finite = true;
        self.matrix.for_each_entry(&mut |_, _, v| finite &= v.is_finite());
        if !finite {
            return Err(LpError::NonFinite {
                what: "constraint matrix",
            });
        }
        Ok(())
    }

    /// Copy into the triplet representation.
    pub fn to_sparse(&self) -> SparseConstraints {
        let mut matrix = TriMat::new((self.matrix.nrows(), self.matrix.ncols()));
        self.matrix
            .for_each_entry(&mut |r, c, v| matrix.add_triplet(r, c, v));
        LpConstraints {
            matrix,
            rhs: self.rhs.clone(),
            relations: self.relations.clone(),
            bounds: self.bounds.clone(),
            cost: self.cost.clone(),
            direction: self.direction,
            num_params: self.num_params,
        }
    }
}

fn check_len(what: &'static str, expected: usize, got: usize) -> Result<(), LpError> {
    if expected == got {
        Ok(())
    } else {
        Err(LpError::DimensionMismatch {
            what,
            expected,
            got,
        })
    }
}

/// Backend-facing, object-safe view of a linear program.
pub trait LinearProgram {
    fn num_params(&self) -> usize;
    fn num_rows(&self) -> usize;
    fn for_each_entry(&self, f: &mut dyn FnMut(usize, usize, f64));
    fn rhs(&self) -> &[f64];
    fn relations(&self) -> &[Relation];
    fn bounds(&self) -> &[VarBounds];
    fn cost(&self) -> &[f64];
    fn direction(&self) -> Direction;
    fn validate(&self) -> Result<(), LpError>;
}

impl<M: ConstraintMatrix> LinearProgram for LpConstraints<M> {
    fn num_params(&self) -> usize {
        self.num_params
    }

    fn num_rows(&self) -> usize {
        self.rhs.len()
    }

    fn for_each_entry(&self, f: &mut dyn FnMut(usize, usize, f64)) {
        self.matrix.for_each_entry(f)
    }

    fn rhs(&self) -> &[f64] {
        &self.rhs
    }

    fn relations(&self) -> &[Relation] {
        &self.relations
    }

    fn bounds(&self) -> &[VarBounds] {
        &self.bounds
    }

    fn cost(&self) -> &[f64] {
        &self.cost
    }

    fn direction(&self) -> Direction {
        self.direction
    }

    fn validate(&self) -> Result<(), LpError> {
        LpConstraints::validate(self)
    }
}
