use crate::error::LpError;
use crate::problem::{Direction, LinearProgram, Relation};
use crate::solver::{copy_solution, LpSolver, SolveStatus};
use log::{debug, warn};
use minilp::{ComparisonOp, LinearExpr, OptimizationDirection, Problem, Variable};
use std::collections::BTreeMap;

/// `minilp` simplex backend.
pub struct MiniLpSolver {
    num_params: usize,
    loaded: Option<Loaded>,
    solution: Option<Vec<f64>>,
    objective: Option<f64>,
}

struct Loaded {
    problem: Problem,
    vars: Vec<Variable>,
    /// Set when an empty row can never hold, e.g. `0 <= -1`.
    trivially_infeasible: bool,
}

impl MiniLpSolver {
    pub fn new(num_params: usize) -> Self {
        Self {
            num_params,
            loaded: None,
            solution: None,
            objective: None,
        }
    }
}

impl LpSolver for MiniLpSolver {
    fn name(&self) -> &'static str {
        "minilp"
    }

    fn num_params(&self) -> usize {
        self.num_params
    }

    fn setup(&mut self, lp: &dyn LinearProgram) -> Result<(), LpError> {
        self.loaded = None;
        self.solution = None;
        self.objective = None;

        lp.validate()?;
        if lp.num_params() != self.num_params {
            return Err(LpError::ParamCountMismatch {
                expected: self.num_params,
                got: lp.num_params(),
            });
        }

        let direction = match lp.direction() {
            Direction::Minimize => OptimizationDirection::Minimize,
            Direction::Maximize => OptimizationDirection::Maximize,
        };
        let mut problem = Problem::new(direction);
        let cost = lp.cost();
        let vars: Vec<Variable> = lp
            .bounds()
            .iter()
            .enumerate()
            .map(|(i, b)| problem.add_var(cost.get(i).copied().unwrap_or(0.0), (b.lower, b.upper)))
            .collect();

        // Triplets may repeat a coordinate; merge them per row.
        let mut rows: Vec<BTreeMap<usize, f64>> = vec![BTreeMap::new(); lp.num_rows()];
        lp.for_each_entry(&mut |r, c, v| *rows[r].entry(c).or_insert(0.0) += v);

        let mut trivially_infeasible = false;
        for (row, ((entries, relation), rhs)) in rows
            .iter()
            .zip(lp.relations())
            .zip(lp.rhs())
            .enumerate()
        {
            let mut expr = LinearExpr::empty();
            let mut empty = true;
            for (&col, &coeff) in entries.iter().filter(|(_, v)| **v != 0.0) {
                expr.add(vars[col], coeff);
                empty = false;
            }
            if empty {
                if !relation.holds(0.0, *rhs) {
                    debug!("row {row} has no coefficients and cannot hold (rhs {rhs})");
                    trivially_infeasible = true;
                }
                continue;
            }
            problem.add_constraint(expr, comparison_op(*relation), *rhs);
        }

        debug!(
            "minilp: loaded {} rows, {} variables",
            lp.num_rows(),
            vars.len()
        );
        self.loaded = Some(Loaded {
            problem,
            vars,
            trivially_infeasible,
        });
        Ok(())
    }

    fn solve(&mut self) -> SolveStatus {
        self.solution = None;
        self.objective = None;

        let Some(loaded) = &self.loaded else {
            warn!("minilp: solve called before setup");
            return SolveStatus::Failed;
        };
        if loaded.trivially_infeasible {
            return SolveStatus::Infeasible;
        }

        match loaded.problem.solve() {
            Ok(solution) => {
                self.solution = Some(loaded.vars.iter().map(|v| solution[*v]).collect());
                self.objective = Some(solution.objective());
                SolveStatus::Optimal
            }
            Err(minilp::Error::Infeasible) => SolveStatus::Infeasible,
            Err(minilp::Error::Unbounded) => SolveStatus::Unbounded,
        }
    }

    fn solution(&self, out: &mut [f64]) -> Result<(), LpError> {
        if self.loaded.is_none() {
            return Err(LpError::NotSetUp);
        }
        let solution = self.solution.as_ref().ok_or(LpError::NoSolution)?;
        copy_solution(solution, out)
    }

    fn objective_value(&self) -> Option<f64> {
        self.objective
    }
}

fn comparison_op(relation: Relation) -> ComparisonOp {
    match relation {
        Relation::LessOrEqual => ComparisonOp::Le,
        Relation::GreaterOrEqual => ComparisonOp::Ge,
        Relation::Equal => ComparisonOp::Eq,
    }
}
