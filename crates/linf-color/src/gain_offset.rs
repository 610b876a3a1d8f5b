//! Gain/offset constraint builder.
//!
//! Variables are laid out as `[g_0, o_0, g_1, o_1, ..., gamma]`. For an edge
//! `(i, j)` and a matched quantile at bin positions `(p_i, p_j)` the builder
//! emits
//!
//! ```text
//! g_i p_i + o_i - g_j p_j - o_j - gamma <= 0
//! g_i p_i + o_i - g_j p_j - o_j + gamma >= 0
//! ```
//!
//! and minimizes `gamma`. Relative constraints leave a global affine
//! ambiguity, so at least one image is pinned to `g = 1, o = 0`.

use crate::edge::RelativeColorHistogramEdge;
use crate::quantile::{quantile_levels, quantile_positions};
use linf_lp::{
    solve_once, BuildError, ConstraintBuilder, Direction, LpSolver, Relation, SolveError,
    SparseConstraints, VarBounds,
};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use sprs::TriMat;
use std::collections::BTreeSet;

/// Options of the harmonization model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GainOffsetOptions {
    /// Number of matched quantiles per edge.
    pub quantile_count: usize,
    /// Constrain every gain to be non-negative.
    pub non_negative_gain: bool,
}

impl Default for GainOffsetOptions {
    fn default() -> Self {
        Self {
            quantile_count: 10,
            non_negative_gain: true,
        }
    }
}

/// Affine intensity correction of one image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GainOffset {
    pub gain: f64,
    pub offset: f64,
}

impl GainOffset {
    pub const IDENTITY: Self = Self {
        gain: 1.0,
        offset: 0.0,
    };

    pub fn apply(&self, value: f64) -> f64 {
        self.gain * value + self.offset
    }
}

/// Decoded harmonization result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GainOffsetSolution {
    /// One correction per image, indexed by image id.
    pub transforms: Vec<GainOffset>,
    /// Largest remaining quantile discrepancy, in bins.
    pub gamma: f64,
}

#[derive(Debug, Clone)]
struct MatchedEdge {
    from: usize,
    to: usize,
    positions: Vec<(f64, f64)>,
}

/// Builds the single-shot harmonization LP for a graph of image overlaps.
#[derive(Debug, Clone)]
pub struct GainOffsetConstraintBuilder {
    edges: Vec<MatchedEdge>,
    fixed: BTreeSet<usize>,
    num_images: usize,
    non_negative_gain: bool,
}

impl GainOffsetConstraintBuilder {
    /// Match quantiles of every edge and validate the graph.
    ///
    /// The number of images is `max(edge index) + 1`.
    ///
    /// # Errors
    ///
    /// [`BuildError`] for an empty edge list, zero quantiles, a self edge,
    /// histograms with different bin counts, an empty histogram, or a fixed
    /// index outside the image range.
    pub fn new(
        edges: Vec<RelativeColorHistogramEdge>,
        fixed: &[usize],
        opts: &GainOffsetOptions,
    ) -> Result<Self, BuildError> {
        if edges.is_empty() {
            return Err(BuildError::TooFew {
                what: "histogram edges",
                min: 1,
                got: 0,
            });
        }
        if opts.quantile_count == 0 {
            return Err(BuildError::Invalid(
                "quantile count must be positive".to_string(),
            ));
        }

        let levels = quantile_levels(opts.quantile_count);
        let mut matched = Vec::with_capacity(edges.len());
        for (n, edge) in edges.iter().enumerate() {
            if edge.from == edge.to {
                return Err(BuildError::Invalid(format!(
                    "edge {n} links image {} to itself",
                    edge.from
                )));
            }
            if edge.histogram_from.len() != edge.histogram_to.len() {
                return Err(BuildError::SizeMismatch {
                    what: "histogram bins",
                    expected: edge.histogram_from.len(),
                    got: edge.histogram_to.len(),
                });
            }
            let empty = || BuildError::Invalid(format!("edge {n} has an empty histogram"));
            let p_from = quantile_positions(&edge.histogram_from, &levels).ok_or_else(empty)?;
            let p_to = quantile_positions(&edge.histogram_to, &levels).ok_or_else(empty)?;
            matched.push(MatchedEdge {
                from: edge.from,
                to: edge.to,
                positions: p_from.into_iter().zip(p_to).collect(),
            });
        }

        let num_images = matched
            .iter()
            .map(|e| e.from.max(e.to) + 1)
            .max()
            .unwrap_or(0);
        let fixed: BTreeSet<usize> = fixed.iter().copied().collect();
        if let Some(&index) = fixed.iter().find(|&&i| i >= num_images) {
            return Err(BuildError::IndexOutOfRange {
                what: "fixed image",
                index,
                limit: num_images,
            });
        }
        if fixed.is_empty() {
            debug!("no image fixed, harmonization is only defined up to an affine map");
        }

        Ok(Self {
            edges: matched,
            fixed,
            num_images,
            non_negative_gain: opts.non_negative_gain,
        })
    }

    pub fn num_images(&self) -> usize {
        self.num_images
    }

    /// `2 * num_images + 1`.
    pub fn num_params(&self) -> usize {
        2 * self.num_images + 1
    }

    fn gamma_col(&self) -> usize {
        2 * self.num_images
    }

    /// Typed view of an LP solution.
    pub fn decode(&self, solution: &[f64]) -> Result<GainOffsetSolution, BuildError> {
        if solution.len() != self.num_params() {
            return Err(BuildError::SizeMismatch {
                what: "gain/offset solution",
                expected: self.num_params(),
                got: solution.len(),
            });
        }
        let transforms = solution[..self.gamma_col()]
            .chunks_exact(2)
            .map(|c| GainOffset {
                gain: c[0],
                offset: c[1],
            })
            .collect();
        Ok(GainOffsetSolution {
            transforms,
            gamma: solution[self.gamma_col()],
        })
    }
}

impl ConstraintBuilder for GainOffsetConstraintBuilder {
    type Matrix = TriMat<f64>;

    fn num_params(&self) -> usize {
        GainOffsetConstraintBuilder::num_params(self)
    }

    fn build(&self) -> Result<SparseConstraints, BuildError> {
        let matched_rows: usize = self.edges.iter().map(|e| 2 * e.positions.len()).sum();
        let rows = matched_rows + 2 * self.fixed.len();
        let gamma = self.gamma_col();
        let mut lp = SparseConstraints::new(rows, self.num_params());

        let mut r = 0;
        for edge in &self.edges {
            let (gi, oi) = (2 * edge.from, 2 * edge.from + 1);
            let (gj, oj) = (2 * edge.to, 2 * edge.to + 1);
            for &(pi, pj) in &edge.positions {
                let diff = [(gi, pi), (oi, 1.0), (gj, -pj), (oj, -1.0)];
                let mut upper = diff.to_vec();
                upper.push((gamma, -1.0));
                lp.set_row(r, &upper, Relation::LessOrEqual, 0.0);
                let mut lower = diff.to_vec();
                lower.push((gamma, 1.0));
                lp.set_row(r + 1, &lower, Relation::GreaterOrEqual, 0.0);
                r += 2;
            }
        }
        for &image in &self.fixed {
            lp.set_row(r, &[(2 * image, 1.0)], Relation::Equal, 1.0);
            lp.set_row(r + 1, &[(2 * image + 1, 1.0)], Relation::Equal, 0.0);
            r += 2;
        }

        for image in 0..self.num_images {
            if self.non_negative_gain {
                lp.bounds[2 * image] = VarBounds::non_negative();
            }
        }
        lp.bounds[gamma] = VarBounds::non_negative();
        let mut cost = vec![0.0; self.num_params()];
        cost[gamma] = 1.0;
        lp.set_objective(Direction::Minimize, cost);
        Ok(lp)
    }
}

/// Solve the harmonization LP once and decode the per-image corrections.
///
/// `solver` must be configured for `builder.num_params()` variables.
pub fn harmonize<S>(
    solver: &mut S,
    builder: &GainOffsetConstraintBuilder,
) -> Result<GainOffsetSolution, SolveError>
where
    S: LpSolver + ?Sized,
{
    let mut x = vec![0.0; builder.num_params()];
    solve_once(solver, builder, &mut x)?;
    let solution = builder.decode(&x)?;
    info!(
        "harmonized {} images over {} edges, max discrepancy {:.4} bins",
        builder.num_images(),
        builder.edges.len(),
        solution.gamma
    );
    Ok(solution)
}
