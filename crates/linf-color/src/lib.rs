//! Photometric harmonization of overlapping images.
//!
//! Every image `i` gets an affine intensity correction
//! `output = gain_i * input + offset_i`. Overlapping image pairs contribute
//! a [`RelativeColorHistogramEdge`]; matched quantiles of the two histograms
//! must agree after correction up to a shared bound `gamma`, which is itself
//! an LP variable minimized in a single solve.
//!
//! ```no_run
//! use linf_color::{
//!     harmonize, GainOffsetConstraintBuilder, GainOffsetOptions, RelativeColorHistogramEdge,
//! };
//! use linf_lp::{make_solver, SolverKind};
//!
//! # fn histograms() -> (Vec<usize>, Vec<usize>) { unimplemented!() }
//! let (reference, other) = histograms();
//! let edges = vec![RelativeColorHistogramEdge::new(0, 1, reference, other)];
//! let builder = GainOffsetConstraintBuilder::new(edges, &[0], &GainOffsetOptions::default())?;
//! let mut solver = make_solver(SolverKind::MiniLp, builder.num_params());
//! let solution = harmonize(solver.as_mut(), &builder)?;
//! println!("image 1: {:?}", solution.transforms[1]);
//! # Ok::<(), linf_lp::SolveError>(())
//! ```

mod edge;
pub mod gain_offset;
pub mod quantile;

pub use edge::RelativeColorHistogramEdge;
pub use gain_offset::{
    harmonize, GainOffset, GainOffsetConstraintBuilder, GainOffsetOptions, GainOffsetSolution,
};
pub use quantile::{quantile_levels, quantile_positions};
