//! Multi-view geometry problems solved under the L∞ norm.
//!
//! Both problems become linear once the reprojection bound `gamma` is fixed,
//! so each is exposed as a [`BoundedConstraintBuilder`](linf_lp::BoundedConstraintBuilder)
//! driven by [`linf_lp::bisect`], plus a typed decoder for the flat LP
//! solution:
//!
//! - [`triangulation`]: one unknown point seen by `N >= 2` known cameras,
//! - [`translation_structure`]: all camera translations and all points at once,
//!   given known rotations.
//!
//! ```no_run
//! use linf_core::{Mat34, Pt2};
//! use linf_geometry::triangulate_linf;
//! use linf_lp::{BisectionOptions, MiniLpSolver};
//!
//! # fn cameras() -> (Vec<Mat34>, Vec<Pt2>) { unimplemented!() }
//! let (projections, pixels) = cameras();
//! let mut solver = MiniLpSolver::new(3);
//! let (point, report) =
//!     triangulate_linf(&mut solver, &projections, &pixels, &BisectionOptions::default())?;
//! println!("{point} with max error {}", report.gamma);
//! # Ok::<(), linf_lp::SolveError>(())
//! ```

pub mod translation_structure;
pub mod triangulation;

pub use translation_structure::{
    solve_translation_structure, TranslationStructure, TranslationStructureBuilder,
};
pub use triangulation::{triangulate_linf, TriangulationBuilder};
