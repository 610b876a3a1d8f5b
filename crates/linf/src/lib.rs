//! High-level entry crate for `linf-rs`.
//!
//! Quasiconvex problems are solved as sequences of linear programs: the
//! geometric problems bisect an L∞ error bound with LP feasibility as the
//! oracle, photometric harmonization carries the bound as an LP variable and
//! solves once.
//!
//! ## Imperative API
//!
//! ```no_run
//! use linf::geometry::triangulate_linf;
//! use linf::lp::{make_solver, BisectionOptions, SolverKind};
//! use linf::core::{Mat34, Pt2};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cameras: Vec<Mat34> = /* known projection matrices */
//! # vec![];
//! let pixels: Vec<Pt2> = /* one observation per camera */
//! # vec![];
//! let mut solver = make_solver(SolverKind::MiniLp, 3);
//! let (point, report) =
//!     triangulate_linf(solver.as_mut(), &cameras, &pixels, &BisectionOptions::default())?;
//! println!("{point}: max error {:.2e} after {} LP solves", report.gamma, report.solves);
//! # Ok(())
//! # }
//! ```
//!
//! ## Pipeline API
//!
//! The [`pipeline`] module exposes serializable inputs, reports and a shared
//! [`pipeline::LinfConfig`]; these are what the `linf` command line tool reads
//! and writes.
//!
//! ## Modules
//!
//! - [`core`]: math aliases, camera poses, observation tables, pair lists, synthetic data
//! - [`lp`]: LP model, solver backends, bisection and single-shot drivers
//! - [`geometry`]: triangulation and translation+structure builders
//! - [`color`]: gain/offset harmonization
//! - [`pipeline`]: JSON-friendly `run_*` entry points

/// Math aliases, camera poses, observation tables, image pair lists and
/// synthetic data.
pub mod core {
    pub use linf_core::*;
}

/// LP model, solver backends, bisection and single-shot drivers.
pub mod lp {
    pub use linf_lp::*;
}

/// Triangulation and translation+structure estimation.
pub mod geometry {
    pub use linf_geometry::*;
}

/// Gain/offset harmonization of overlapping images.
pub mod color {
    pub use linf_color::*;
}

/// Serializable inputs, configs and reports.
pub mod pipeline {
    pub use linf_pipeline::*;
}

/// Convenient re-exports for common use cases.
///
/// Import with `use linf::prelude::*;` to get started quickly.
pub mod prelude {
    pub use crate::color::{
        harmonize, GainOffset, GainOffsetConstraintBuilder, RelativeColorHistogramEdge,
    };
    pub use crate::core::{CameraPose, Mat3, Mat34, Observation, ObservationTable, Pt2, Pt3, Vec3};
    pub use crate::geometry::{
        solve_translation_structure, triangulate_linf, TranslationStructureBuilder,
        TriangulationBuilder,
    };
    pub use crate::lp::{
        bisect, make_solver, solve_once, BisectionOptions, BisectionReport, LpSolver, SolveError,
        SolverKind,
    };
    pub use crate::pipeline::LinfConfig;
}
