//! JSON-friendly entry points gluing builders, solvers and drivers.
//!
//! Each problem has an input type, a report type and a `run_*` function
//! taking a shared [`LinfConfig`]. All types derive `Serialize` and
//! `Deserialize` so they can be read from and written to files directly.

mod config;
mod harmonize;
mod translation_structure;
mod triangulation;

pub use config::LinfConfig;
pub use harmonize::{run_gain_offset, GainOffsetInput, GainOffsetReport};
pub use translation_structure::{
    run_translation_structure, TranslationStructureInput, TranslationStructureReport,
};
pub use triangulation::{run_triangulation, PointEstimate, TriangulationInput, TriangulationReport};
