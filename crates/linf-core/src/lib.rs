//! Core math and geometry primitives for `linf-rs`.
//!
//! This crate contains:
//! - linear algebra type aliases (`Real`, `Vec3`, `Pt3`, `Mat34`, ...),
//! - camera poses and pinhole projection helpers,
//! - observation tables used by multi-view L∞ problems,
//! - image pair sets and their plain-text list format,
//! - deterministic synthetic data generators for tests and demos.

/// Camera pose `[R | t]` and projection helpers.
pub mod camera;
/// Linear algebra type aliases and helpers.
pub mod math;
/// Observation records and tables.
pub mod observation;
/// Image pair sets and pair-list IO.
pub mod pairs;
/// Deterministic synthetic datasets.
pub mod synthetic;

pub use camera::*;
pub use math::*;
pub use observation::*;
pub use pairs::{Pair, PairSet};
