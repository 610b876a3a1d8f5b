//! Deterministic synthetic data generation helpers.
//!
//! This module provides small building blocks for constructing synthetic
//! L∞ problems used in tests and demos:
//! - a ring of cameras looking at a random point cloud ([`ring`]),
//! - intensity histograms accumulated from samples ([`histogram`]),
//! - gaussian and uniform noise drawn from a caller-owned RNG ([`noise`]).
//!
//! None of the helpers touch process-global randomness: every random draw
//! comes from an RNG passed in by the caller, so seeding it with
//! `StdRng::seed_from_u64` makes a dataset reproducible.
//!
//! # Example
//!
//! ```no_run
//! use linf_core::synthetic::ring::{camera_ring, RingConfig};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let data = camera_ring(&mut rng, 3, 6, &RingConfig::default()).unwrap();
//! assert_eq!(data.num_views(), 3);
//! assert_eq!(data.observation_table().len(), 18);
//! ```

pub mod histogram;
pub mod noise;
pub mod ring;
