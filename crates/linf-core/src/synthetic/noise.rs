//! Noise samplers drawing from a caller-owned RNG.

use crate::{Real, Vec2};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Normal distribution `N(mean, sigma^2)` sampled with Box-Muller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaussianNoise {
    pub mean: Real,
    pub sigma: Real,
}

impl GaussianNoise {
    pub fn new(mean: Real, sigma: Real) -> Self {
        Self { mean, sigma }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Real {
        // u1 in (0, 1] keeps the logarithm finite.
        let u1: Real = 1.0 - rng.random::<Real>();
        let u2: Real = rng.random::<Real>();
        self.mean + self.sigma * (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }
}

/// Uniform per-axis pixel noise in `[-max_abs, +max_abs]`.
pub fn uniform_pixel_noise<R: Rng + ?Sized>(rng: &mut R, max_abs: Real) -> Vec2 {
    let max_abs = max_abs.abs();
    if max_abs == 0.0 {
        return Vec2::zeros();
    }
    Vec2::new(
        rng.random_range(-max_abs..=max_abs),
        rng.random_range(-max_abs..=max_abs),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn gaussian_noise_is_reproducible() {
        let noise = GaussianNoise::new(127.0, 10.0);
        let a: Vec<Real> = {
            let mut rng = StdRng::seed_from_u64(7);
            (0..4).map(|_| noise.sample(&mut rng)).collect()
        };
        let b: Vec<Real> = {
            let mut rng = StdRng::seed_from_u64(7);
            (0..4).map(|_| noise.sample(&mut rng)).collect()
        };
        assert_eq!(a, b);
    }

    #[test]
    fn gaussian_noise_moments() {
        let noise = GaussianNoise::new(5.0, 2.0);
        let mut rng = StdRng::seed_from_u64(1);
        let n = 20_000;
        let samples: Vec<Real> = (0..n).map(|_| noise.sample(&mut rng)).collect();
        let mean = samples.iter().sum::<Real>() / n as Real;
        let var = samples.iter().map(|s| (s - mean).powi(2)).sum::<Real>() / n as Real;
        assert!((mean - 5.0).abs() < 0.1, "mean {mean}");
        assert!((var.sqrt() - 2.0).abs() < 0.1, "sigma {}", var.sqrt());
    }

    #[test]
    fn uniform_noise_stays_in_bounds() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let d = uniform_pixel_noise(&mut rng, 0.5);
            assert!(d.x.abs() <= 0.5 && d.y.abs() <= 0.5);
        }
        assert_eq!(uniform_pixel_noise(&mut rng, 0.0), Vec2::zeros());
    }
}
