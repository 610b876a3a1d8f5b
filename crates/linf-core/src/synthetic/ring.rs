//! Ring of cameras observing a random point cloud.
//!
//! Cameras sit on a circle of radius `distance` in the XZ plane (Y up) and
//! look at the origin; points are drawn uniformly in a cube of half-size
//! `point_spread` around the origin.

use super::noise::uniform_pixel_noise;
use crate::{
    intrinsics_matrix, project, CameraPose, Mat3, Mat34, ObservationTable, Pt2, Pt3, Real, Vec3,
};
use anyhow::{ensure, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Camera ring configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RingConfig {
    pub fx: Real,
    pub fy: Real,
    pub cx: Real,
    pub cy: Real,
    /// Ring radius.
    pub distance: Real,
    /// Random perturbation of the viewing direction.
    pub jitter: Real,
    /// Half-size of the cube holding the points.
    pub point_spread: Real,
    /// Uniform per-axis pixel noise added to the observations.
    pub pixel_noise: Real,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            fx: 1.0,
            fy: 1.0,
            cx: 0.0,
            cy: 0.0,
            distance: 5.0,
            jitter: 0.0,
            point_spread: 0.6,
            pixel_noise: 0.0,
        }
    }
}

impl RingConfig {
    pub fn with_intrinsics(fx: Real, fy: Real, cx: Real, cy: Real) -> Self {
        Self {
            fx,
            fy,
            cx,
            cy,
            ..Self::default()
        }
    }

    pub fn intrinsics(&self) -> Mat3 {
        intrinsics_matrix(self.fx, self.fy, self.cx, self.cy)
    }
}

/// Ground truth and observations of an N-view scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NViewDataset {
    pub intrinsics: Vec<Mat3>,
    pub poses: Vec<CameraPose>,
    pub points: Vec<Pt3>,
    /// `views[c][p]` is the pixel of point `p` in camera `c`.
    pub views: Vec<Vec<Pt2>>,
}

impl NViewDataset {
    pub fn num_views(&self) -> usize {
        self.poses.len()
    }

    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    /// Pixel projection matrix `K_i [R_i | t_i]`.
    pub fn projection(&self, view: usize) -> Mat34 {
        self.poses[view].projection_with(&self.intrinsics[view])
    }

    pub fn rotations(&self) -> Vec<Mat3> {
        self.poses.iter().map(|p| p.rotation).collect()
    }

    pub fn observation_table(&self) -> ObservationTable {
        ObservationTable::from_views(&self.views)
    }

    /// Aggregate reprojection residual of an estimated scene.
    ///
    /// Squared errors are summed per axis over all views and points; the
    /// result is `sqrt(sum du^2) + sqrt(sum dv^2)`.
    pub fn reprojection_residual(&self, projections: &[Mat34], points: &[Pt3]) -> Real {
        let mut sum_u = 0.0;
        let mut sum_v = 0.0;
        for (p, pixels) in projections.iter().zip(&self.views) {
            for (x, observed) in points.iter().zip(pixels) {
                let uv = project(p, x);
                sum_u += (uv.x - observed.x).powi(2);
                sum_v += (uv.y - observed.y).powi(2);
            }
        }
        sum_u.sqrt() + sum_v.sqrt()
    }
}

/// Rotation whose third row looks along `direction`, with `up` fixing the roll.
pub fn look_at(direction: &Vec3, up: &Vec3) -> Mat3 {
    let zc = direction.normalize();
    let xc = up.cross(&zc).normalize();
    let yc = zc.cross(&xc);
    Mat3::from_rows(&[xc.transpose(), yc.transpose(), zc.transpose()])
}

/// Build a ring of `n_views` cameras observing `n_points` random points.
pub fn camera_ring<R: Rng + ?Sized>(
    rng: &mut R,
    n_views: usize,
    n_points: usize,
    config: &RingConfig,
) -> Result<NViewDataset> {
    ensure!(n_views > 0, "camera ring needs at least one view");
    ensure!(config.distance > 0.0, "ring distance must be positive");

    let spread = config.point_spread;
    let points: Vec<Pt3> = (0..n_points)
        .map(|_| {
            Pt3::new(
                rng.random_range(-1.0..=1.0) * spread,
                rng.random_range(-1.0..=1.0) * spread,
                rng.random_range(-1.0..=1.0) * spread,
            )
        })
        .collect();

    let k = config.intrinsics();
    let mut poses = Vec::with_capacity(n_views);
    let mut views = Vec::with_capacity(n_views);
    for i in 0..n_views {
        let theta = i as Real * 2.0 * PI / n_views as Real;
        let center = Vec3::new(theta.sin(), 0.0, theta.cos()) * config.distance;
        let jitter = Vec3::new(
            rng.random_range(-1.0..=1.0),
            rng.random_range(-1.0..=1.0),
            rng.random_range(-1.0..=1.0),
        ) * (config.jitter / config.distance);
        let pose = CameraPose::from_center(look_at(&(jitter - center), &Vec3::y()), &center);

        let pixels = points
            .iter()
            .map(|x| {
                let uv = pose.project(&k, x);
                uv + uniform_pixel_noise(rng, config.pixel_noise)
            })
            .collect();
        poses.push(pose);
        views.push(pixels);
    }

    Ok(NViewDataset {
        intrinsics: vec![k; n_views],
        poses,
        points,
        views,
    })
}
