//! Calibrated camera pose `[R | t]`.
//!
//! Poses follow the `x_cam = R x_world + t` convention, so the camera
//! center is `C = -R^T t`.

use crate::{mat34_from_parts, project, Mat3, Mat34, Pt2, Pt3, Vec3};
use serde::{Deserialize, Serialize};

/// Rotation and translation of one calibrated view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    /// Orthonormal rotation, world to camera.
    pub rotation: Mat3,
    /// Translation, world to camera.
    pub translation: Vec3,
}

impl CameraPose {
    pub fn new(rotation: Mat3, translation: Vec3) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// Pose whose optical center sits at `center`.
    pub fn from_center(rotation: Mat3, center: &Vec3) -> Self {
        Self {
            rotation,
            translation: -(rotation * center),
        }
    }

    /// Optical center in world coordinates.
    pub fn center(&self) -> Vec3 {
        -(self.rotation.transpose() * self.translation)
    }

    /// Normalized projection matrix `[R | t]`.
    pub fn projection(&self) -> Mat34 {
        mat34_from_parts(&self.rotation, &self.translation)
    }

    /// Pixel projection matrix `K [R | t]`.
    pub fn projection_with(&self, k: &Mat3) -> Mat34 {
        k * self.projection()
    }

    /// Project a world point with intrinsics `k`.
    pub fn project(&self, k: &Mat3, x: &Pt3) -> Pt2 {
        project(&self.projection_with(k), x)
    }
}

/// Pinhole intrinsics matrix from focal lengths and principal point.
pub fn intrinsics_matrix(fx: f64, fy: f64, cx: f64, cy: f64) -> Mat3 {
    Mat3::new(fx, 0.0, cx, 0.0, fy, cy, 0.0, 0.0, 1.0)
}
