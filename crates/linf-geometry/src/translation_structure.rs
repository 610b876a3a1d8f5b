//! Joint L∞ estimation of camera translations and scene points.
//!
//! Rotations are known; every observation of point `X_p` in camera `c`
//! contributes five rows linear in `(t_c, X_p)`:
//!
//! - cheirality `R2 X + t2 >= 1`, which also fixes the global scale,
//! - `u` lower (`>=`) and upper (`<=`) bounds,
//! - `v` lower (`>=`) and upper (`<=`) bounds.
//!
//! Three equality rows pin `t_0` to the origin. The solution layout is
//! `[t_0, t_1, ..., X_0, X_1, ...]`, three values each; use
//! [`TranslationStructureBuilder::decode`] instead of indexing it by hand.

use linf_core::{CameraPose, Mat3, Mat34, ObservationTable, Pt3, Real, Vec3};
use linf_lp::{
    bisect, BisectionOptions, BisectionReport, BoundedConstraintBuilder, BuildError, LpSolver,
    Relation, SolveError, SparseConstraints,
};
use log::{debug, info};
use nalgebra::RowVector3;
use serde::{Deserialize, Serialize};
use sprs::TriMat;

const ROWS_PER_OBSERVATION: usize = 5;
const GAUGE_ROWS: usize = 3;

/// Recovered camera translations and points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationStructure {
    pub rotations: Vec<Mat3>,
    pub translations: Vec<Vec3>,
    pub points: Vec<Pt3>,
}

impl TranslationStructure {
    /// Camera centers `C_i = -R_i^T t_i`.
    pub fn centers(&self) -> Vec<Vec3> {
        self.poses().iter().map(CameraPose::center).collect()
    }

    pub fn poses(&self) -> Vec<CameraPose> {
        self.rotations
            .iter()
            .zip(&self.translations)
            .map(|(r, t)| CameraPose::new(*r, *t))
            .collect()
    }

    /// Pixel projection matrices `K [R_i | t_i]`.
    pub fn projections(&self, k: &Mat3) -> Vec<Mat34> {
        self.poses().iter().map(|p| p.projection_with(k)).collect()
    }
}

/// Constraint builder over an observation table with known rotations.
#[derive(Debug, Clone)]
pub struct TranslationStructureBuilder {
    rotations: Vec<Mat3>,
    /// Rotations as seen by the LP, `K R_i` when intrinsics are given.
    encoded: Vec<Mat3>,
    k_inv: Option<Mat3>,
    table: ObservationTable,
    num_points: usize,
}

impl TranslationStructureBuilder {
    /// Builder for normalized observations (identity intrinsics).
    ///
    /// # Errors
    ///
    /// [`BuildError::TooFew`] for an empty table and
    /// [`BuildError::SizeMismatch`] when the camera indices of the table do
    /// not cover exactly `rotations.len()` cameras.
    pub fn new(rotations: Vec<Mat3>, table: ObservationTable) -> Result<Self, BuildError> {
        if table.is_empty() {
            return Err(BuildError::TooFew {
                what: "observations",
                min: 1,
                got: 0,
            });
        }
        let num_cameras = table.num_cameras();
        if num_cameras != rotations.len() {
            return Err(BuildError::SizeMismatch {
                what: "rotations for observed cameras",
                expected: num_cameras,
                got: rotations.len(),
            });
        }
        Ok(Self {
            encoded: rotations.clone(),
            rotations,
            k_inv: None,
            num_points: table.num_points(),
            table,
        })
    }

    /// Builder for pixel observations of cameras sharing intrinsics `k`.
    ///
    /// The LP works on `K R_i` and the decoded translations are mapped back
    /// through `K^-1`.
    pub fn with_intrinsics(
        k: &Mat3,
        rotations: Vec<Mat3>,
        table: ObservationTable,
    ) -> Result<Self, BuildError> {
        let k_inv = k
            .try_inverse()
            .ok_or_else(|| BuildError::Invalid("intrinsics matrix is singular".to_string()))?;
        let mut builder = Self::new(rotations, table)?;
        builder.encoded = builder.rotations.iter().map(|r| k * r).collect();
        builder.k_inv = Some(k_inv);
        Ok(builder)
    }

    pub fn num_cameras(&self) -> usize {
        self.rotations.len()
    }

    pub fn num_points(&self) -> usize {
        self.num_points
    }

    fn translation_col(&self, camera: usize) -> usize {
        3 * camera
    }

    fn point_col(&self, point: usize) -> usize {
        3 * (self.num_cameras() + point)
    }

    /// Split an LP solution into translations and points.
    pub fn decode(&self, solution: &[Real]) -> Result<TranslationStructure, BuildError> {
        let expected = BoundedConstraintBuilder::num_params(self);
        if solution.len() != expected {
            return Err(BuildError::SizeMismatch {
                what: "translation+structure solution",
                expected,
                got: solution.len(),
            });
        }
        let (t_part, x_part) = solution.split_at(self.point_col(0));
        let translations = t_part
            .chunks_exact(3)
            .map(|c| {
                let t = Vec3::new(c[0], c[1], c[2]);
                match &self.k_inv {
                    Some(k_inv) => k_inv * t,
                    None => t,
                }
            })
            .collect();
        let points = x_part
            .chunks_exact(3)
            .map(|c| Pt3::new(c[0], c[1], c[2]))
            .collect();
        Ok(TranslationStructure {
            rotations: self.rotations.clone(),
            translations,
            points,
        })
    }
}

impl BoundedConstraintBuilder for TranslationStructureBuilder {
    type Matrix = TriMat<f64>;

    fn num_params(&self) -> usize {
        3 * (self.num_cameras() + self.num_points)
    }

    fn build(&self, gamma: f64) -> Result<SparseConstraints, BuildError> {
        let num_params = BoundedConstraintBuilder::num_params(self);
        let rows = ROWS_PER_OBSERVATION * self.table.len() + GAUGE_ROWS;
        let mut lp = SparseConstraints::new(rows, num_params);

        for (i, obs) in self.table.iter().enumerate() {
            let r = ROWS_PER_OBSERVATION * i;
            let rot = &self.encoded[obs.camera];
            let tc = self.translation_col(obs.camera);
            let xc = self.point_col(obs.point);
            let (u, v) = (obs.pixel.x, obs.pixel.y);
            let depth = rot.row(2).into_owned();

            // coeffs . X + t . coeffs_t
            let row = |x: RowVector3<Real>, t: [Real; 3]| -> [(usize, Real); 6] {
                [
                    (xc, x[0]),
                    (xc + 1, x[1]),
                    (xc + 2, x[2]),
                    (tc, t[0]),
                    (tc + 1, t[1]),
                    (tc + 2, t[2]),
                ]
            };

            lp.set_row(r, &row(depth, [0.0, 0.0, 1.0]), Relation::GreaterOrEqual, 1.0);
            for (axis, obs_coord) in [(0usize, u), (1, v)] {
                let a = rot.row(axis).into_owned();
                let lo = obs_coord - gamma;
                let hi = obs_coord + gamma;
                let mut t_lo = [0.0; 3];
                t_lo[axis] = 1.0;
                t_lo[2] -= lo;
                let mut t_hi = [0.0; 3];
                t_hi[axis] = 1.0;
                t_hi[2] -= hi;
                let base = r + 1 + 2 * axis;
                lp.set_row(base, &row(a - depth * lo, t_lo), Relation::GreaterOrEqual, 0.0);
                lp.set_row(base + 1, &row(a - depth * hi, t_hi), Relation::LessOrEqual, 0.0);
            }
        }

        let gauge = ROWS_PER_OBSERVATION * self.table.len();
        for k in 0..GAUGE_ROWS {
            lp.set_row(gauge + k, &[(k, 1.0)], Relation::Equal, 0.0);
        }
        Ok(lp)
    }
}

/// Bisect the L∞ reprojection bound of `builder` and decode the result.
///
/// `solver` must be configured for `builder.num_params()` variables.
pub fn solve_translation_structure<S>(
    solver: &mut S,
    builder: &TranslationStructureBuilder,
    opts: &BisectionOptions,
) -> Result<(TranslationStructure, BisectionReport), SolveError>
where
    S: LpSolver + ?Sized,
{
    let mut x = vec![0.0; BoundedConstraintBuilder::num_params(builder)];
    debug!(
        "translation+structure: {} cameras, {} points, {} observations",
        builder.num_cameras(),
        builder.num_points(),
        builder.table.len()
    );
    let report = bisect(solver, builder, opts, &mut x)?;
    let result = builder.decode(&x)?;
    info!(
        "translation+structure solved with max reprojection error {:.3e}",
        report.gamma
    );
    Ok((result, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use linf_core::{intrinsics_matrix, Observation, Pt2};
    use linf_lp::ConstraintMatrix;

    fn small_table() -> ObservationTable {
        ObservationTable::new(vec![
            Observation::new(Pt2::new(0.1, 0.2), 0, 0),
            Observation::new(Pt2::new(-0.1, 0.0), 1, 0),
            Observation::new(Pt2::new(0.3, -0.2), 0, 1),
        ])
    }

    #[test]
    fn layout_and_row_count() {
        let builder =
            TranslationStructureBuilder::new(vec![Mat3::identity(); 2], small_table()).unwrap();
        assert_eq!(builder.num_cameras(), 2);
        assert_eq!(builder.num_points(), 2);
        assert_eq!(BoundedConstraintBuilder::num_params(&builder), 12);

        let lp = builder.build(0.01).unwrap();
        assert_eq!(lp.num_rows(), 5 * 3 + 3);
        assert_eq!(lp.matrix.ncols(), 12);
        assert!(lp.validate().is_ok());
        assert_eq!(&lp.relations[15..], &[Relation::Equal; 3]);
        assert_eq!(lp.relations[0], Relation::GreaterOrEqual);
        assert_eq!(lp.rhs[0], 1.0);
    }

    #[test]
    fn camera_count_must_match_rotations() {
        let err = TranslationStructureBuilder::new(vec![Mat3::identity(); 3], small_table())
            .unwrap_err();
        assert!(matches!(
            err,
            BuildError::SizeMismatch {
                expected: 2,
                got: 3,
                ..
            }
        ));
        assert!(TranslationStructureBuilder::new(vec![], ObservationTable::default()).is_err());
    }

    #[test]
    fn singular_intrinsics_are_rejected() {
        let err = TranslationStructureBuilder::with_intrinsics(
            &Mat3::zeros(),
            vec![Mat3::identity(); 2],
            small_table(),
        )
        .unwrap_err();
        assert!(matches!(err, BuildError::Invalid(_)));
    }

    #[test]
    fn exact_scene_is_feasible_at_zero() {
        // Camera 0 at the origin, camera 1 shifted along x.
        let t1 = Vec3::new(-0.5, 0.0, 0.0);
        let points = [Pt3::new(0.2, 0.1, 3.0), Pt3::new(-0.3, 0.2, 4.0)];
        let poses = [
            CameraPose::new(Mat3::identity(), Vec3::zeros()),
            CameraPose::new(Mat3::identity(), t1),
        ];
        let k = intrinsics_matrix(800.0, 800.0, 320.0, 240.0);
        let table: ObservationTable = poses
            .iter()
            .enumerate()
            .flat_map(|(c, pose)| {
                points
                    .iter()
                    .enumerate()
                    .map(move |(p, x)| Observation::new(pose.project(&k, x), p, c))
            })
            .collect();
        let builder =
            TranslationStructureBuilder::with_intrinsics(&k, vec![Mat3::identity(); 2], table)
                .unwrap();
        let lp = builder.build(0.0).unwrap();

        let kt1 = k * t1;
        let mut x = vec![0.0, 0.0, 0.0, kt1.x, kt1.y, kt1.z];
        for p in &points {
            x.extend_from_slice(&[p.x, p.y, p.z]);
        }
        let mut lhs = vec![0.0; lp.num_rows()];
        lp.matrix.for_each_entry(&mut |r, c, v| lhs[r] += v * x[c]);
        for (row, ((value, rel), rhs)) in lhs.iter().zip(&lp.relations).zip(&lp.rhs).enumerate() {
            let ok = match rel {
                Relation::LessOrEqual => *value <= rhs + 1e-9,
                Relation::GreaterOrEqual => *value >= rhs - 1e-9,
                Relation::Equal => (value - rhs).abs() < 1e-9,
            };
            assert!(ok, "row {row}: {value} {rel:?} {rhs}");
        }

        let decoded = builder.decode(&x).unwrap();
        assert!((decoded.translations[1] - t1).norm() < 1e-10);
        assert_eq!(decoded.points[1], points[1]);
    }

    #[test]
    fn decode_rejects_wrong_length() {
        let builder =
            TranslationStructureBuilder::new(vec![Mat3::identity(); 2], small_table()).unwrap();
        assert!(builder.decode(&[0.0; 11]).is_err());
    }

    #[test]
    fn centers_follow_pose_convention() {
        let r = Mat3::new(0.0, -1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0);
        let ts = TranslationStructure {
            rotations: vec![r],
            translations: vec![Vec3::new(1.0, 2.0, 3.0)],
            points: vec![],
        };
        let c = ts.centers()[0];
        assert!((r * c + Vec3::new(1.0, 2.0, 3.0)).norm() < 1e-12);
    }
}
