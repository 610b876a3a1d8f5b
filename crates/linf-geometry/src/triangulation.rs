//! L∞ triangulation of a single point from known cameras.
//!
//! For a view with projection rows `p0, p1, p2` (first three columns) and
//! translation column `t`, the reprojection error in `u` is bounded by
//! `gamma` iff
//!
//! ```text
//! (p0 X + t0) - (u + gamma)(p2 X + t2) <= 0
//! (u - gamma)(p2 X + t2) - (p0 X + t0) <= 0
//! ```
//!
//! which holds once the depth `p2 X + t2` is non-negative. Each view thus
//! contributes five `<=` rows in the three point coordinates: x-upper,
//! y-upper, cheirality, x-lower, y-lower.

use linf_core::{Mat34, Pt2, Pt3, Real};
use linf_lp::{
    bisect, BisectionOptions, BisectionReport, BoundedConstraintBuilder, BuildError,
    DenseConstraints, LpSolver, Relation, SolveError,
};
use log::debug;
use nalgebra::{DMatrix, RowVector3};

const ROWS_PER_VIEW: usize = 5;

/// Constraint builder for one point observed by several cameras.
#[derive(Debug, Clone)]
pub struct TriangulationBuilder {
    cameras: Vec<Mat34>,
    pixels: Vec<Pt2>,
}

impl TriangulationBuilder {
    /// `cameras[i]` observes the point at `pixels[i]`.
    ///
    /// Cameras may include intrinsics, in which case `pixels` and `gamma`
    /// are in pixel units.
    ///
    /// # Errors
    ///
    /// [`BuildError::TooFew`] with fewer than two views and
    /// [`BuildError::SizeMismatch`] if the two lists differ in length.
    pub fn new(cameras: Vec<Mat34>, pixels: Vec<Pt2>) -> Result<Self, BuildError> {
        if cameras.len() < 2 {
            return Err(BuildError::TooFew {
                what: "views",
                min: 2,
                got: cameras.len(),
            });
        }
        if cameras.len() != pixels.len() {
            return Err(BuildError::SizeMismatch {
                what: "pixels per camera",
                expected: cameras.len(),
                got: pixels.len(),
            });
        }
        Ok(Self { cameras, pixels })
    }

    pub fn num_views(&self) -> usize {
        self.cameras.len()
    }

    /// Point stored in an LP solution `[x, y, z]`.
    pub fn decode(&self, solution: &[Real]) -> Result<Pt3, BuildError> {
        match solution {
            [x, y, z] => Ok(Pt3::new(*x, *y, *z)),
            _ => Err(BuildError::SizeMismatch {
                what: "triangulation solution",
                expected: 3,
                got: solution.len(),
            }),
        }
    }

    /// Largest reprojection error of `point` over all views.
    pub fn max_residual(&self, point: &Pt3) -> Real {
        self.cameras
            .iter()
            .zip(&self.pixels)
            .map(|(p, uv)| {
                let proj = linf_core::project(p, point);
                (proj.x - uv.x).abs().max((proj.y - uv.y).abs())
            })
            .fold(0.0, Real::max)
    }
}

fn entries(row: RowVector3<Real>) -> [(usize, Real); 3] {
    [(0, row[0]), (1, row[1]), (2, row[2])]
}

impl BoundedConstraintBuilder for TriangulationBuilder {
    type Matrix = DMatrix<f64>;

    fn num_params(&self) -> usize {
        3
    }

    fn build(&self, gamma: f64) -> Result<DenseConstraints, BuildError> {
        let mut lp = DenseConstraints::new(ROWS_PER_VIEW * self.cameras.len(), 3);
        for (view, (p, uv)) in self.cameras.iter().zip(&self.pixels).enumerate() {
            let r = ROWS_PER_VIEW * view;
            let rot = p.fixed_view::<3, 3>(0, 0);
            let t = p.column(3);
            let (p0, p1, p2) = (rot.row(0), rot.row(1), rot.row(2));
            let le = Relation::LessOrEqual;

            let hi_u = uv.x + gamma;
            let hi_v = uv.y + gamma;
            let lo_u = uv.x - gamma;
            let lo_v = uv.y - gamma;

            lp.set_row(r, &entries(p0 - p2 * hi_u), le, -(t[0] - hi_u * t[2]));
            lp.set_row(r + 1, &entries(p1 - p2 * hi_v), le, -(t[1] - hi_v * t[2]));
            lp.set_row(r + 2, &entries(-p2), le, t[2]);
            lp.set_row(r + 3, &entries(p2 * lo_u - p0), le, t[0] - lo_u * t[2]);
            lp.set_row(r + 4, &entries(p2 * lo_v - p1), le, t[1] - lo_v * t[2]);
        }
        Ok(lp)
    }
}

/// Triangulate one point by bisecting the L∞ reprojection bound.
///
/// `solver` must be configured for three variables.
pub fn triangulate_linf<S>(
    solver: &mut S,
    cameras: &[Mat34],
    pixels: &[Pt2],
    opts: &BisectionOptions,
) -> Result<(Pt3, BisectionReport), SolveError>
where
    S: LpSolver + ?Sized,
{
    let builder = TriangulationBuilder::new(cameras.to_vec(), pixels.to_vec())?;
    let mut x = [0.0; 3];
    let report = bisect(solver, &builder, opts, &mut x)?;
    let point = builder.decode(&x)?;
    debug!(
        "triangulated {point} from {} views, max residual {:.3e}",
        builder.num_views(),
        builder.max_residual(&point)
    );
    Ok((point, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use linf_core::{mat34_from_parts, project, Mat3, Vec3};
    use linf_lp::{MiniLpSolver, SolveStatus};

    fn two_cameras() -> Vec<Mat34> {
        vec![
            mat34_from_parts(&Mat3::identity(), &Vec3::zeros()),
            mat34_from_parts(&Mat3::identity(), &Vec3::new(-0.2, 0.0, 0.0)),
        ]
    }

    #[test]
    fn rejects_single_view() {
        let cams = vec![Mat34::identity()];
        let err = TriangulationBuilder::new(cams, vec![Pt2::origin()]).unwrap_err();
        assert!(matches!(err, BuildError::TooFew { got: 1, .. }));
    }

    #[test]
    fn rejects_mismatched_pixels() {
        let err = TriangulationBuilder::new(two_cameras(), vec![Pt2::origin()]).unwrap_err();
        assert!(matches!(
            err,
            BuildError::SizeMismatch {
                expected: 2,
                got: 1,
                ..
            }
        ));
    }

    #[test]
    fn exact_point_satisfies_every_row() {
        let x = Pt3::new(0.1, -0.05, 2.0);
        let cams = two_cameras();
        let pixels: Vec<Pt2> = cams.iter().map(|p| project(p, &x)).collect();
        let builder = TriangulationBuilder::new(cams, pixels).unwrap();

        let lp = builder.build(1e-3).unwrap();
        assert_eq!(lp.num_rows(), 10);
        assert_eq!(lp.num_params, 3);
        let lhs = &lp.matrix * nalgebra::DVector::from_column_slice(&[x.x, x.y, x.z]);
        for (row, (value, rhs)) in lhs.iter().zip(&lp.rhs).enumerate() {
            assert!(value <= rhs, "row {row}: {value} > {rhs}");
        }
    }

    #[test]
    fn cheirality_row_bounds_depth() {
        let builder = TriangulationBuilder::new(two_cameras(), vec![Pt2::origin(); 2]).unwrap();
        let lp = builder.build(0.5).unwrap();
        // -z <= 0 for the first camera
        assert_eq!(lp.matrix.row(2).iter().copied().collect::<Vec<_>>(), vec![0.0, 0.0, -1.0]);
        assert_eq!(lp.rhs[2], 0.0);
    }

    #[test]
    fn decode_checks_length() {
        let builder =
            TriangulationBuilder::new(two_cameras(), vec![Pt2::origin(); 2]).unwrap();
        assert_eq!(builder.decode(&[1.0, 2.0, 3.0]).unwrap(), Pt3::new(1.0, 2.0, 3.0));
        assert!(builder.decode(&[1.0]).is_err());
    }

    #[test]
    fn recovers_point_from_two_views() {
        let x = Pt3::new(0.1, -0.05, 2.0);
        let cams = two_cameras();
        let pixels: Vec<Pt2> = cams.iter().map(|p| project(p, &x)).collect();

        let mut solver = MiniLpSolver::new(3);
        let (est, report) =
            triangulate_linf(&mut solver, &cams, &pixels, &BisectionOptions::default()).unwrap();
        assert!(report.gamma < 1e-4);
        assert!((est - x).norm() < 1e-2, "estimate {est}");
        let builder = TriangulationBuilder::new(cams, pixels).unwrap();
        assert!(builder.max_residual(&est) <= report.gamma + 1e-7);
    }

    #[test]
    fn conflicting_observations_need_a_larger_bound() {
        // Both cameras share the y axis, so their v coordinates must agree and
        // the best compromise sits halfway.
        let cams = two_cameras();
        let pixels = vec![Pt2::new(0.1, 0.0), Pt2::new(0.0, 0.2)];
        let mut solver = MiniLpSolver::new(3);
        let (est, report) =
            triangulate_linf(&mut solver, &cams, &pixels, &BisectionOptions::default()).unwrap();
        assert_abs_diff_eq!(report.gamma, 0.1, epsilon = 1e-4);
        assert!(est.z > 0.0);

        let err = triangulate_linf(
            &mut solver,
            &cams,
            &pixels,
            &BisectionOptions::with_bracket(0.0, 0.05),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SolveError::InfeasibleBracket {
                status: SolveStatus::Infeasible,
                ..
            }
        ));
    }
}
