use crate::LinfConfig;
use anyhow::{ensure, Context, Result};
use linf_core::{CameraPose, Mat3, Mat34, ObservationTable, Pt2, Pt3, Real};
use linf_geometry::triangulate_linf;
use linf_lp::make_solver;
use log::{info, warn};
use serde::{Deserialize, Serialize};

/// Known cameras and the observations of the points to triangulate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriangulationInput {
    /// Shared intrinsics; pixels are normalized coordinates when absent.
    #[serde(default)]
    pub intrinsics: Option<Mat3>,
    pub poses: Vec<CameraPose>,
    pub observations: ObservationTable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointEstimate {
    pub index: usize,
    pub position: Pt3,
    /// Max reprojection error bound reached for this point.
    pub gamma: Real,
    pub views: usize,
    pub converged: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriangulationReport {
    pub points: Vec<PointEstimate>,
    /// Indices seen by fewer than two cameras.
    pub skipped: Vec<usize>,
    pub max_gamma: Real,
    pub lp_solves: usize,
}

/// Triangulate every point of the observation table independently.
///
/// Points observed in fewer than two views are reported as skipped.
pub fn run_triangulation(
    input: &TriangulationInput,
    config: &LinfConfig,
) -> Result<TriangulationReport> {
    ensure!(!input.observations.is_empty(), "no observations given");
    let num_cameras = input.observations.num_cameras();
    ensure!(
        num_cameras <= input.poses.len(),
        "observations reference camera {} but only {} poses are given",
        num_cameras - 1,
        input.poses.len()
    );

    let k = input.intrinsics.unwrap_or_else(Mat3::identity);
    let projections: Vec<Mat34> = input.poses.iter().map(|p| p.projection_with(&k)).collect();

    let mut tracks: Vec<(Vec<Mat34>, Vec<Pt2>)> =
        vec![(Vec::new(), Vec::new()); input.observations.num_points()];
    for obs in input.observations.iter() {
        let (cams, pixels) = &mut tracks[obs.point];
        cams.push(projections[obs.camera]);
        pixels.push(obs.pixel);
    }

    let mut solver = make_solver(config.solver, 3);
    let mut report = TriangulationReport {
        points: Vec::new(),
        skipped: Vec::new(),
        max_gamma: 0.0,
        lp_solves: 0,
    };
    for (index, (cams, pixels)) in tracks.iter().enumerate() {
        if cams.len() < 2 {
            warn!("point {index} seen in {} view(s), skipped", cams.len());
            report.skipped.push(index);
            continue;
        }
        let (position, bisection) =
            triangulate_linf(solver.as_mut(), cams, pixels, &config.bisection)
                .with_context(|| format!("triangulating point {index}"))?;
        report.max_gamma = report.max_gamma.max(bisection.gamma);
        report.lp_solves += bisection.solves;
        report.points.push(PointEstimate {
            index,
            position,
            gamma: bisection.gamma,
            views: cams.len(),
            converged: bisection.converged,
        });
    }

    info!(
        "triangulated {} points ({} skipped), max gamma {:.3e}",
        report.points.len(),
        report.skipped.len(),
        report.max_gamma
    );
    Ok(report)
}
