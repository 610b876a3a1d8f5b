use crate::LinfConfig;
use anyhow::{Context, Result};
use linf_core::{project, Mat3, ObservationTable, Pt3, Real, Vec3};
use linf_geometry::{solve_translation_structure, TranslationStructureBuilder};
use linf_lp::{make_solver, BisectionReport, BoundedConstraintBuilder};
use serde::{Deserialize, Serialize};

/// Known rotations and the observation table of a multi-view scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationStructureInput {
    /// Shared intrinsics; pixels are normalized coordinates when absent.
    #[serde(default)]
    pub intrinsics: Option<Mat3>,
    pub rotations: Vec<Mat3>,
    pub observations: ObservationTable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationStructureReport {
    pub translations: Vec<Vec3>,
    pub centers: Vec<Vec3>,
    pub points: Vec<Pt3>,
    pub bisection: BisectionReport,
    /// Max reprojection error of the decoded scene, measured in the input units.
    pub max_reprojection_error: Real,
}

/// Recover all camera translations and points in one bisection.
pub fn run_translation_structure(
    input: &TranslationStructureInput,
    config: &LinfConfig,
) -> Result<TranslationStructureReport> {
    let builder = match &input.intrinsics {
        Some(k) => TranslationStructureBuilder::with_intrinsics(
            k,
            input.rotations.clone(),
            input.observations.clone(),
        ),
        None => TranslationStructureBuilder::new(
            input.rotations.clone(),
            input.observations.clone(),
        ),
    }
    .context("invalid translation+structure input")?;

    let mut solver = make_solver(config.solver, builder.num_params());
    let (scene, bisection) =
        solve_translation_structure(solver.as_mut(), &builder, &config.bisection)
            .context("translation+structure solve failed")?;

    let k = input.intrinsics.unwrap_or_else(Mat3::identity);
    let projections = scene.projections(&k);
    let max_reprojection_error = input
        .observations
        .iter()
        .map(|obs| {
            let uv = project(&projections[obs.camera], &scene.points[obs.point]);
            (uv - obs.pixel).abs().max()
        })
        .fold(0.0, Real::max);

    Ok(TranslationStructureReport {
        centers: scene.centers(),
        translations: scene.translations,
        points: scene.points,
        bisection,
        max_reprojection_error,
    })
}
