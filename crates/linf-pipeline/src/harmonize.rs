use crate::LinfConfig;
use anyhow::{Context, Result};
use linf_color::{harmonize, GainOffset, GainOffsetConstraintBuilder, RelativeColorHistogramEdge};
use linf_lp::make_solver;
use serde::{Deserialize, Serialize};

fn reference_image() -> Vec<usize> {
    vec![0]
}

/// Histogram graph of overlapping images.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GainOffsetInput {
    pub edges: Vec<RelativeColorHistogramEdge>,
    /// Images pinned to the identity transform.
    #[serde(default = "reference_image")]
    pub fixed: Vec<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GainOffsetReport {
    pub transforms: Vec<GainOffset>,
    pub gamma: f64,
    pub num_edges: usize,
}

/// Solve the harmonization LP for one channel.
pub fn run_gain_offset(input: &GainOffsetInput, config: &LinfConfig) -> Result<GainOffsetReport> {
    let builder =
        GainOffsetConstraintBuilder::new(input.edges.clone(), &input.fixed, &config.gain_offset)
            .context("invalid histogram graph")?;
    let mut solver = make_solver(config.solver, builder.num_params());
    let solution = harmonize(solver.as_mut(), &builder).context("gain/offset solve failed")?;
    Ok(GainOffsetReport {
        transforms: solution.transforms,
        gamma: solution.gamma,
        num_edges: input.edges.len(),
    })
}
