use linf_color::GainOffsetOptions;
use linf_lp::{BisectionOptions, SolverKind};
use serde::{Deserialize, Serialize};

/// Settings shared by all pipelines. Missing fields take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinfConfig {
    pub solver: SolverKind,
    pub bisection: BisectionOptions,
    pub gain_offset: GainOffsetOptions,
}
