use serde::{Deserialize, Serialize};

/// Intensity statistics of the overlap between images `from` and `to`.
///
/// Both histograms must share the same binning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelativeColorHistogramEdge {
    pub from: usize,
    pub to: usize,
    pub histogram_from: Vec<usize>,
    pub histogram_to: Vec<usize>,
}

impl RelativeColorHistogramEdge {
    pub fn new(
        from: usize,
        to: usize,
        histogram_from: Vec<usize>,
        histogram_to: Vec<usize>,
    ) -> Self {
        Self {
            from,
            to,
            histogram_from,
            histogram_to,
        }
    }
}
