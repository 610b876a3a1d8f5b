//! Quantile matching between discretized histograms.

/// Quantile levels `(k + 0.5) / count` for `k = 0..count`.
///
/// For ten levels this is `0.05, 0.15, ..., 0.95`.
pub fn quantile_levels(count: usize) -> Vec<f64> {
    (0..count)
        .map(|k| (k as f64 + 0.5) / count as f64)
        .collect()
}

/// Bin index reached by each quantile of `histogram`.
///
/// The histogram is normalized to unit mass and accumulated; a quantile maps
/// to the first bin whose cumulative mass reaches it. Returns `None` for an
/// empty histogram.
pub fn quantile_positions(histogram: &[usize], levels: &[f64]) -> Option<Vec<f64>> {
    let total: usize = histogram.iter().sum();
    if total == 0 {
        return None;
    }
    let mut acc = 0usize;
    let cdf: Vec<f64> = histogram
        .iter()
        .map(|&c| {
            acc += c;
            acc as f64 / total as f64
        })
        .collect();
    let last = cdf.len() - 1;
    Some(
        levels
            .iter()
            .map(|&q| cdf.partition_point(|&v| v < q).min(last) as f64)
            .collect(),
    )
}
