//! Fixed-range intensity histograms.

use crate::Real;
use anyhow::{ensure, Result};

/// Histogram with `bins` equal-width bins over `[min, max)`.
///
/// Samples outside the range are counted as rejected and do not contribute
/// to any bin.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    min: Real,
    max: Real,
    counts: Vec<usize>,
    rejected: usize,
}

impl Histogram {
    pub fn new(min: Real, max: Real, bins: usize) -> Result<Self> {
        ensure!(bins > 0, "histogram needs at least one bin");
        ensure!(
            min.is_finite() && max.is_finite() && max > min,
            "invalid histogram range [{min}, {max})"
        );
        Ok(Self {
            min,
            max,
            counts: vec![0; bins],
            rejected: 0,
        })
    }

    pub fn add(&mut self, value: Real) {
        if !(value >= self.min && value < self.max) {
            self.rejected += 1;
            return;
        }
        let bins = self.counts.len();
        let bin = ((value - self.min) / (self.max - self.min) * bins as Real) as usize;
        self.counts[bin.min(bins - 1)] += 1;
    }

    pub fn extend<I: IntoIterator<Item = Real>>(&mut self, values: I) {
        for v in values {
            self.add(v);
        }
    }

    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    pub fn into_counts(self) -> Vec<usize> {
        self.counts
    }

    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    pub fn bin_width(&self) -> Real {
        (self.max - self.min) / self.counts.len() as Real
    }

    pub fn bin_center(&self, bin: usize) -> Real {
        self.min + (bin as Real + 0.5) * self.bin_width()
    }

    /// Number of accepted samples.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Number of samples that fell outside the range.
    pub fn rejected(&self) -> usize {
        self.rejected
    }
}
