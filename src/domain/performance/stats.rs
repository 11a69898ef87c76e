use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Summary statistics of one numeric field across a group of days.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DescriptiveStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub p25: f64,
    pub p75: f64,
}

impl DescriptiveStats {
    /// Computes statistics over the defined samples only.
    ///
    /// Returns `None` when no sample is defined.
    pub fn from_samples<I>(samples: I) -> Option<Self>
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        let values: Vec<f64> = samples.into_iter().flatten().collect();
        Self::from_values(&values)
    }

    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        Some(Self {
            count: values.len(),
            mean: Stats::mean(values),
            median: Stats::percentile_sorted(&sorted, 0.5),
            std_dev: Stats::population_std_dev(values),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            p25: Stats::percentile_sorted(&sorted, 0.25),
            p75: Stats::percentile_sorted(&sorted, 0.75),
        })
    }

    /// Field name / value pairs used when flattening reports
    pub fn entries(&self) -> [(&'static str, f64); 8] {
        [
            ("count", self.count as f64),
            ("mean", self.mean),
            ("median", self.median),
            ("std_dev", self.std_dev),
            ("min", self.min),
            ("max", self.max),
            ("p25", self.p25),
            ("p75", self.p75),
        ]
    }
}

/// Shared statistics utilities.
pub struct Stats;

impl Stats {
    pub fn mean(values: &[f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        values.iter().copied().mean()
    }

    /// Population standard deviation (divides by n)
    pub fn population_std_dev(values: &[f64]) -> f64 {
        if values.len() < 2 {
            return 0.0;
        }
        values.iter().copied().population_std_dev()
    }

    /// Sample standard deviation (divides by n - 1)
    pub fn sample_std_dev(values: &[f64]) -> f64 {
        if values.len() < 2 {
            return 0.0;
        }
        values.iter().copied().std_dev()
    }

    /// Nearest-rank percentile on an ascending slice.
    ///
    /// index = floor(p * n), clamped to n - 1.
    pub fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
        if sorted.is_empty() {
            return 0.0;
        }
        let index = ((p * sorted.len() as f64).floor() as usize).min(sorted.len() - 1);
        sorted[index]
    }

    /// Percentile of an unsorted slice, using a stable ascending sort
    pub fn percentile(values: &[f64], p: f64) -> f64 {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        Self::percentile_sorted(&sorted, p)
    }

    /// Z-scores against the population mean and σ; all zero when σ is zero
    pub fn z_scores(values: &[f64]) -> Vec<f64> {
        let mean = Self::mean(values);
        let std = Self::population_std_dev(values);
        if std <= f64::EPSILON {
            return vec![0.0; values.len()];
        }
        values.iter().map(|v| (v - mean) / std).collect()
    }
}
