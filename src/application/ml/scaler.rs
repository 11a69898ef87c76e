use super::predictor::check_width;
use crate::domain::errors::ModelError;
use crate::domain::performance::Stats;
use serde::{Deserialize, Serialize};

/// Per-column z-score normalization fitted on training rows.
///
/// Inference always reuses the stored mean and σ; a column without spread
/// gets σ = 1 so it maps to zero instead of dividing by zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureScaler {
    means: Vec<f64>,
    std_devs: Vec<f64>,
}

impl FeatureScaler {
    pub fn fit(rows: &[Vec<f64>]) -> Result<Self, ModelError> {
        let width = rows.first().map(Vec::len).ok_or(ModelError::EmptyTrainingSet)?;
        check_width(rows, width)?;

        let mut means = Vec::with_capacity(width);
        let mut std_devs = Vec::with_capacity(width);
        for col in 0..width {
            let column: Vec<f64> = rows.iter().map(|row| row[col]).collect();
            let std = Stats::population_std_dev(&column);
            means.push(Stats::mean(&column));
            std_devs.push(if std > f64::EPSILON { std } else { 1.0 });
        }

        Ok(Self { means, std_devs })
    }

    pub fn width(&self) -> usize {
        self.means.len()
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    pub fn std_devs(&self) -> &[f64] {
        &self.std_devs
    }

    pub fn transform_row(&self, row: &[f64]) -> Result<Vec<f64>, ModelError> {
        if row.len() != self.width() {
            return Err(ModelError::FeatureWidth {
                expected: self.width(),
                actual: row.len(),
            });
        }
        Ok(row
            .iter()
            .zip(self.means.iter().zip(&self.std_devs))
            .map(|(value, (mean, std))| (value - mean) / std)
            .collect())
    }

    pub fn transform(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, ModelError> {
        rows.iter().map(|row| self.transform_row(row)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_stores_mean_and_std() {
        let rows = vec![vec![1.0, 5.0], vec![3.0, 5.0]];
        let scaler = FeatureScaler::fit(&rows).unwrap();

        assert_eq!(scaler.means(), &[2.0, 5.0]);
        // constant column falls back to 1
        assert_eq!(scaler.std_devs(), &[1.0, 1.0]);
        assert_eq!(scaler.transform_row(&[3.0, 5.0]).unwrap(), vec![1.0, 0.0]);
    }

    #[test]
    fn test_inference_reuses_training_statistics() {
        let train = vec![vec![0.0], vec![10.0]];
        let scaler = FeatureScaler::fit(&train).unwrap();

        // far outside the training range: still scaled with mean 5, σ 5
        let scaled = scaler.transform(&[vec![25.0], vec![-5.0]]).unwrap();
        assert_eq!(scaled, vec![vec![4.0], vec![-2.0]]);
    }

    #[test]
    fn test_shape_errors() {
        assert_eq!(FeatureScaler::fit(&[]), Err(ModelError::EmptyTrainingSet));

        let ragged = vec![vec![1.0, 2.0], vec![1.0]];
        assert!(matches!(
            FeatureScaler::fit(&ragged),
            Err(ModelError::FeatureWidth { expected: 2, actual: 1 })
        ));

        let scaler = FeatureScaler::fit(&[vec![1.0, 2.0]]).unwrap();
        assert!(scaler.transform_row(&[1.0]).is_err());
    }
}
