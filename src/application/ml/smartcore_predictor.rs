use super::predictor::{FittedRegressor, RegressionStrategy, check_shape, check_width};
use crate::domain::errors::ModelError;
use crate::domain::performance::Stats;
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::ridge_regression::{RidgeRegression, RidgeRegressionParameters};
use tracing::debug;

type Ridge = RidgeRegression<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// Ridge (L2-regularized linear) regression backed by smartcore.
///
/// smartcore fits without an intercept when normalization is off, so labels
/// are centred before fitting and the label mean is added back on predict.
#[derive(Debug, Clone)]
pub struct RidgeRegressionStrategy {
    alpha: f64,
}

impl RidgeRegressionStrategy {
    pub fn new(alpha: f64) -> Self {
        Self { alpha }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

impl RegressionStrategy for RidgeRegressionStrategy {
    fn fit(
        &self,
        rows: &[Vec<f64>],
        labels: &[f64],
    ) -> Result<Box<dyn FittedRegressor>, ModelError> {
        let width = rows.first().map(Vec::len).unwrap_or_default();
        check_shape(rows, labels, width)?;

        let label_mean = Stats::mean(labels);
        let centred: Vec<f64> = labels.iter().map(|y| y - label_mean).collect();

        let x = DenseMatrix::from_2d_vec(&rows.to_vec())
            .map_err(|e| ModelError::Matrix(e.to_string()))?;
        let params = RidgeRegressionParameters::default()
            .with_alpha(self.alpha)
            .with_normalize(false);
        let model = Ridge::fit(&x, &centred, params).map_err(|e| ModelError::Fit(e.to_string()))?;

        debug!(
            "RidgeRegressionStrategy: Fitted {} rows x {} features (alpha {}, label mean {:.4})",
            rows.len(),
            width,
            self.alpha,
            label_mean
        );

        Ok(Box::new(SmartCoreRidge {
            model,
            width,
            label_mean,
        }))
    }

    fn name(&self) -> &str {
        "ridge"
    }
}

/// A fitted smartcore ridge model plus its intercept
pub struct SmartCoreRidge {
    model: Ridge,
    width: usize,
    label_mean: f64,
}

impl FittedRegressor for SmartCoreRidge {
    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, ModelError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        check_width(rows, self.width)?;

        let x = DenseMatrix::from_2d_vec(&rows.to_vec())
            .map_err(|e| ModelError::Matrix(e.to_string()))?;
        let predictions = self
            .model
            .predict(&x)
            .map_err(|e| ModelError::Predict(e.to_string()))?;

        Ok(predictions.iter().map(|p| p + self.label_mean).collect())
    }

    fn name(&self) -> &str {
        "SmartCore Ridge Regression"
    }

    fn version(&self) -> &str {
        "v1.0"
    }
}
