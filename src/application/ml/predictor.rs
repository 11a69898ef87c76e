use crate::domain::errors::ModelError;

/// A regression algorithm that can be fitted to scaled feature rows.
///
/// Implementations are swappable; the trainer only relies on this seam.
pub trait RegressionStrategy: Send + Sync {
    /// Fit to `rows` (already scaled) and `labels` of the same length
    fn fit(&self, rows: &[Vec<f64>], labels: &[f64])
    -> Result<Box<dyn FittedRegressor>, ModelError>;

    /// Get strategy name
    fn name(&self) -> &str;
}

/// Result of a successful fit.
pub trait FittedRegressor: Send + Sync {
    /// Predicted label for every row
    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, ModelError>;

    /// Get model name/type
    fn name(&self) -> &str;

    /// Get model version/id
    fn version(&self) -> &str;
}

/// Checks that `rows` and `labels` form a usable training set of `width` columns
pub fn check_shape(rows: &[Vec<f64>], labels: &[f64], width: usize) -> Result<(), ModelError> {
    if rows.is_empty() {
        return Err(ModelError::EmptyTrainingSet);
    }
    if rows.len() != labels.len() {
        return Err(ModelError::LengthMismatch {
            rows: rows.len(),
            labels: labels.len(),
        });
    }
    check_width(rows, width)
}

pub fn check_width(rows: &[Vec<f64>], width: usize) -> Result<(), ModelError> {
    match rows.iter().find(|row| row.len() != width) {
        Some(row) => Err(ModelError::FeatureWidth {
            expected: width,
            actual: row.len(),
        }),
        None => Ok(()),
    }
}
