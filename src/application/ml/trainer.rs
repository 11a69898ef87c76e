use super::predictor::{FittedRegressor, RegressionStrategy};
use super::scaler::FeatureScaler;
use super::smartcore_predictor::RidgeRegressionStrategy;
use crate::config::ModelConfig;
use crate::domain::errors::ModelError;
use crate::domain::market::{DaySummary, Direction, SessionFeatureVector};
use crate::domain::ml::{FEATURE_NAMES, features_to_vector};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Morning feature rows labelled with the afternoon move, in date order
#[derive(Debug, Clone, Default)]
pub struct TrainingSet {
    pub dates: Vec<NaiveDate>,
    pub rows: Vec<Vec<f64>>,
    pub labels: Vec<f64>,
    /// Days left out because a feature was still in warm-up
    pub excluded: usize,
}

impl TrainingSet {
    pub fn from_summaries(days: &[DaySummary]) -> Self {
        let mut sorted: Vec<&DaySummary> = days.iter().collect();
        sorted.sort_by_key(|d| d.date);

        let mut set = Self::default();
        for day in sorted {
            match features_to_vector(&day.morning) {
                Some(row) => {
                    set.dates.push(day.date);
                    set.rows.push(row);
                    set.labels.push(day.afternoon.percent_move);
                }
                None => set.excluded += 1,
            }
        }
        set
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Goodness-of-fit figures and warnings of a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub strategy: String,
    pub samples: usize,
    pub excluded_days: usize,
    pub train_size: usize,
    pub validation_size: usize,
    pub train_rmse: f64,
    pub validation_rmse: Option<f64>,
    pub validation_mae: Option<f64>,
    pub validation_r2: Option<f64>,
    /// Percentage of validation days whose predicted direction was right
    pub validation_directional_accuracy: Option<f64>,
    pub low_confidence: bool,
    pub overfit_warning: bool,
}

/// Why no model was trained
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSkip {
    pub samples: usize,
    pub min_samples: usize,
    pub excluded_days: usize,
    pub reason: String,
}

pub enum TrainingOutcome {
    Trained {
        model: SessionModel,
        report: TrainingReport,
    },
    Skipped(TrainingSkip),
}

/// A fitted scaler + regressor pair predicting the afternoon percent move
pub struct SessionModel {
    scaler: FeatureScaler,
    regressor: Box<dyn FittedRegressor>,
}

impl SessionModel {
    pub fn scaler(&self) -> &FeatureScaler {
        &self.scaler
    }

    pub fn name(&self) -> &str {
        self.regressor.name()
    }

    pub fn version(&self) -> &str {
        self.regressor.version()
    }

    /// Predicts a raw (unscaled) feature row
    pub fn predict_row(&self, row: &[f64]) -> Result<f64, ModelError> {
        let scaled = self.scaler.transform_row(row)?;
        self.regressor
            .predict(&[scaled])?
            .first()
            .copied()
            .ok_or_else(|| ModelError::Predict("no prediction returned".to_string()))
    }

    /// Predicted afternoon move for a morning sub-session.
    ///
    /// `None` when a feature is undefined or the regressor fails.
    pub fn predict(&self, morning: &SessionFeatureVector) -> Option<f64> {
        let row = features_to_vector(morning)?;
        match self.predict_row(&row) {
            Ok(prediction) => Some(prediction),
            Err(e) => {
                warn!("SessionModel: Prediction failed: {}", e);
                None
            }
        }
    }

    /// Predictions keyed by date for every day with a complete row
    pub fn predict_days(&self, days: &[DaySummary]) -> BTreeMap<NaiveDate, f64> {
        days.iter()
            .filter_map(|day| self.predict(&day.morning).map(|p| (day.date, p)))
            .collect()
    }
}

/// Fits the predictive model with a chronological hold-out.
pub struct ModelTrainer {
    config: ModelConfig,
    strategy: Box<dyn RegressionStrategy>,
}

impl ModelTrainer {
    /// Trainer using the default ridge strategy
    pub fn new(config: ModelConfig) -> Self {
        let strategy = Box::new(RidgeRegressionStrategy::new(config.ridge_alpha));
        Self::with_strategy(config, strategy)
    }

    pub fn with_strategy(config: ModelConfig, strategy: Box<dyn RegressionStrategy>) -> Self {
        Self { config, strategy }
    }

    pub fn train(&self, days: &[DaySummary]) -> Result<TrainingOutcome, ModelError> {
        let set = TrainingSet::from_summaries(days);
        self.train_set(&set)
    }

    pub fn train_set(&self, set: &TrainingSet) -> Result<TrainingOutcome, ModelError> {
        let n = set.len();
        let width = FEATURE_NAMES.len();
        if n < self.config.min_samples || n < width {
            let reason = if n < self.config.min_samples {
                format!(
                    "{} complete samples, at least {} required",
                    n, self.config.min_samples
                )
            } else {
                format!("{} complete samples cannot fit {} features", n, width)
            };
            warn!("ModelTrainer: Skipping training: {}", reason);
            return Ok(TrainingOutcome::Skipped(TrainingSkip {
                samples: n,
                min_samples: self.config.min_samples,
                excluded_days: set.excluded,
                reason,
            }));
        }

        // Chronological split. The regressor needs at least one training row
        // per feature, so the hold-out shrinks first and is dropped when tiny.
        let holdout = (n as f64 * self.config.validation_fraction).floor() as usize;
        let holdout = holdout.min(n - width);
        let validation_size = if holdout >= 2 { holdout } else { 0 };
        let train_size = n - validation_size;

        let (train_rows, validation_rows) = set.rows.split_at(train_size);
        let (train_labels, validation_labels) = set.labels.split_at(train_size);

        let scaler = FeatureScaler::fit(train_rows)?;
        let scaled_train = scaler.transform(train_rows)?;
        let regressor = self.strategy.fit(&scaled_train, train_labels)?;

        let train_predictions = regressor.predict(&scaled_train)?;
        let train_metrics = RegressionMetrics::compute(&train_predictions, train_labels);

        let validation_metrics = if validation_size > 0 {
            let scaled_validation = scaler.transform(validation_rows)?;
            let predictions = regressor.predict(&scaled_validation)?;
            Some(RegressionMetrics::compute(&predictions, validation_labels))
        } else {
            None
        };

        let overfit_warning = validation_metrics
            .as_ref()
            .is_some_and(|v| v.rmse > self.config.overfit_ratio * train_metrics.rmse);
        let low_confidence = n < self.config.confident_samples;

        let report = TrainingReport {
            strategy: self.strategy.name().to_string(),
            samples: n,
            excluded_days: set.excluded,
            train_size,
            validation_size,
            train_rmse: train_metrics.rmse,
            validation_rmse: validation_metrics.as_ref().map(|m| m.rmse),
            validation_mae: validation_metrics.as_ref().map(|m| m.mae),
            validation_r2: validation_metrics.as_ref().map(|m| m.r2),
            validation_directional_accuracy: validation_metrics
                .as_ref()
                .map(|m| m.directional_accuracy),
            low_confidence,
            overfit_warning,
        };

        info!(
            "ModelTrainer: Trained {} on {} rows ({} held out), train RMSE {:.4}, validation RMSE {:?}",
            report.strategy, train_size, validation_size, report.train_rmse, report.validation_rmse
        );
        if overfit_warning {
            warn!(
                "ModelTrainer: Validation RMSE exceeds {}x train RMSE, model may be overfit",
                self.config.overfit_ratio
            );
        }
        if low_confidence {
            warn!(
                "ModelTrainer: Only {} samples (< {}), predictions are low-confidence",
                n, self.config.confident_samples
            );
        }

        Ok(TrainingOutcome::Trained {
            model: SessionModel { scaler, regressor },
            report,
        })
    }
}

/// RMSE, MAE, R² and directional accuracy (%) of predictions vs labels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegressionMetrics {
    pub rmse: f64,
    pub mae: f64,
    pub r2: f64,
    pub directional_accuracy: f64,
}

impl RegressionMetrics {
    pub fn compute(predictions: &[f64], labels: &[f64]) -> Self {
        let n = predictions.len().min(labels.len());
        if n == 0 {
            return Self {
                rmse: 0.0,
                mae: 0.0,
                r2: 0.0,
                directional_accuracy: 0.0,
            };
        }

        let pairs = || predictions.iter().zip(labels.iter()).take(n);
        let count = n as f64;

        let sq_err: f64 = pairs().map(|(p, y)| (p - y).powi(2)).sum();
        let abs_err: f64 = pairs().map(|(p, y)| (p - y).abs()).sum();
        let label_mean = labels[..n].iter().sum::<f64>() / count;
        let ss_tot: f64 = labels[..n].iter().map(|y| (y - label_mean).powi(2)).sum();
        let correct = pairs()
            .filter(|(p, y)| Direction::from_move(**p) == Direction::from_move(**y))
            .count();

        Self {
            rmse: (sq_err / count).sqrt(),
            mae: abs_err / count,
            r2: if ss_tot > f64::EPSILON {
                1.0 - sq_err / ss_tot
            } else {
                0.0
            },
            directional_accuracy: correct as f64 / count * 100.0,
        }
    }
}
