//! Predictive model training parameters.

use super::EnvReader;
use crate::domain::errors::ConfigError;
use crate::domain::ml::FEATURE_NAMES;
use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Below this many complete rows training is skipped; never below the
    /// feature count
    pub min_samples: usize,
    /// Below this many rows a trained model is flagged low-confidence
    pub confident_samples: usize,
    /// Trailing share of rows held out for validation
    pub validation_fraction: f64,
    /// Ridge weight decay
    pub ridge_alpha: f64,
    /// Validation RMSE above this multiple of train RMSE flags overfitting
    pub overfit_ratio: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            min_samples: 15,
            confident_samples: 20,
            validation_fraction: 0.2,
            ridge_alpha: 1.0,
            overfit_ratio: 1.5,
        }
    }
}

impl ModelConfig {
    pub(crate) fn from_reader(env: &EnvReader<'_>) -> Result<Self> {
        let d = Self::default();
        Ok(Self {
            min_samples: env.parse_usize("MODEL_MIN_SAMPLES", d.min_samples)?,
            confident_samples: env.parse_usize("MODEL_CONFIDENT_SAMPLES", d.confident_samples)?,
            validation_fraction: env
                .parse_f64("MODEL_VALIDATION_FRACTION", d.validation_fraction)?,
            ridge_alpha: env.parse_f64("RIDGE_ALPHA", d.ridge_alpha)?,
            overfit_ratio: env.parse_f64("MODEL_OVERFIT_RATIO", d.overfit_ratio)?,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_samples < FEATURE_NAMES.len() {
            return Err(ConfigError::TooFewSamples {
                min_samples: self.min_samples,
                features: FEATURE_NAMES.len(),
            });
        }

        if !(self.validation_fraction > 0.0 && self.validation_fraction < 1.0) {
            return Err(ConfigError::OutOfRange {
                name: "validation_fraction",
                value: self.validation_fraction,
                min: 0.0,
                max: 1.0,
            });
        }

        if !(self.ridge_alpha >= 0.0 && self.ridge_alpha.is_finite()) {
            return Err(ConfigError::OutOfRange {
                name: "ridge_alpha",
                value: self.ridge_alpha,
                min: 0.0,
                max: f64::MAX,
            });
        }

        if !(self.overfit_ratio >= 1.0 && self.overfit_ratio.is_finite()) {
            return Err(ConfigError::OutOfRange {
                name: "overfit_ratio",
                value: self.overfit_ratio,
                min: 1.0,
                max: f64::MAX,
            });
        }

        Ok(())
    }
}
