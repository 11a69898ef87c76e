//! Signal rule thresholds, confidence weights and session profile tuning.

use super::EnvReader;
use crate::domain::errors::ConfigError;
use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    // Rule triggers
    pub trend_threshold: f64,
    pub reversal_threshold: f64,
    pub strong_move: f64,

    // RSI regimes
    pub rsi_overbought: f64,
    pub rsi_oversold: f64,
    pub reversal_rsi_long_max: f64,
    pub reversal_rsi_short_min: f64,

    // Confidence
    pub trend_base_confidence: f64,
    pub trend_confidence_cap: f64,
    pub reversal_base_confidence: f64,
    pub reversal_confidence_cap: f64,
    pub prediction_scale: f64,
    pub max_prediction_bonus: f64,
    pub rsi_bonus: f64,
    pub vwap_bonus: f64,
    pub extreme_rsi_bonus: f64,
    pub degraded_penalty: f64,

    // Targets (multiples of risk)
    pub trend_target_multiple: f64,
    pub reversal_target_multiple: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            trend_threshold: 0.1,
            reversal_threshold: 0.3,
            strong_move: 0.5,
            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
            reversal_rsi_long_max: 40.0,
            reversal_rsi_short_min: 60.0,
            trend_base_confidence: 50.0,
            trend_confidence_cap: 95.0,
            reversal_base_confidence: 40.0,
            reversal_confidence_cap: 75.0,
            prediction_scale: 20.0,
            max_prediction_bonus: 20.0,
            rsi_bonus: 10.0,
            vwap_bonus: 10.0,
            extreme_rsi_bonus: 10.0,
            degraded_penalty: 15.0,
            trend_target_multiple: 3.0,
            reversal_target_multiple: 2.5,
        }
    }
}

impl SignalConfig {
    pub(crate) fn from_reader(env: &EnvReader<'_>) -> Result<Self> {
        let d = Self::default();
        Ok(Self {
            trend_threshold: env.parse_f64("SIGNAL_TREND_THRESHOLD", d.trend_threshold)?,
            reversal_threshold: env.parse_f64("SIGNAL_REVERSAL_THRESHOLD", d.reversal_threshold)?,
            strong_move: env.parse_f64("SIGNAL_STRONG_MOVE", d.strong_move)?,
            rsi_overbought: env.parse_f64("SIGNAL_RSI_OVERBOUGHT", d.rsi_overbought)?,
            rsi_oversold: env.parse_f64("SIGNAL_RSI_OVERSOLD", d.rsi_oversold)?,
            reversal_rsi_long_max: env
                .parse_f64("SIGNAL_REVERSAL_RSI_LONG_MAX", d.reversal_rsi_long_max)?,
            reversal_rsi_short_min: env
                .parse_f64("SIGNAL_REVERSAL_RSI_SHORT_MIN", d.reversal_rsi_short_min)?,
            trend_base_confidence: env
                .parse_f64("SIGNAL_TREND_BASE_CONFIDENCE", d.trend_base_confidence)?,
            trend_confidence_cap: env
                .parse_f64("SIGNAL_TREND_CONFIDENCE_CAP", d.trend_confidence_cap)?,
            reversal_base_confidence: env
                .parse_f64("SIGNAL_REVERSAL_BASE_CONFIDENCE", d.reversal_base_confidence)?,
            reversal_confidence_cap: env
                .parse_f64("SIGNAL_REVERSAL_CONFIDENCE_CAP", d.reversal_confidence_cap)?,
            prediction_scale: env.parse_f64("SIGNAL_PREDICTION_SCALE", d.prediction_scale)?,
            max_prediction_bonus: env
                .parse_f64("SIGNAL_MAX_PREDICTION_BONUS", d.max_prediction_bonus)?,
            rsi_bonus: env.parse_f64("SIGNAL_RSI_BONUS", d.rsi_bonus)?,
            vwap_bonus: env.parse_f64("SIGNAL_VWAP_BONUS", d.vwap_bonus)?,
            extreme_rsi_bonus: env.parse_f64("SIGNAL_EXTREME_RSI_BONUS", d.extreme_rsi_bonus)?,
            degraded_penalty: env.parse_f64("SIGNAL_DEGRADED_PENALTY", d.degraded_penalty)?,
            trend_target_multiple: env
                .parse_f64("SIGNAL_TREND_TARGET_MULTIPLE", d.trend_target_multiple)?,
            reversal_target_multiple: env
                .parse_f64("SIGNAL_REVERSAL_TARGET_MULTIPLE", d.reversal_target_multiple)?,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let non_negative = [
            ("trend_threshold", self.trend_threshold),
            ("reversal_threshold", self.reversal_threshold),
            ("strong_move", self.strong_move),
            ("prediction_scale", self.prediction_scale),
            ("max_prediction_bonus", self.max_prediction_bonus),
            ("rsi_bonus", self.rsi_bonus),
            ("vwap_bonus", self.vwap_bonus),
            ("extreme_rsi_bonus", self.extreme_rsi_bonus),
            ("degraded_penalty", self.degraded_penalty),
        ];
        for (name, value) in non_negative {
            check_range(name, value, 0.0, f64::MAX)?;
        }

        let percentages = [
            ("rsi_overbought", self.rsi_overbought),
            ("rsi_oversold", self.rsi_oversold),
            ("reversal_rsi_long_max", self.reversal_rsi_long_max),
            ("reversal_rsi_short_min", self.reversal_rsi_short_min),
            ("trend_base_confidence", self.trend_base_confidence),
            ("trend_confidence_cap", self.trend_confidence_cap),
            ("reversal_base_confidence", self.reversal_base_confidence),
            ("reversal_confidence_cap", self.reversal_confidence_cap),
        ];
        for (name, value) in percentages {
            check_range(name, value, 0.0, 100.0)?;
        }

        check_range("rsi_oversold", self.rsi_oversold, 0.0, self.rsi_overbought)?;
        check_range(
            "reversal_rsi_long_max",
            self.reversal_rsi_long_max,
            0.0,
            self.reversal_rsi_short_min,
        )?;
        check_range(
            "trend_base_confidence",
            self.trend_base_confidence,
            0.0,
            self.trend_confidence_cap,
        )?;
        check_range(
            "reversal_base_confidence",
            self.reversal_base_confidence,
            0.0,
            self.reversal_confidence_cap,
        )?;

        check_range(
            "trend_target_multiple",
            self.trend_target_multiple,
            f64::MIN_POSITIVE,
            f64::MAX,
        )?;
        check_range(
            "reversal_target_multiple",
            self.reversal_target_multiple,
            f64::MIN_POSITIVE,
            f64::MAX,
        )?;

        Ok(())
    }
}

/// Tuning of the session profile metrics and pattern detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Price distance (points) within which a close counts as "at average"
    pub average_tolerance: f64,
    /// Close z-score magnitude that qualifies as a breakout
    pub breakout_zscore: f64,
    /// Volume z-score a breakout candle must exceed
    pub breakout_volume_zscore: f64,
    /// Minimum prominence (points) of a swing high or low
    pub swing_prominence: f64,
    pub trend_fast_period: usize,
    pub trend_slow_period: usize,
    /// Rolling window (candles) of the short-horizon candle features
    pub short_window: usize,
    /// Rolling window (candles) of the long-horizon candle features
    pub long_window: usize,
    pub cluster_count: usize,
    pub cluster_seed: u64,
    /// DBSCAN neighbourhood radius in standardized feature space
    pub anomaly_eps: f64,
    pub anomaly_min_samples: usize,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            average_tolerance: 0.5,
            breakout_zscore: 2.0,
            breakout_volume_zscore: 1.0,
            swing_prominence: 0.5,
            trend_fast_period: 5,
            trend_slow_period: 12,
            short_window: 5,
            long_window: 12,
            cluster_count: 5,
            cluster_seed: 42,
            anomaly_eps: 1.0,
            anomaly_min_samples: 5,
        }
    }
}

impl ProfileConfig {
    pub(crate) fn from_reader(env: &EnvReader<'_>) -> Result<Self> {
        let d = Self::default();
        Ok(Self {
            average_tolerance: env.parse_f64("PROFILE_AVERAGE_TOLERANCE", d.average_tolerance)?,
            breakout_zscore: env.parse_f64("PROFILE_BREAKOUT_ZSCORE", d.breakout_zscore)?,
            breakout_volume_zscore: env
                .parse_f64("PROFILE_BREAKOUT_VOLUME_ZSCORE", d.breakout_volume_zscore)?,
            swing_prominence: env.parse_f64("PROFILE_SWING_PROMINENCE", d.swing_prominence)?,
            trend_fast_period: env.parse_usize("PROFILE_TREND_FAST_PERIOD", d.trend_fast_period)?,
            trend_slow_period: env.parse_usize("PROFILE_TREND_SLOW_PERIOD", d.trend_slow_period)?,
            short_window: env.parse_usize("PROFILE_SHORT_WINDOW", d.short_window)?,
            long_window: env.parse_usize("PROFILE_LONG_WINDOW", d.long_window)?,
            cluster_count: env.parse_usize("PROFILE_CLUSTER_COUNT", d.cluster_count)?,
            cluster_seed: env.parse_usize("PROFILE_CLUSTER_SEED", d.cluster_seed as usize)?
                as u64,
            anomaly_eps: env.parse_f64("PROFILE_ANOMALY_EPS", d.anomaly_eps)?,
            anomaly_min_samples: env
                .parse_usize("PROFILE_ANOMALY_MIN_SAMPLES", d.anomaly_min_samples)?,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("average_tolerance", self.average_tolerance, 0.0, f64::MAX)?;
        check_range("breakout_zscore", self.breakout_zscore, 0.0, f64::MAX)?;
        check_range("swing_prominence", self.swing_prominence, 0.0, f64::MAX)?;
        check_range("anomaly_eps", self.anomaly_eps, f64::MIN_POSITIVE, f64::MAX)?;

        let periods = [
            ("trend_fast_period", self.trend_fast_period),
            ("short_window", self.short_window),
            ("anomaly_min_samples", self.anomaly_min_samples),
        ];
        for (name, value) in periods {
            if value == 0 {
                return Err(ConfigError::ZeroPeriod { name });
            }
        }

        check_range(
            "trend_slow_period",
            self.trend_slow_period as f64,
            (self.trend_fast_period + 1) as f64,
            f64::MAX,
        )?;
        // rolling σ needs two samples
        check_range("long_window", self.long_window as f64, 2.0, f64::MAX)?;
        check_range("cluster_count", self.cluster_count as f64, 2.0, f64::MAX)?;
        Ok(())
    }
}

fn check_range(name: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            name,
            value,
            min,
            max,
        })
    }
}
