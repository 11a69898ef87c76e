//! Technical indicator parameters.

use super::EnvReader;
use crate::domain::errors::ConfigError;
use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    // EMA
    pub ema_fast_period: usize,
    pub ema_slow_period: usize,

    // RSI
    pub rsi_period: usize,

    // Bollinger
    pub bb_period: usize,
    pub bb_std_dev: f64,

    // ATR
    pub atr_period: usize,

    // MACD
    pub macd_fast_period: usize,
    pub macd_slow_period: usize,
    pub macd_signal_period: usize,

    // Stochastic
    pub stoch_period: usize,
    pub stoch_signal_period: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            ema_fast_period: 9,
            ema_slow_period: 21,
            rsi_period: 14,
            bb_period: 20,
            bb_std_dev: 2.0,
            atr_period: 14,
            macd_fast_period: 12,
            macd_slow_period: 26,
            macd_signal_period: 9,
            stoch_period: 14,
            stoch_signal_period: 3,
        }
    }
}

impl IndicatorConfig {
    pub(crate) fn from_reader(env: &EnvReader<'_>) -> Result<Self> {
        let d = Self::default();
        Ok(Self {
            ema_fast_period: env.parse_usize("EMA_FAST_PERIOD", d.ema_fast_period)?,
            ema_slow_period: env.parse_usize("EMA_SLOW_PERIOD", d.ema_slow_period)?,
            rsi_period: env.parse_usize("RSI_PERIOD", d.rsi_period)?,
            bb_period: env.parse_usize("BB_PERIOD", d.bb_period)?,
            bb_std_dev: env.parse_f64("BB_STD_DEV", d.bb_std_dev)?,
            atr_period: env.parse_usize("ATR_PERIOD", d.atr_period)?,
            macd_fast_period: env.parse_usize("MACD_FAST_PERIOD", d.macd_fast_period)?,
            macd_slow_period: env.parse_usize("MACD_SLOW_PERIOD", d.macd_slow_period)?,
            macd_signal_period: env.parse_usize("MACD_SIGNAL_PERIOD", d.macd_signal_period)?,
            stoch_period: env.parse_usize("STOCH_PERIOD", d.stoch_period)?,
            stoch_signal_period: env.parse_usize("STOCH_SIGNAL_PERIOD", d.stoch_signal_period)?,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let periods = [
            ("ema_fast_period", self.ema_fast_period),
            ("ema_slow_period", self.ema_slow_period),
            ("rsi_period", self.rsi_period),
            ("bb_period", self.bb_period),
            ("atr_period", self.atr_period),
            ("macd_fast_period", self.macd_fast_period),
            ("macd_slow_period", self.macd_slow_period),
            ("macd_signal_period", self.macd_signal_period),
            ("stoch_period", self.stoch_period),
            ("stoch_signal_period", self.stoch_signal_period),
        ];
        if let Some(&(name, _)) = periods.iter().find(|(_, period)| *period == 0) {
            return Err(ConfigError::ZeroPeriod { name });
        }

        if self.macd_fast_period >= self.macd_slow_period {
            return Err(ConfigError::MacdPeriods {
                fast: self.macd_fast_period,
                slow: self.macd_slow_period,
            });
        }

        if !(self.bb_std_dev > 0.0 && self.bb_std_dev.is_finite()) {
            return Err(ConfigError::OutOfRange {
                name: "bb_std_dev",
                value: self.bb_std_dev,
                min: f64::MIN_POSITIVE,
                max: f64::MAX,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = IndicatorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.rsi_period, 14);
        assert_eq!(config.macd_slow_period, 26);
    }

    #[test]
    fn test_zero_period_rejected() {
        let config = IndicatorConfig {
            atr_period: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroPeriod { name: "atr_period" })
        );
    }

    #[test]
    fn test_macd_periods_must_be_ordered() {
        let config = IndicatorConfig {
            macd_fast_period: 26,
            macd_slow_period: 12,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MacdPeriods { .. })
        ));
    }
}
