//! Technical indicators over a trading day.
//!
//! Every function returns series of the input length, with warm-up
//! positions left undefined.

mod atr;
mod bollinger;
mod ema;
mod macd;
mod rsi;
mod stochastic;
mod vwap;

pub use atr::{atr, true_range};
pub use bollinger::{BollingerSeries, band_position, bollinger};
pub use ema::ema;
pub use macd::{MacdSeries, macd};
pub use rsi::{NEUTRAL_RSI, rsi};
pub use stochastic::{StochasticSeries, stochastic};
pub use vwap::vwap;

use crate::config::IndicatorConfig;
use crate::domain::errors::ConfigError;
use crate::domain::market::{Candle, IndicatorSeries, IndicatorSnapshot};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// All indicator series of one day, aligned with its candles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayIndicators {
    pub vwap: IndicatorSeries,
    pub ema_fast: IndicatorSeries,
    pub ema_slow: IndicatorSeries,
    pub rsi: IndicatorSeries,
    pub bollinger: BollingerSeries,
    pub atr: IndicatorSeries,
    pub macd: MacdSeries,
    pub stochastic: StochasticSeries,
}

impl DayIndicators {
    pub fn len(&self) -> usize {
        self.vwap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vwap.is_empty()
    }

    /// Readings of every indicator at `index`
    pub fn snapshot(&self, index: usize) -> IndicatorSnapshot {
        IndicatorSnapshot {
            vwap: self.vwap.get(index),
            ema_fast: self.ema_fast.get(index),
            ema_slow: self.ema_slow.get(index),
            rsi: self.rsi.get(index),
            bb_upper: self.bollinger.upper.get(index),
            bb_middle: self.bollinger.middle.get(index),
            bb_lower: self.bollinger.lower.get(index),
            bb_position: self.bollinger.position.get(index),
            atr: self.atr.get(index),
            macd: self.macd.macd.get(index),
            macd_signal: self.macd.signal.get(index),
            macd_histogram: self.macd.histogram.get(index),
            stoch_k: self.stochastic.k.get(index),
            stoch_d: self.stochastic.d.get(index),
        }
    }
}

/// Computes the configured indicator battery over a day's candles.
#[derive(Debug, Clone)]
pub struct IndicatorEngine {
    config: IndicatorConfig,
}

impl IndicatorEngine {
    pub fn new(config: IndicatorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &IndicatorConfig {
        &self.config
    }

    pub fn compute(&self, candles: &[Candle]) -> DayIndicators {
        let c = &self.config;
        let closes: Vec<f64> = candles.iter().map(|candle| candle.close).collect();

        let indicators = DayIndicators {
            vwap: vwap(candles),
            ema_fast: ema(&closes, c.ema_fast_period),
            ema_slow: ema(&closes, c.ema_slow_period),
            rsi: rsi(&closes, c.rsi_period),
            bollinger: bollinger(&closes, c.bb_period, c.bb_std_dev),
            atr: atr(candles, c.atr_period),
            macd: macd(
                &closes,
                c.macd_fast_period,
                c.macd_slow_period,
                c.macd_signal_period,
            ),
            stochastic: stochastic(candles, c.stoch_period, c.stoch_signal_period),
        };

        debug!(
            "IndicatorEngine: Computed indicators over {} candles (MACD signal warm-up {})",
            candles.len(),
            indicators.macd.signal.warmup_len()
        );
        indicators
    }
}
