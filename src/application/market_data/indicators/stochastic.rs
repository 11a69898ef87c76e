use crate::domain::market::{Candle, IndicatorSeries};
use serde::{Deserialize, Serialize};
use ta::Next;
use ta::indicators::SimpleMovingAverage;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StochasticSeries {
    pub k: IndicatorSeries,
    pub d: IndicatorSeries,
}

/// Stochastic oscillator.
///
/// %K = 100 * (close - lowest low) / (highest high - lowest low) over
/// `period` candles, 50 when the window has no range. %D is the SMA of the
/// defined %K values over `signal_period`.
pub fn stochastic(candles: &[Candle], period: usize, signal_period: usize) -> StochasticSeries {
    let len = candles.len();
    let mut sma = match SimpleMovingAverage::new(signal_period) {
        Ok(sma) => sma,
        Err(e) => {
            debug!(
                "IndicatorEngine: Stochastic %D({}) unavailable: {:?}",
                signal_period, e
            );
            return StochasticSeries {
                k: IndicatorSeries::undefined(len),
                d: IndicatorSeries::undefined(len),
            };
        }
    };
    if period == 0 {
        return StochasticSeries {
            k: IndicatorSeries::undefined(len),
            d: IndicatorSeries::undefined(len),
        };
    }

    let mut k_values = vec![None; len];
    let mut d_values = vec![None; len];
    let mut fed = 0usize;

    for i in (period - 1)..len {
        let window = &candles[i + 1 - period..=i];
        let highest = window.iter().map(|c| c.high).fold(f64::MIN, f64::max);
        let lowest = window.iter().map(|c| c.low).fold(f64::MAX, f64::min);

        let range = highest - lowest;
        let k = if range <= f64::EPSILON {
            50.0
        } else {
            (100.0 * (candles[i].close - lowest) / range).clamp(0.0, 100.0)
        };
        k_values[i] = Some(k);

        let d = sma.next(k);
        fed += 1;
        if fed >= signal_period {
            d_values[i] = Some(d);
        }
    }

    StochasticSeries {
        k: k_values.into(),
        d: d_values.into(),
    }
}
