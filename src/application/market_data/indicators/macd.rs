use crate::domain::market::IndicatorSeries;
use serde::{Deserialize, Serialize};
use ta::Next;
use ta::indicators::MovingAverageConvergenceDivergence;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MacdSeries {
    pub macd: IndicatorSeries,
    pub signal: IndicatorSeries,
    pub histogram: IndicatorSeries,
}

/// EMA(fast) - EMA(slow) with an EMA(signal) signal line.
///
/// MACD is undefined for the first `slow - 1` positions and the signal
/// line for the first `slow + signal - 2`.
pub fn macd(prices: &[f64], fast: usize, slow: usize, signal: usize) -> MacdSeries {
    let len = prices.len();
    let mut indicator = match MovingAverageConvergenceDivergence::new(fast, slow, signal) {
        Ok(indicator) => indicator,
        Err(e) => {
            debug!(
                "IndicatorEngine: MACD({}, {}, {}) unavailable: {:?}",
                fast, slow, signal, e
            );
            return MacdSeries {
                macd: IndicatorSeries::undefined(len),
                signal: IndicatorSeries::undefined(len),
                histogram: IndicatorSeries::undefined(len),
            };
        }
    };

    let macd_ready = slow.saturating_sub(1);
    let signal_ready = (slow + signal).saturating_sub(2);

    let mut macd_values = Vec::with_capacity(len);
    let mut signal_values = Vec::with_capacity(len);
    let mut histogram_values = Vec::with_capacity(len);

    for (i, &price) in prices.iter().enumerate() {
        let out = indicator.next(price);
        macd_values.push((i >= macd_ready).then_some(out.macd));
        if i >= signal_ready {
            signal_values.push(Some(out.signal));
            histogram_values.push(Some(out.macd - out.signal));
        } else {
            signal_values.push(None);
            histogram_values.push(None);
        }
    }

    MacdSeries {
        macd: macd_values.into(),
        signal: signal_values.into(),
        histogram: histogram_values.into(),
    }
}
