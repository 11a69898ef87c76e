use crate::domain::market::IndicatorSeries;
use serde::{Deserialize, Serialize};
use ta::Next;
use ta::indicators::BollingerBands;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BollingerSeries {
    pub upper: IndicatorSeries,
    pub middle: IndicatorSeries,
    pub lower: IndicatorSeries,
    /// (close - lower) / (upper - lower) in [0, 1]
    pub position: IndicatorSeries,
}

/// Position of `price` inside the band; 0.5 when the band has no width
pub fn band_position(price: f64, upper: f64, lower: f64) -> f64 {
    let width = upper - lower;
    if width <= f64::EPSILON {
        return 0.5;
    }
    ((price - lower) / width).clamp(0.0, 1.0)
}

/// SMA(period) ± k·σ (population) over closing prices.
pub fn bollinger(prices: &[f64], period: usize, k: f64) -> BollingerSeries {
    let len = prices.len();
    let mut bands = match BollingerBands::new(period, k) {
        Ok(bands) => bands,
        Err(e) => {
            debug!("IndicatorEngine: Bollinger({}, {}) unavailable: {:?}", period, k, e);
            return BollingerSeries {
                upper: IndicatorSeries::undefined(len),
                middle: IndicatorSeries::undefined(len),
                lower: IndicatorSeries::undefined(len),
                position: IndicatorSeries::undefined(len),
            };
        }
    };

    let mut upper = Vec::with_capacity(len);
    let mut middle = Vec::with_capacity(len);
    let mut lower = Vec::with_capacity(len);
    let mut position = Vec::with_capacity(len);

    for (i, &price) in prices.iter().enumerate() {
        let out = bands.next(price);
        if i + 1 >= period {
            upper.push(Some(out.upper));
            middle.push(Some(out.average));
            lower.push(Some(out.lower));
            position.push(Some(band_position(price, out.upper, out.lower)));
        } else {
            upper.push(None);
            middle.push(None);
            lower.push(None);
            position.push(None);
        }
    }

    BollingerSeries {
        upper: upper.into(),
        middle: middle.into(),
        lower: lower.into(),
        position: position.into(),
    }
}
