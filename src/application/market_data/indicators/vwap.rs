use crate::domain::market::{Candle, IndicatorSeries};

/// Cumulative volume-weighted average price of the typical price.
///
/// Defined from the first candle. While cumulative volume is still zero the
/// current typical price is used instead.
pub fn vwap(candles: &[Candle]) -> IndicatorSeries {
    let mut cum_pv = 0.0;
    let mut cum_volume = 0.0;

    candles
        .iter()
        .map(|candle| {
            let typical = candle.typical_price();
            cum_pv += typical * candle.volume;
            cum_volume += candle.volume;

            if cum_volume > 0.0 {
                Some(cum_pv / cum_volume)
            } else {
                Some(typical)
            }
        })
        .collect::<Vec<_>>()
        .into()
}
