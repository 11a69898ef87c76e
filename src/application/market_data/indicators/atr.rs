use crate::domain::market::{Candle, IndicatorSeries};

/// True range of `candle` given the previous close
pub fn true_range(candle: &Candle, prev_close: f64) -> f64 {
    (candle.high - candle.low)
        .max((candle.high - prev_close).abs())
        .max((candle.low - prev_close).abs())
}

/// Average true range with Wilder smoothing.
///
/// True ranges start at index 1. The seed is the mean of the first `period`
/// true ranges, placed at index `period`; earlier positions are undefined.
pub fn atr(candles: &[Candle], period: usize) -> IndicatorSeries {
    let mut values = vec![None; candles.len()];
    if period == 0 || candles.len() < period + 1 {
        return values.into();
    }

    let tr: Vec<f64> = candles
        .windows(2)
        .map(|pair| true_range(&pair[1], pair[0].close))
        .collect();

    let p = period as f64;
    let mut current = tr[..period].iter().sum::<f64>() / p;
    values[period] = Some(current);

    for i in (period + 1)..candles.len() {
        current = (current * (p - 1.0) + tr[i - 1]) / p;
        values[i] = Some(current);
    }

    values.into()
}
