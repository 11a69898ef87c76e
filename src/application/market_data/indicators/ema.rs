use crate::domain::market::IndicatorSeries;
use ta::Next;
use ta::indicators::ExponentialMovingAverage;
use tracing::debug;

/// Exponential moving average seeded with the first price.
///
/// `k = 2 / (period + 1)`; the first `period - 1` positions are undefined.
pub fn ema(prices: &[f64], period: usize) -> IndicatorSeries {
    let mut indicator = match ExponentialMovingAverage::new(period) {
        Ok(indicator) => indicator,
        Err(e) => {
            debug!("IndicatorEngine: EMA({}) unavailable: {:?}", period, e);
            return IndicatorSeries::undefined(prices.len());
        }
    };

    prices
        .iter()
        .enumerate()
        .map(|(i, &price)| {
            let value = indicator.next(price);
            (i + 1 >= period).then_some(value)
        })
        .collect::<Vec<_>>()
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warmup_positions_undefined() {
        let prices: Vec<f64> = (1..=12).map(f64::from).collect();
        let series = ema(&prices, 9);
        assert_eq!(series.len(), prices.len());
        assert_eq!(series.warmup_len(), 8);
        assert!(series.get(8).is_some());
    }

    #[test]
    fn test_recursion_matches_definition() {
        let prices = [10.0, 11.0, 12.0, 11.5, 13.0];
        let period = 3;
        let k = 2.0 / (period as f64 + 1.0);

        let mut expected = prices[0];
        for &p in &prices[1..] {
            expected = p * k + expected * (1.0 - k);
        }
        let series = ema(&prices, period);
        assert!((series.last().unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_constant_series_converges_to_constant() {
        for period in [3, 9, 21] {
            let prices = vec![4321.5; period * 5];
            let series = ema(&prices, period);
            for value in series.defined() {
                assert!((value - 4321.5).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_short_input_is_entirely_undefined() {
        let series = ema(&[1.0, 2.0], 9);
        assert_eq!(series.len(), 2);
        assert_eq!(series.defined().count(), 0);
    }
}
