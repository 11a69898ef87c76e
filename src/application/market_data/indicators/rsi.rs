use crate::domain::market::IndicatorSeries;

/// Neutral reading used when the input is too short to compute RSI
pub const NEUTRAL_RSI: f64 = 50.0;

/// Relative strength index with Wilder smoothing.
///
/// The first `period` price changes seed the average gain and loss. The
/// first `period` positions are undefined. Inputs shorter than `period + 1`
/// yield the neutral value at every position.
pub fn rsi(prices: &[f64], period: usize) -> IndicatorSeries {
    if period == 0 || prices.len() < period + 1 {
        return IndicatorSeries::constant(prices.len(), NEUTRAL_RSI);
    }

    let mut values = vec![None; prices.len()];
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;

    for i in 1..=period {
        let change = prices[i] - prices[i - 1];
        if change > 0.0 {
            avg_gain += change;
        } else {
            avg_loss -= change;
        }
    }
    avg_gain /= period as f64;
    avg_loss /= period as f64;
    values[period] = Some(rsi_value(avg_gain, avg_loss));

    let p = period as f64;
    for i in (period + 1)..prices.len() {
        let change = prices[i] - prices[i - 1];
        let (gain, loss) = if change > 0.0 {
            (change, 0.0)
        } else {
            (0.0, -change)
        };
        avg_gain = (avg_gain * (p - 1.0) + gain) / p;
        avg_loss = (avg_loss * (p - 1.0) + loss) / p;
        values[i] = Some(rsi_value(avg_gain, avg_loss));
    }

    values.into()
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss <= 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    (100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_input_is_neutral() {
        let series = rsi(&[100.0, 101.0, 102.0], 14);
        assert_eq!(series.values(), &[Some(50.0); 3]);
        assert!(rsi(&[], 14).is_empty());
    }

    #[test]
    fn test_warmup_positions_undefined() {
        let prices: Vec<f64> = (0..30).map(|i| 100.0 + (i as f64 * 0.7).sin()).collect();
        let series = rsi(&prices, 14);
        assert_eq!(series.len(), 30);
        assert_eq!(series.warmup_len(), 14);
    }

    #[test]
    fn test_only_gains_gives_100() {
        let prices: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let series = rsi(&prices, 14);
        assert_eq!(series.last(), Some(100.0));
    }

    #[test]
    fn test_only_losses_gives_0() {
        let prices: Vec<f64> = (0..20).map(|i| 100.0 - i as f64).collect();
        let series = rsi(&prices, 14);
        assert_eq!(series.last(), Some(0.0));
    }

    #[test]
    fn test_seed_value() {
        // gains: 1, 2 ; losses: 1 -> avg gain 1, avg loss 1/3
        let prices = [10.0, 11.0, 10.0, 12.0];
        let series = rsi(&prices, 3);
        let expected = 100.0 - 100.0 / (1.0 + 3.0);
        assert!((series.get(3).unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_bounded_for_generated_inputs() {
        for seed in 1..=8u64 {
            let mut state = seed;
            let mut price = 15000.0;
            let mut prices = Vec::with_capacity(200);
            for _ in 0..200 {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                let step = ((state >> 33) as f64 / (1u64 << 31) as f64) - 0.5;
                price += step * 25.0 * seed as f64;
                prices.push(price.max(1.0));
            }
            for value in rsi(&prices, 14).defined() {
                assert!((0.0..=100.0).contains(&value), "rsi {value} out of range");
            }
        }
    }
}
