use super::patterns;
use crate::application::market_data::indicators::vwap;
use crate::config::ProfileConfig;
use crate::domain::market::{Candle, SessionProfile};
use crate::domain::performance::Stats;

/// Session-average, pattern and breakout metrics of one sub-session.
///
/// The closing VWAP is cumulated over the sub-session alone.
pub fn profile(candles: &[Candle], config: &ProfileConfig) -> SessionProfile {
    if candles.is_empty() {
        return SessionProfile::default();
    }

    let n = candles.len() as f64;
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let volumes: Vec<f64> = candles.iter().map(|c| c.volume).collect();

    let session_average = Stats::mean(&closes);
    let closing_vwap = vwap(candles).last().unwrap_or(session_average);

    let candles_at_average = closes
        .iter()
        .filter(|&&close| (close - session_average).abs() <= config.average_tolerance)
        .count();

    let average_crosses = closes
        .windows(2)
        .filter(|pair| {
            let (prev, cur) = (pair[0], pair[1]);
            (prev < session_average && cur >= session_average)
                || (prev > session_average && cur <= session_average)
        })
        .count();

    let bullish = candles.iter().filter(|c| c.is_bullish()).count() as f64;
    let bearish = candles.iter().filter(|c| c.is_bearish()).count() as f64;

    let (max_drawdown, max_run_up) = excursions(&closes);

    let highest = candles.iter().map(|c| c.high).fold(f64::MIN, f64::max);
    let lowest = candles.iter().map(|c| c.low).fold(f64::MAX, f64::min);
    let returns: Vec<f64> = closes
        .windows(2)
        .filter(|pair| pair[0] > 0.0)
        .map(|pair| pair[1] / pair[0] - 1.0)
        .collect();

    let mut bullish_breakouts = 0;
    let mut bearish_breakouts = 0;
    let close_z = Stats::z_scores(&closes);
    let volume_z = Stats::z_scores(&volumes);
    for (price_z, vol_z) in close_z.iter().zip(volume_z.iter()) {
        if price_z.abs() > config.breakout_zscore && *vol_z > config.breakout_volume_zscore {
            if *price_z > 0.0 {
                bullish_breakouts += 1;
            } else {
                bearish_breakouts += 1;
            }
        }
    }

    let patterns = patterns::detect(candles, config);

    SessionProfile {
        session_average,
        closing_vwap,
        time_at_average_pct: candles_at_average as f64 / n * 100.0,
        candles_at_average,
        average_crosses,
        bullish_ratio: bullish / n,
        bearish_ratio: bearish / n,
        max_drawdown,
        max_run_up,
        close_volatility: Stats::population_std_dev(&closes),
        total_range: highest - lowest,
        avg_body_size: candles.iter().map(|c| (c.close - c.open).abs()).sum::<f64>() / n,
        avg_candle_range: candles.iter().map(|c| c.high - c.low).sum::<f64>() / n,
        returns_volatility: Stats::sample_std_dev(&returns),
        total_momentum: closes[closes.len() - 1] - closes[0],
        bullish_breakouts,
        bearish_breakouts,
        swing_highs: patterns.swing_highs,
        swing_lows: patterns.swing_lows,
        trend_phases: patterns.trend_phases,
        anomalies: patterns.anomalies,
        clusters: patterns.clusters,
    }
}

/// (max drawdown from the running high, max run-up from the running low)
fn excursions(closes: &[f64]) -> (f64, f64) {
    let mut running_max = f64::MIN;
    let mut running_min = f64::MAX;
    let mut drawdown: f64 = 0.0;
    let mut run_up: f64 = 0.0;

    for &close in closes {
        running_max = running_max.max(close);
        running_min = running_min.min(close);
        drawdown = drawdown.max(running_max - close);
        run_up = run_up.max(close - running_min);
    }

    (drawdown, run_up)
}
