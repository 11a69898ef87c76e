#![allow(dead_code)]

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use session_edge::domain::market::{Candle, DayCandles};

/// 5-minute candles per day, 06:00 to 22:00 UTC
pub const CANDLES_PER_DAY: usize = 192;
const PRE_MARKET: usize = 24;
const MORNING: usize = 24;

/// Consecutive weekdays starting Monday 2025-01-06
pub fn trading_dates(count: usize) -> Vec<NaiveDate> {
    let mut date = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
    let mut dates = Vec::with_capacity(count);
    while dates.len() < count {
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            dates.push(date);
        }
        date += Duration::days(1);
    }
    dates
}

/// Morning move of the `i`-th synthetic day, never smaller than 0.4%
pub fn morning_move(i: usize) -> f64 {
    let s = ((i as f64) * 1.3 + 0.5).sin();
    s.signum() * (0.4 + s.abs())
}

/// A complete day: flat pre-market, a linear morning move of
/// `morning_pct` from 08:00 and a linear afternoon move of
/// `afternoon_pct` from 10:00, with a small oscillation on top.
pub fn synthetic_day(date: NaiveDate, morning_pct: f64, afternoon_pct: f64) -> DayCandles {
    let start = date.and_hms_opt(6, 0, 0).unwrap().and_utc();
    let morning_close = 100.0 * (1.0 + morning_pct / 100.0);
    let afternoon_len = (CANDLES_PER_DAY - PRE_MARKET - MORNING) as f64;

    let mut previous = 100.0;
    let candles = (0..CANDLES_PER_DAY)
        .map(|i| {
            let level = if i < PRE_MARKET {
                100.0
            } else if i < PRE_MARKET + MORNING {
                let t = (i + 1 - PRE_MARKET) as f64 / MORNING as f64;
                100.0 * (1.0 + morning_pct / 100.0 * t)
            } else {
                let t = (i + 1 - PRE_MARKET - MORNING) as f64 / afternoon_len;
                morning_close * (1.0 + afternoon_pct / 100.0 * t)
            };
            let close = level + ((i as f64) * 0.9).sin() * 0.02;
            let open = previous;
            previous = close;
            Candle::new(
                start + Duration::minutes(5 * i as i64),
                open,
                open.max(close) + 0.05,
                open.min(close) - 0.05,
                close,
                1000.0 + (i % 7) as f64 * 25.0,
            )
        })
        .collect();

    DayCandles::new(date, candles)
}

/// `count` days whose afternoon continues half of the morning move
pub fn aligned_days(count: usize) -> Vec<DayCandles> {
    trading_dates(count)
        .into_iter()
        .enumerate()
        .map(|(i, date)| {
            let morning = morning_move(i);
            synthetic_day(date, morning, morning * 0.5)
        })
        .collect()
}
